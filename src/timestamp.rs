use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::schema::{Column, RawVisit};
use crate::model::VisitError;

/// Tried in order. Slash dates are day-first; month-first only matches when the
/// day-first reading is impossible.
#[derive(Clone, Debug)]
pub struct TimeFormats {
    pub date_formats: Vec<String>,
    pub time_formats: Vec<String>,
}

impl Default for TimeFormats {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".into(),
                "%Y-%m-%d %H:%M:%S".into(),
                "%Y-%m-%dT%H:%M:%S".into(),
                "%d/%m/%Y".into(),
                "%m/%d/%Y".into(),
            ],
            time_formats: vec![
                "%H:%M:%S".into(),
                "%H:%M:%S%.f".into(),
                "%H:%M".into(),
                "%I:%M:%S %p".into(),
                "%I:%M %p".into(),
            ],
        }
    }
}

impl TimeFormats {
    /// Dates exported with a midnight time part are accepted; the time part is dropped.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        for format in &self.date_formats {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(date);
            }
            if let Ok(date_time) = NaiveDateTime::parse_from_str(text, format) {
                return Some(date_time.date());
            }
        }

        None
    }

    /// Falls back to ISO 8601 (`T08:15:00Z` and friends). Any offset is ignored,
    /// times are wall-clock on the visit date.
    pub fn parse_time_of_day(&self, text: &str) -> Option<NaiveTime> {
        let text = text.trim();
        for format in &self.time_formats {
            if let Ok(time) = NaiveTime::parse_from_str(text, format) {
                return Some(time);
            }
        }

        iso8601::time(text.trim_start_matches('T')).ok().and_then(|t| {
            NaiveTime::from_hms_milli_opt(t.hour, t.minute, t.second, t.millisecond)
        })
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct TimedVisit {
    pub row: usize,
    pub patient_id: String,
    pub date: NaiveDate,
    pub entry_time: NaiveDateTime,
    pub post_consultation_time: NaiveDateTime,
    pub completion_time: NaiveDateTime,
    pub doctor_type: String,
    pub financial_class: String,
}

/// Places each time-of-day on the visit date. No midnight rollover is inferred:
/// a completion earlier in the day than entry stays on the same date.
pub fn normalize(raw: RawVisit, formats: &TimeFormats) -> Result<TimedVisit, VisitError> {
    let row = raw.row;
    let fail = |column: Column, value: &str| VisitError::Parse {
        row,
        field: column.label().to_string(),
        value: value.to_string(),
    };

    let date = formats.parse_date(&raw.date).ok_or_else(|| fail(Column::Date, &raw.date))?;
    let at = |column: Column, value: &str| {
        formats
            .parse_time_of_day(value)
            .map(|time| date.and_time(time))
            .ok_or_else(|| fail(column, value))
    };

    let entry_time = at(Column::EntryTime, &raw.entry_time)?;
    let post_consultation_time = at(Column::PostConsultationTime, &raw.post_consultation_time)?;
    let completion_time = at(Column::CompletionTime, &raw.completion_time)?;

    Ok(TimedVisit {
        row,
        patient_id: raw.patient_id,
        date,
        entry_time,
        post_consultation_time,
        completion_time,
        doctor_type: raw.doctor_type,
        financial_class: raw.financial_class,
    })
}
