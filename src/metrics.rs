use chrono::{NaiveDateTime, Timelike};

use crate::model::{DayOfWeek, Visit};
use crate::timestamp::TimedVisit;

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).as_seconds_f64() / 60.0
}

/// Wait, consultation length, entry hour and weekday. Negative minutes are kept.
pub fn derive(timed: TimedVisit) -> Visit {
    Visit {
        wait_minutes: minutes_between(timed.entry_time, timed.post_consultation_time),
        consultation_minutes: minutes_between(timed.post_consultation_time, timed.completion_time),
        hour_of_day: timed.entry_time.hour(),
        day_of_week: DayOfWeek::of(timed.date),
        row: timed.row,
        patient_id: timed.patient_id,
        date: timed.date,
        entry_time: timed.entry_time,
        post_consultation_time: timed.post_consultation_time,
        completion_time: timed.completion_time,
        doctor_type: timed.doctor_type,
        financial_class: timed.financial_class,
    }
}
