use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ParseFailurePolicy, PipelineConfig};
use crate::metrics;
use crate::model::{DayOfWeek, OrderingAnomaly, RawTable, Visit, VisitError};
use crate::schema::Schema;
use crate::timestamp;

/// Every derived visit from one load. Never mutated after construction,
/// so it can be shared across threads behind a plain reference or `Arc`.
#[derive(Clone, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    visits: Vec<Visit>,
    rejected: Vec<VisitError>,
    anomalies: Vec<OrderingAnomaly>,
}

#[derive(Clone, Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub days: Vec<DayOfWeek>,
    pub doctor_types: Vec<String>,
}

impl Dataset {
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Rows skipped under `ParseFailurePolicy::Skip`. Always empty under `Abort`.
    pub fn rejected(&self) -> &[VisitError] {
        &self.rejected
    }

    pub fn anomalies(&self) -> &[OrderingAnomaly] {
        &self.anomalies
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Days in calendar order, doctor types in first-seen order.
    pub fn filter_options(&self) -> FilterOptions {
        let mut days: Vec<DayOfWeek> = Vec::new();
        let mut doctor_types: Vec<String> = Vec::new();
        for visit in &self.visits {
            if !days.contains(&visit.day_of_week) {
                days.push(visit.day_of_week);
            }
            if !doctor_types.contains(&visit.doctor_type) {
                doctor_types.push(visit.doctor_type.clone());
            }
        }
        days.sort();

        FilterOptions { days, doctor_types }
    }
}

/// Builds with default parsing. `required_columns` may name columns beyond the
/// visit schema; those must be present in the header but are not read.
pub fn build_dataset(
    table: &RawTable,
    required_columns: &[String],
) -> Result<Dataset, VisitError> {
    let mut config = PipelineConfig::default();
    config.columns.extra_required = required_columns.to_vec();
    build_dataset_with(table, &config)
}

pub fn build_dataset_with(
    table: &RawTable,
    config: &PipelineConfig,
) -> Result<Dataset, VisitError> {
    let schema = Schema::resolve(table, &config.columns.extra_required)?;
    let formats = config.time_formats();

    let mut dataset = Dataset::default();
    for (index, row) in table.rows.iter().enumerate() {
        let parsed = schema
            .parse_row(index, row)
            .and_then(|raw| timestamp::normalize(raw, &formats))
            .map(metrics::derive);

        match parsed {
            Ok(visit) => {
                if visit.is_anomalous() {
                    warn!(
                        row = visit.row,
                        patient_id = %visit.patient_id,
                        wait_minutes = visit.wait_minutes,
                        consultation_minutes = visit.consultation_minutes,
                        "visit stages out of chronological order"
                    );
                    dataset.anomalies.push(OrderingAnomaly::from(&visit));
                }
                dataset.visits.push(visit);
            },
            Err(err) => match config.parsing.on_parse_error {
                ParseFailurePolicy::Abort => return Err(err),
                ParseFailurePolicy::Skip => {
                    warn!(row = index, error = %err, "skipping row");
                    dataset.rejected.push(err);
                },
            },
        }
    }

    info!(
        visits = dataset.visits.len(),
        rejected = dataset.rejected.len(),
        anomalies = dataset.anomalies.len(),
        "dataset built"
    );

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawRow;
    use crate::schema::REQUIRED_COLUMNS;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(
        id: &str,
        date: &str,
        entry: &str,
        post: &str,
        completion: &str,
        doctor: &str,
    ) -> RawRow {
        RawRow::from([
            ("Patient ID".to_string(), json!(id)),
            ("Date".to_string(), json!(date)),
            ("Entry Time".to_string(), json!(entry)),
            ("Post-Consultation Time".to_string(), json!(post)),
            ("Completion Time".to_string(), json!(completion)),
            ("Doctor Type".to_string(), json!(doctor)),
            ("Financial Class".to_string(), json!("Insurance")),
        ])
    }

    fn table(rows: Vec<RawRow>) -> RawTable {
        RawTable::new(REQUIRED_COLUMNS.iter().map(|c| c.label().to_string()).collect(), rows)
    }

    fn sample() -> RawTable {
        table(vec![
            row("P1", "2024-10-14", "08:00", "08:10", "08:30", "General"),
            row("P2", "2024-10-14", "09:00", "bad", "09:30", "General"),
            row("P3", "2024-10-15", "23:30", "23:50", "00:10", "Surgeon"),
            row("P4", "2024-10-13", "10:00", "10:45", "11:00", "Cardiology"),
        ])
    }

    #[test]
    fn skip_policy_records_rejected_rows() {
        let dataset = build_dataset(&sample(), &[]).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.visits().iter().map(|v| v.row).collect::<Vec<_>>(), vec![0, 2, 3]);
        assert_eq!(dataset.rejected(), &[VisitError::Parse {
            row: 1,
            field: "Post-Consultation Time".into(),
            value: "bad".into(),
        }]);
    }

    #[test]
    fn abort_policy_fails_on_first_bad_row() {
        let mut config = PipelineConfig::default();
        config.parsing.on_parse_error = ParseFailurePolicy::Abort;
        let err = build_dataset_with(&sample(), &config).unwrap_err();
        assert!(matches!(err, VisitError::Parse { row: 1, .. }));
    }

    #[test]
    fn schema_error_aborts_regardless_of_policy() {
        let broken = RawTable::new(vec!["Date".into()], vec![]);
        assert!(matches!(build_dataset(&broken, &[]), Err(VisitError::Schema { .. })));

        let err = build_dataset(&sample(), &["Ward".to_string()]).unwrap_err();
        assert_eq!(err, VisitError::Schema { missing: vec!["Ward".into()] });
    }

    #[test]
    fn derived_minutes_match_timestamps() {
        let mut input = sample();
        input
            .rows
            .push(row("P5", "2024-10-16", "08:00:00", "08:00:00.0009", "08:12:30.25", "General"));
        let dataset = build_dataset(&input, &[]).unwrap();
        for visit in dataset.visits() {
            let wait = (visit.post_consultation_time - visit.entry_time).as_seconds_f64();
            let consult = (visit.completion_time - visit.post_consultation_time).as_seconds_f64();
            assert_eq!(visit.wait_minutes, wait / 60.0);
            assert_eq!(visit.consultation_minutes, consult / 60.0);
        }

        let fractional = dataset.visits().iter().find(|v| v.patient_id == "P5").unwrap();
        assert_eq!(fractional.wait_minutes, 0.0009 / 60.0);
    }

    #[test]
    fn rollover_visits_are_flagged() {
        let dataset = build_dataset(&sample(), &[]).unwrap();
        assert_eq!(dataset.anomalies(), &[OrderingAnomaly {
            row: 2,
            patient_id: "P3".into(),
            wait_minutes: 20.0,
            consultation_minutes: -1420.0,
        }]);
    }

    #[test]
    fn filter_options_follow_data() {
        let dataset = build_dataset(&sample(), &[]).unwrap();
        assert_eq!(dataset.filter_options(), FilterOptions {
            days: vec![DayOfWeek::Monday, DayOfWeek::Tuesday, DayOfWeek::Sunday],
            doctor_types: vec!["General".into(), "Surgeon".into(), "Cardiology".into()],
        });
    }

    #[test]
    fn empty_input_builds_empty_dataset() {
        let dataset = build_dataset(&table(vec![]), &[]).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.filter_options().days.is_empty());
    }
}
