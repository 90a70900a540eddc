use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::dataset::Dataset;
use crate::filter::{self, Filter};
use crate::model::{DayOfWeek, Visit};

#[derive(Clone, Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GroupMean<K> {
    pub key: K,
    pub mean_wait_minutes: f64,
    pub visits: usize,
}

#[derive(Clone, Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// `None` when no visit matched.
    pub average_wait_minutes: Option<f64>,
    pub average_consultation_minutes: Option<f64>,
    /// Distinct patient IDs, not visits.
    pub total_patients: usize,
    pub visit_count: usize,
    /// Matched visits with out-of-order stages, included in every figure above.
    pub anomalous_visits: usize,
    pub wait_by_day: Vec<GroupMean<DayOfWeek>>,
    /// Doctor types and financial classes come out in lexical order.
    pub wait_by_doctor_type: Vec<GroupMean<String>>,
    pub wait_by_hour: Vec<GroupMean<u32>>,
    pub wait_by_financial_class: Vec<GroupMean<String>>,
}

impl Summary {
    pub fn average_wait_label(&self) -> String {
        match self.average_wait_minutes {
            Some(mean) => format!("{:.2}", mean),
            None => "N/A".into(),
        }
    }
}

#[derive(Default)]
struct Running {
    sum: f64,
    count: usize,
}

impl Running {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 { None } else { Some(self.sum / self.count as f64) }
    }
}

/// Keyed by `Ord`, so the series comes out in key order.
fn wait_by<K, F>(visits: &[&Visit], key: F) -> Vec<GroupMean<K>>
where
    K: Ord,
    F: Fn(&Visit) -> K,
{
    let mut groups: BTreeMap<K, Running> = BTreeMap::new();
    for &visit in visits {
        groups.entry(key(visit)).or_default().add(visit.wait_minutes);
    }

    groups
        .into_iter()
        .filter_map(|(key, running)| {
            running.mean().map(|mean_wait_minutes| GroupMean {
                key,
                mean_wait_minutes,
                visits: running.count,
            })
        })
        .collect()
}

pub fn summarize(visits: &[&Visit]) -> Summary {
    let mut wait = Running::default();
    let mut consultation = Running::default();
    let mut patients: HashSet<&str> = HashSet::new();
    for &visit in visits {
        wait.add(visit.wait_minutes);
        consultation.add(visit.consultation_minutes);
        patients.insert(visit.patient_id.as_str());
    }

    Summary {
        average_wait_minutes: wait.mean(),
        average_consultation_minutes: consultation.mean(),
        total_patients: patients.len(),
        visit_count: visits.len(),
        anomalous_visits: visits.iter().filter(|v| v.is_anomalous()).count(),
        wait_by_day: wait_by(visits, |v| v.day_of_week),
        wait_by_doctor_type: wait_by(visits, |v| v.doctor_type.clone()),
        wait_by_hour: wait_by(visits, |v| v.hour_of_day),
        wait_by_financial_class: wait_by(visits, |v| v.financial_class.clone()),
    }
}

/// Recomputed from scratch on every call; total over any filter.
pub fn compute_summary(dataset: &Dataset, filter: &Filter) -> Summary {
    let visits = filter::apply(dataset, filter);
    debug!(
        days = filter.days.len(),
        doctor_types = filter.doctor_types.len(),
        matched = visits.len(),
        "computing summary"
    );
    summarize(&visits)
}
