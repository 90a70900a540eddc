use std::collections::BTreeSet;

use serde::{Serialize, Deserialize};

use crate::dataset::Dataset;
use crate::model::{DayOfWeek, Visit};

/// Multi-select restrictions. An empty set places no restriction on its dimension.
#[derive(Clone, Serialize, Deserialize, Eq, PartialEq, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Filter {
    pub days: BTreeSet<DayOfWeek>,
    pub doctor_types: BTreeSet<String>,
}

impl Filter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_days(mut self, days: impl IntoIterator<Item = DayOfWeek>) -> Self {
        self.days.extend(days);
        self
    }

    pub fn with_doctor_types<S: Into<String>>(
        mut self,
        doctor_types: impl IntoIterator<Item = S>,
    ) -> Self {
        self.doctor_types.extend(doctor_types.into_iter().map(Into::into));
        self
    }

    /// OR within a dimension, AND across dimensions.
    pub fn matches(&self, visit: &Visit) -> bool {
        (self.days.is_empty() || self.days.contains(&visit.day_of_week))
            && (self.doctor_types.is_empty() || self.doctor_types.contains(&visit.doctor_type))
    }
}

/// Matching visits, in dataset order. The dataset itself is untouched.
pub fn apply<'a>(dataset: &'a Dataset, filter: &Filter) -> Vec<&'a Visit> {
    dataset.visits().iter().filter(|visit| filter.matches(visit)).collect()
}
