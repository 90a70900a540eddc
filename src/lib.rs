//! Wait-time metrics for hospital visits.
//!
//! Raw rows are parsed, placed on the calendar and derived into [`Visit`]s once,
//! giving an immutable [`Dataset`]. Every filter change is then a fresh
//! [`compute_summary`] call over that dataset.

pub mod config;
pub mod dataset;
pub mod filter;
pub mod metrics;
pub mod model;
pub mod schema;
pub mod source;
pub mod summary;
pub mod timestamp;

pub use config::{ParseFailurePolicy, PipelineConfig};
pub use dataset::{build_dataset, build_dataset_with, Dataset, FilterOptions};
pub use filter::Filter;
pub use model::{DayOfWeek, OrderingAnomaly, RawRow, RawTable, Visit, VisitError};
pub use summary::{compute_summary, GroupMean, Summary};
