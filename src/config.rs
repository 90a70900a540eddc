use std::path::Path;

use anyhow::Context;
use serde::{Serialize, Deserialize};

use crate::timestamp::TimeFormats;

/// What a build does with a row whose date or time cannot be parsed.
#[derive(Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    #[default]
    Skip,
    Abort,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
pub struct ParsingConfig {
    pub date_formats: Vec<String>,
    pub time_formats: Vec<String>,
    pub on_parse_error: ParseFailurePolicy,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        let formats = TimeFormats::default();
        Self {
            date_formats: formats.date_formats,
            time_formats: formats.time_formats,
            on_parse_error: ParseFailurePolicy::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsConfig {
    pub extra_required: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub parsing: ParsingConfig,
    pub columns: ColumnsConfig,
}

impl PipelineConfig {
    pub fn from_toml_str(data: &str) -> anyhow::Result<Self> {
        let config: PipelineConfig = toml::from_str(data).context("invalid pipeline config")?;
        if config.parsing.date_formats.is_empty() || config.parsing.time_formats.is_empty() {
            anyhow::bail!("pipeline config needs at least one date format and one time format");
        }

        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    pub fn time_formats(&self) -> TimeFormats {
        TimeFormats {
            date_formats: self.parsing.date_formats.clone(),
            time_formats: self.parsing.time_formats.clone(),
        }
    }
}
