//! `folio.toml` configuration.
//!
//! Every field is optional in the file; command-line flags override it.
//! Relative input paths in a file are taken relative to the file itself.

use chrono::NaiveDate;
use folio::TargetPeriod;
use folio_output::ExportFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output directory used when none is configured.
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "statements";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub(crate) type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) period: PeriodConfig,
    pub(crate) inputs: InputConfig,
    pub(crate) output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PeriodConfig {
    pub(crate) end: Option<NaiveDate>,
    pub(crate) start: Option<NaiveDate>,
    pub(crate) form: Option<String>,
    pub(crate) currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct InputConfig {
    pub(crate) presentation: Option<PathBuf>,
    pub(crate) labels: Option<PathBuf>,
    pub(crate) schema: Option<PathBuf>,
    pub(crate) company_facts: Option<PathBuf>,
    pub(crate) instance: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct OutputConfig {
    pub(crate) dir: Option<PathBuf>,
    pub(crate) format: ExportFormat,
    pub(crate) statements_only: bool,
    pub(crate) preferred_labels: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content)?;
        if let Some(base) = path.parent() {
            config.inputs.rebase(base);
            if let Some(dir) = config.output.dir.as_mut() {
                rebase(dir, base);
            }
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub(crate) fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Checks the settings an extraction run cannot do without.
    pub(crate) fn validate(&self) -> Result<()> {
        let end = self.period.end.ok_or(ConfigError::MissingField("period.end"))?;
        if let Some(start) = self.period.start {
            if start > end {
                return Err(ConfigError::Invalid {
                    field: "period.start",
                    reason: format!("{start} is after period end {end}"),
                });
            }
        }
        if self.period.currency.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "period.currency",
                reason: "must not be empty".to_string(),
            });
        }
        if self.inputs.company_facts.is_none() && self.inputs.instance.is_none() {
            return Err(ConfigError::MissingField("inputs.company_facts or inputs.instance"));
        }
        if self.inputs.schema.is_none() {
            if self.inputs.presentation.is_none() {
                return Err(ConfigError::MissingField("inputs.presentation"));
            }
            if self.inputs.labels.is_none() {
                return Err(ConfigError::MissingField("inputs.labels"));
            }
        }
        Ok(())
    }

    /// The target period. Without a start, the fiscal year ending on `end`.
    pub(crate) fn target_period(&self) -> Result<TargetPeriod> {
        let end = self.period.end.ok_or(ConfigError::MissingField("period.end"))?;
        let mut target = match self.period.start {
            Some(start) => TargetPeriod::new(start, end),
            None => TargetPeriod::fiscal_year(end),
        };
        if let Some(form) = &self.period.form {
            target = target.with_form(form.clone());
        }
        if let Some(currency) = &self.period.currency {
            target = target.with_currency(currency.trim());
        }
        Ok(target)
    }

    pub(crate) fn output_dir(&self) -> PathBuf {
        self.output
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}

impl InputConfig {
    fn rebase(&mut self, base: &Path) {
        for path in [
            &mut self.presentation,
            &mut self.labels,
            &mut self.schema,
            &mut self.company_facts,
            &mut self.instance,
        ]
        .into_iter()
        .flatten()
        {
            rebase(path, base);
        }
    }
}

fn rebase(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}
