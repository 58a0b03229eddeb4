use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// How the values of a column were recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// One value per period; totals come from `cumulative`.
    PerPeriod,
    /// Already a running total; per-period values come from `delta`.
    RunningTotal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: SeriesKind,
}

impl Field {
    fn new(name: &str, kind: SeriesKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Positional layout of a data row: day, month, year, then `fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub fields: Vec<Field>,
    /// Column whose header cell, when present, renames the field read from it.
    pub label_column: Option<usize>,
}

/// Number of date columns in front of the numeric fields.
pub const DATE_COLUMNS: usize = 3;

impl Layout {
    pub fn columns(&self) -> usize {
        DATE_COLUMNS + self.fields.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_progress: bool,
    pub values_are_fractional: bool,
    pub interpolate_year_boundaries: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    WorkHours,
    Progress,
    Wealth,
}

pub const HOURS: &str = "hours";
pub const PROGRESS: &str = "progress";
pub const SAVINGS: &str = "savings";
pub const STOCK_PROFIT: &str = "stock_profit";
pub const EQUITY: &str = "equity";

impl DatasetKind {
    pub fn default_path(self) -> &'static str {
        match self {
            DatasetKind::WorkHours => "work_hours.csv",
            DatasetKind::Progress => "progress.csv",
            DatasetKind::Wealth => "omaisuus.csv",
        }
    }

    pub fn default_date_format(self) -> &'static str {
        match self {
            DatasetKind::WorkHours | DatasetKind::Progress => "%d.%m.%Y",
            DatasetKind::Wealth => "%Y",
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            DatasetKind::WorkHours => Layout {
                fields: vec![Field::new(HOURS, SeriesKind::PerPeriod)],
                label_column: None,
            },
            DatasetKind::Progress => Layout {
                fields: vec![
                    Field::new(HOURS, SeriesKind::PerPeriod),
                    Field::new(PROGRESS, SeriesKind::RunningTotal),
                ],
                label_column: Some(4),
            },
            DatasetKind::Wealth => Layout {
                fields: vec![
                    Field::new(SAVINGS, SeriesKind::RunningTotal),
                    Field::new(STOCK_PROFIT, SeriesKind::RunningTotal),
                ],
                label_column: None,
            },
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            DatasetKind::WorkHours => Capabilities {
                supports_progress: false,
                values_are_fractional: false,
                interpolate_year_boundaries: false,
            },
            DatasetKind::Progress => Capabilities {
                supports_progress: true,
                values_are_fractional: true,
                interpolate_year_boundaries: false,
            },
            DatasetKind::Wealth => Capabilities {
                supports_progress: false,
                values_are_fractional: false,
                interpolate_year_boundaries: true,
            },
        }
    }
}

/// Explicit configuration handed to `pipeline::run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub dataset: DatasetKind,
    pub input_path: PathBuf,
    pub delimiter: u8,
    /// `chrono` format string used when writing dates; never used for parsing.
    pub date_format: String,
}

impl PipelineConfig {
    pub fn new(dataset: DatasetKind) -> Self {
        Self {
            dataset,
            input_path: PathBuf::from(dataset.default_path()),
            delimiter: b',',
            date_format: dataset.default_date_format().to_string(),
        }
    }

    /// Defaults for `dataset`, then the optional `tally.toml` in the working
    /// directory, then `TALLY_*` environment variables.
    pub fn load(dataset: DatasetKind) -> Result<Self> {
        let overrides: Overrides = config::Config::builder()
            .add_source(
                config::File::with_name("tally")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("TALLY"))
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .context("Invalid tally configuration")?;
        let mut cfg = Self::new(dataset);
        cfg.apply(overrides)?;
        Ok(cfg)
    }

    pub fn apply(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(path) = overrides.input_path {
            self.input_path = path;
        }
        if let Some(delimiter) = overrides.delimiter {
            self.delimiter = parse_delimiter(&delimiter).map_err(anyhow::Error::msg)?;
        }
        if let Some(format) = overrides.date_format {
            self.date_format = format;
        }
        Ok(())
    }
}

/// Optional settings layered over the per-dataset defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Overrides {
    #[serde(default)]
    pub input_path: Option<PathBuf>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub date_format: Option<String>,
}

/// A delimiter must be exactly one single-byte character.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("delimiter must be a single ASCII character, got {s:?}")),
    }
}
