use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;

/// Continuous day number of a calendar date, 0001-01-01 being day 1.
pub type DateIndex = i32;
pub type Year = i32;

/// Number of decimal places kept when values leave the pipeline for display.
pub const SIGNIFICANT_DIGITS: u32 = 4;

pub fn date_index(date: NaiveDate) -> DateIndex {
    date.num_days_from_ce()
}

/// The last day of `year`, which is where year-end values are estimated.
pub fn year_end(year: Year) -> Result<NaiveDate, Error> {
    NaiveDate::from_ymd_opt(year, 12, 31).ok_or(Error::DateOutOfRange(year))
}

/// One parsed data row. `values` lines up with the fields of the layout the
/// row was parsed with; `line` is kept around for error messages only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: u64,
    pub date: NaiveDate,
    pub values: Vec<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Decimal>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Decimal>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn last(&self) -> Option<Decimal> {
        self.values.last().copied()
    }
}

/// Everything read from one input file, column by column. All vectors have
/// the same length and keep the input row order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    /// Display name of the tracked metric, taken from the header when present.
    pub label: String,
    pub dates: Vec<NaiveDate>,
    pub index: Vec<DateIndex>,
    pub series: Vec<Series>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, name: &str) -> Result<&Series, Error> {
        self.series
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::UnknownSeries(name.to_string()))
    }

    /// Appends a series holding `a + b` row by row. Being computed per record,
    /// it can be interpolated like any other series.
    pub fn add_composite(&mut self, name: &str, a: &str, b: &str) -> Result<(), Error> {
        let a = self.get(a)?;
        let b = self.get(b)?;
        if a.values.len() != b.values.len() {
            return Err(Error::LengthMismatch(a.values.len(), b.values.len()));
        }
        let values = a
            .values
            .iter()
            .zip(&b.values)
            .map(|(x, y)| {
                x.checked_add(*y).ok_or_else(|| Error::Overflow {
                    what: format!("{name} = {} + {}", a.name, b.name),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.series.push(Series::new(name, values));
        Ok(())
    }
}

/// Estimated values of some series on December 31 of `year`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearlyValue {
    pub year: Year,
    pub values: Vec<Decimal>,
}

/// Year-end values for a set of series; each `YearlyValue::values` lines up
/// with `names`. Years are increasing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct YearlyValues {
    pub names: Vec<String>,
    pub rows: Vec<YearlyValue>,
}

impl YearlyValues {
    pub fn years(&self) -> Vec<Year> {
        self.rows.iter().map(|r| r.year).collect()
    }

    /// Column of year-end values for one series.
    pub fn column(&self, name: &str) -> Result<Vec<Decimal>, Error> {
        let col = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::UnknownSeries(name.to_string()))?;
        Ok(self.rows.iter().map(|r| r.values[col]).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthRecord {
    pub year: Year,
    pub growth_percent: Decimal,
}

/// Everything that can go wrong while deriving series. None of these are
/// recoverable: the first one aborts the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error("Row at line {line} is dated {date}, before the previous row ({previous})")]
    UnsortedInput {
        line: u64,
        date: NaiveDate,
        previous: NaiveDate,
    },
    #[error("Cannot interpolate the end of {year}: both surrounding rows have date index {index}")]
    DegenerateInterval { year: Year, index: DateIndex },
    #[error("Undefined ratio for {what}: denominator is zero")]
    UndefinedRatio { what: String },
    #[error("Arithmetic overflow in {what}")]
    Overflow { what: String },
    #[error("Unknown series `{0}`")]
    UnknownSeries(String),
    #[error("Series lengths differ ({0} vs {1})")]
    LengthMismatch(usize, usize),
    #[error("Input contains no data rows")]
    EmptyInput,
    #[error("Year {0} is out of the supported date range")]
    DateOutOfRange(Year),
    #[error("Failed to read input: {0}")]
    Read(String),
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Read(e.to_string())
    }
}
