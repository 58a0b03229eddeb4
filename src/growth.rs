use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::compute::divide;
use crate::data::{Error, GrowthRecord, YearlyValues};

/// What a year's value is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// The same series one year earlier.
    SelfReferential,
    /// Another series (usually the combined total) one year earlier.
    Baseline(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthRequest {
    pub series: String,
    pub comparison: Comparison,
    /// Added to every percentage; `100` turns a profit share into a growth
    /// contribution.
    pub offset: Decimal,
}

impl GrowthRequest {
    pub fn own(series: &str) -> Self {
        Self {
            series: series.to_string(),
            comparison: Comparison::SelfReferential,
            offset: Decimal::ZERO,
        }
    }

    pub fn against(series: &str, baseline: &str) -> Self {
        Self {
            series: series.to_string(),
            comparison: Comparison::Baseline(baseline.to_string()),
            offset: Decimal::ZERO,
        }
    }

    pub fn with_offset(self, offset: Decimal) -> Self {
        Self { offset, ..self }
    }

    pub fn label(&self) -> String {
        match &self.comparison {
            Comparison::SelfReferential => self.series.clone(),
            Comparison::Baseline(baseline) => format!("{} per {}", self.series, baseline),
        }
    }
}

/// Year-over-year growth in percent, one record per year after the first:
/// `100 * (value[i] / reference[i - 1] - 1) + offset`.
pub fn growth(yearly: &YearlyValues, request: &GrowthRequest) -> Result<Vec<GrowthRecord>, Error> {
    let values = yearly.column(&request.series)?;
    let reference = match &request.comparison {
        Comparison::SelfReferential => values.clone(),
        Comparison::Baseline(baseline) => yearly.column(baseline)?,
    };
    yearly
        .rows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, row)| {
            let what = || format!("{} growth in {}", request.label(), row.year);
            let ratio = divide(values[i], reference[i - 1], what)?;
            let growth_percent = ratio
                .checked_sub(Decimal::ONE)
                .and_then(|r| r.checked_mul(dec!(100)))
                .and_then(|p| p.checked_add(request.offset))
                .ok_or_else(|| Error::Overflow { what: what() })?;
            Ok(GrowthRecord {
                year: row.year,
                growth_percent,
            })
        })
        .collect()
}
