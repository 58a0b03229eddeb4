use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::data::Error;

/// Running sum: `out[i] = values[i] + out[i - 1]`.
pub fn cumulative(values: &[Decimal]) -> Result<Vec<Decimal>, Error> {
    let mut total = Decimal::ZERO;
    values
        .iter()
        .map(|v| {
            total = total.checked_add(*v).ok_or_else(|| Error::Overflow {
                what: "running total".to_string(),
            })?;
            Ok(total)
        })
        .collect()
}

/// Inverse of `cumulative`: recovers per-period values from a running total.
/// The first value is kept as is.
pub fn delta(totals: &[Decimal]) -> Result<Vec<Decimal>, Error> {
    let mut previous = Decimal::ZERO;
    totals
        .iter()
        .map(|&v| {
            let d = v.checked_sub(previous).ok_or_else(|| Error::Overflow {
                what: "period difference".to_string(),
            })?;
            previous = v;
            Ok(d)
        })
        .collect()
}

/// `a / b`. Only a zero `b` is undefined; a quotient too large for a
/// `Decimal` is an overflow.
pub fn divide(a: Decimal, b: Decimal, what: impl FnOnce() -> String) -> Result<Decimal, Error> {
    if b.is_zero() {
        return Err(Error::UndefinedRatio { what: what() });
    }
    a.checked_div(b).ok_or_else(|| Error::Overflow { what: what() })
}

/// Element-wise `a[i] / b[i]`. A zero in `b` is an error naming the row's
/// date, never a zero result.
pub fn ratio(a: &[Decimal], b: &[Decimal], dates: &[NaiveDate]) -> Result<Vec<Decimal>, Error> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch(a.len(), b.len()));
    }
    if a.len() != dates.len() {
        return Err(Error::LengthMismatch(a.len(), dates.len()));
    }
    a.iter()
        .zip(b)
        .zip(dates)
        .map(|((a, b), date)| divide(*a, *b, || format!("row dated {date}")))
        .collect()
}

/// Ratio of the final values of two running totals.
pub fn average_ratio(total_a: &[Decimal], total_b: &[Decimal]) -> Result<Decimal, Error> {
    let (a, b) = match (total_a.last(), total_b.last()) {
        (Some(a), Some(b)) => (*a, *b),
        _ => return Err(Error::EmptyInput),
    };
    divide(a, b, || "average ratio".to_string())
}
