//! Year-end estimates.
//!
//! Observations rarely fall on December 31, so the value at the end of each
//! completed year is estimated by drawing a straight line between the last
//! row of that year and the first row of the next one. A year that is never
//! followed by another one gets no estimate.

use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::data::{date_index, year_end, Dataset, Error, Series, Year, YearlyValue, YearlyValues};

/// Estimates the year-end value of every series named in `names`, for every
/// year closed by a later row. Each series is interpolated on its own.
pub fn year_end_values(data: &Dataset, names: &[&str]) -> Result<YearlyValues, Error> {
    let series = names
        .iter()
        .map(|name| data.get(name))
        .collect::<Result<Vec<&Series>, _>>()?;
    let mut rows = Vec::new();
    let mut previous_year: Option<Year> = None;

    for (i, date) in data.dates.iter().enumerate() {
        let year = date.year();
        if let Some(closed) = previous_year.filter(|&p| year > p) {
            if year - closed > 1 {
                warn!(closed, next = year, "no observations between years, skipped years get no year-end value");
            }
            let (x0, x2) = (data.index[i - 1], data.index[i]);
            if x2 == x0 {
                return Err(Error::DegenerateInterval {
                    year: closed,
                    index: x0,
                });
            }
            let x1 = date_index(year_end(closed)?);
            let values = series
                .iter()
                .map(|s| {
                    interpolate(x0, s.values[i - 1], x1, x2, s.values[i]).ok_or_else(|| {
                        Error::Overflow {
                            what: format!("{} at the end of {closed}", s.name),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            debug!(year = closed, "year closed");
            rows.push(YearlyValue {
                year: closed,
                values,
            });
        }
        previous_year = Some(year);
    }

    Ok(YearlyValues {
        names: names.iter().map(|n| n.to_string()).collect(),
        rows,
    })
}

/// Value at `x1` on the line through `(x0, y0)` and `(x2, y2)`; `x0 != x2`.
/// `None` when an intermediate result does not fit a `Decimal`.
fn interpolate(x0: i32, y0: Decimal, x1: i32, x2: i32, y2: Decimal) -> Option<Decimal> {
    y2.checked_sub(y0)?
        .checked_mul(Decimal::from(x1 - x0))?
        .checked_div(Decimal::from(x2 - x0))?
        .checked_add(y0)
}
