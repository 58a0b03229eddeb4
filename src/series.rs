use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    config::Layout,
    data::{date_index, Dataset, Error, Record, Series},
    read::RecordSink,
};

/// Collects records column by column into a `Dataset`.
///
/// Input must already be in chronological order; the builder only checks it,
/// it never sorts. Rows sharing a date are fine.
#[derive(Debug, Default)]
pub struct SeriesBuilder {
    label: String,
    names: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<Decimal>>,
}

impl SeriesBuilder {
    pub fn new(layout: &Layout) -> Self {
        let mut builder = Self::default();
        builder.start(layout);
        builder
    }

    pub fn finish(self) -> Dataset {
        Dataset {
            label: self.label,
            index: self.dates.iter().copied().map(date_index).collect(),
            dates: self.dates,
            series: self
                .names
                .into_iter()
                .zip(self.columns)
                .map(|(name, values)| Series::new(name, values))
                .collect(),
        }
    }
}

impl RecordSink for SeriesBuilder {
    fn start(&mut self, layout: &Layout) {
        self.names = layout.names();
        self.label = layout
            .label_column
            .and_then(|_| layout.fields.last())
            .map(|f| f.name.clone())
            .unwrap_or_default();
        self.columns = vec![Vec::new(); self.names.len()];
    }

    fn push(&mut self, record: Record) -> Result<(), Error> {
        if let Some(&previous) = self.dates.last() {
            if record.date < previous {
                return Err(Error::UnsortedInput {
                    line: record.line,
                    date: record.date,
                    previous,
                });
            }
        }
        if record.values.len() != self.columns.len() {
            return Err(Error::LengthMismatch(record.values.len(), self.columns.len()));
        }
        self.dates.push(record.date);
        for (column, value) in self.columns.iter_mut().zip(record.values) {
            column.push(value);
        }
        Ok(())
    }
}
