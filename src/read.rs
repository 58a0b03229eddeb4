use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{Layout, DATE_COLUMNS};
use crate::data::{Error, Record};

/// Trait for doing something with a `Record` read from a delimited file.
/// The series builder is the real consumer; tests plug in a recorder to
/// check what the reader produced.
pub trait RecordSink {
    /// Called once with the layout as resolved from the header row.
    fn start(&mut self, _layout: &Layout) {}
    fn push(&mut self, record: Record) -> Result<(), Error>;
}

/// Streams every data row of `reader` into `sink`, stopping at the first
/// bad row. Row 0 is the header; it only ever renames the labelled field.
pub fn read_records<R: std::io::Read, S: RecordSink>(
    reader: R,
    delimiter: u8,
    layout: &Layout,
    sink: &mut S,
) -> Result<Layout, Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(reader);
    let mut records = rdr.records();

    let layout = match records.next() {
        Some(header) => resolve_layout(&header?, layout),
        None => layout.clone(),
    };
    sink.start(&layout);

    let mut rows = 0usize;
    for result in records {
        let row = result?;
        let line = row.position().map_or(0, |p| p.line());
        sink.push(parse_record(&row, &layout, line)?)?;
        rows += 1;
    }
    debug!(rows, "input read");
    Ok(layout)
}

/// Applies the header's label cell, if it has one, to the layout.
pub fn resolve_layout(header: &StringRecord, layout: &Layout) -> Layout {
    let mut layout = layout.clone();
    let Some(column) = layout.label_column else {
        return layout;
    };
    match header.get(column).map(str::trim).filter(|s| !s.is_empty()) {
        Some(label) => {
            let field = column
                .checked_sub(DATE_COLUMNS)
                .and_then(|i| layout.fields.get_mut(i));
            if let Some(field) = field {
                field.name = label.to_lowercase();
            }
        }
        None => debug!(column, "header has no label column, keeping generic names"),
    }
    layout
}

/// Parses one data row: day, month, year, then one number per layout field.
pub fn parse_record(row: &StringRecord, layout: &Layout, line: u64) -> Result<Record, Error> {
    let malformed = |reason: String| Error::MalformedRow { line, reason };
    if row.len() < layout.columns() {
        return Err(malformed(format!(
            "expected {} fields, found {}",
            layout.columns(),
            row.len()
        )));
    }
    let day: u32 = parse_field(&row[0], "day").map_err(malformed)?;
    let month: u32 = parse_field(&row[1], "month").map_err(malformed)?;
    let year: i32 = parse_field(&row[2], "year").map_err(malformed)?;
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| malformed(format!("{day}.{month}.{year} is not a valid date")))?;
    let values = layout
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| parse_field::<Decimal>(&row[DATE_COLUMNS + i], &field.name))
        .collect::<Result<Vec<_>, _>>()
        .map_err(malformed)?;
    Ok(Record { line, date, values })
}

fn parse_field<T: FromStr>(text: &str, what: &str) -> Result<T, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("{what} `{text}` is not a number"))
}
