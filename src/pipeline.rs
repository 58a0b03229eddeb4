//! One parameterized pipeline for every dataset: read the file, derive the
//! series its capabilities call for, hand charts to a sink and return the
//! summary figures.

use std::fmt;
use std::fs::File;

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use crate::{
    compute::{average_ratio, cumulative, delta, ratio},
    config::{
        DatasetKind, Layout, PipelineConfig, SeriesKind, EQUITY, HOURS, SAVINGS, STOCK_PROFIT,
    },
    data::{Dataset, Error, Series, SIGNIFICANT_DIGITS},
    growth::{growth, GrowthRequest},
    interpolate::year_end_values,
    read::read_records,
    series::SeriesBuilder,
    write::{Axis, Chart, ChartSink},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub label: String,
    pub value: Decimal,
    /// Printed without decimals, the way integral datasets always were.
    pub integral: bool,
}

/// Scalars printed at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub entries: Vec<SummaryEntry>,
}

impl Summary {
    fn push(&mut self, label: impl Into<String>, value: Decimal, integral: bool) {
        self.entries.push(SummaryEntry {
            label: label.into(),
            value,
            integral,
        });
    }

    pub fn get(&self, label: &str) -> Option<Decimal> {
        self.entries.iter().find(|e| e.label == label).map(|e| e.value)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            if entry.integral {
                writeln!(f, "{}: {}", entry.label, entry.value.trunc())?;
            } else {
                writeln!(
                    f,
                    "{}: {}",
                    entry.label,
                    entry.value.round_dp(SIGNIFICANT_DIGITS).normalize()
                )?;
            }
        }
        Ok(())
    }
}

/// Runs the whole derivation for `config`. The input file is only held open
/// while it is being read.
pub fn run<S: ChartSink>(config: &PipelineConfig, sink: &mut S) -> Result<Summary, anyhow::Error> {
    info!(path = %config.input_path.display(), dataset = ?config.dataset, "reading input");
    let file = File::open(&config.input_path)
        .with_context(|| format!("Failed to open '{}'", config.input_path.display()))?;
    let data = load(file, config.delimiter, config.dataset)
        .with_context(|| format!("Failed to load '{}'", config.input_path.display()))?;
    analyze(data, config.dataset, sink)
}

/// Reads a whole dataset; a file without data rows is an error.
pub fn load<R: std::io::Read>(
    reader: R,
    delimiter: u8,
    dataset: DatasetKind,
) -> Result<Dataset, Error> {
    let layout = dataset.layout();
    let mut builder = SeriesBuilder::new(&layout);
    read_records(reader, delimiter, &layout, &mut builder)?;
    let data = builder.finish();
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }
    info!(rows = data.len(), "dataset loaded");
    Ok(data)
}

pub fn analyze<S: ChartSink>(
    data: Dataset,
    dataset: DatasetKind,
    sink: &mut S,
) -> Result<Summary, anyhow::Error> {
    match dataset {
        DatasetKind::WorkHours | DatasetKind::Progress => analyze_effort(&data, dataset, sink),
        DatasetKind::Wealth => analyze_wealth(data, dataset, sink),
    }
}

/// Per-period values and running totals of a series, whichever way it was
/// recorded.
fn periods_and_totals(
    series: &Series,
    kind: SeriesKind,
) -> Result<(Vec<Decimal>, Vec<Decimal>), Error> {
    Ok(match kind {
        SeriesKind::PerPeriod => (series.values.clone(), cumulative(&series.values)?),
        SeriesKind::RunningTotal => (delta(&series.values)?, series.values.clone()),
    })
}

/// The series read from the `i`th layout field. Header labels may repeat a
/// field name, so fields are never looked up by name.
fn field_series<'a>(data: &'a Dataset, layout: &Layout, i: usize) -> Result<&'a Series, Error> {
    data.series.get(i).ok_or_else(|| {
        Error::UnknownSeries(layout.fields.get(i).map(|f| f.name.clone()).unwrap_or_default())
    })
}

fn date_chart(data: &Dataset, title: &str, y_label: &str, series: Vec<Series>) -> Chart {
    Chart {
        title: title.to_string(),
        y_label: y_label.to_string(),
        axis: Axis::Dates(data.dates.clone()),
        series,
    }
}

fn analyze_effort<S: ChartSink>(
    data: &Dataset,
    dataset: DatasetKind,
    sink: &mut S,
) -> Result<Summary, anyhow::Error> {
    let caps = dataset.capabilities();
    let layout = dataset.layout();
    let mut summary = Summary::default();

    let (hours, total_hours) =
        periods_and_totals(field_series(data, &layout, 0)?, layout.fields[0].kind)?;
    summary.push(
        "Total working hours",
        total_hours.last().copied().unwrap_or_default(),
        !caps.values_are_fractional,
    );
    sink.draw(date_chart(
        data,
        "Hours per day",
        "Hours",
        vec![Series::new(HOURS, hours.clone())],
    ))?;
    sink.draw(date_chart(
        data,
        "Cumulative hours",
        "Hours",
        vec![Series::new("cumulative hours", total_hours.clone())],
    ))?;

    if !caps.supports_progress {
        return Ok(summary);
    }

    let label = data.label.as_str();
    let title = title_case(label);
    let (progress, total_progress) =
        periods_and_totals(field_series(data, &layout, 1)?, layout.fields[1].kind)?;
    let per_hour = ratio(&progress, &hours, &data.dates)?;
    let efficiency = average_ratio(&total_progress, &total_hours)?;
    summary.push("Average efficiency", efficiency, false);

    let absolute = format!("absolute {label}");
    let cumulative_name = format!("cumulative {label}");
    sink.draw(date_chart(
        data,
        &format!("{title} per hours"),
        &format!("{title} / hour"),
        vec![Series::new(format!("{label} per hours"), per_hour)],
    ))?;
    sink.draw(date_chart(
        data,
        &format!("Working hours and absolute {label}"),
        &format!("Hours, {title}"),
        vec![
            Series::new("working hours", hours.clone()),
            Series::new(absolute, progress),
        ],
    ))?;
    sink.draw(date_chart(
        data,
        &format!("Working hours and cumulative {label}"),
        &format!("Hours, {title}"),
        vec![
            Series::new("working hours", hours),
            Series::new(cumulative_name.clone(), total_progress.clone()),
        ],
    ))?;
    sink.draw(date_chart(
        data,
        &format!("Cumulative working hours and cumulative {label}"),
        &format!("Hours, {title}"),
        vec![
            Series::new("cumulative working hours", total_hours),
            Series::new(cumulative_name, total_progress),
        ],
    ))?;
    Ok(summary)
}

fn analyze_wealth<S: ChartSink>(
    mut data: Dataset,
    dataset: DatasetKind,
    sink: &mut S,
) -> Result<Summary, anyhow::Error> {
    let caps = dataset.capabilities();
    let layout = dataset.layout();
    let mut summary = Summary::default();

    let mut changes = Vec::new();
    for (i, field) in layout.fields.iter().enumerate() {
        let (per_row, _) = periods_and_totals(field_series(&data, &layout, i)?, field.kind)?;
        changes.push(Series::new(field.name.as_str(), per_row));
    }

    data.add_composite(EQUITY, SAVINGS, STOCK_PROFIT)?;
    let names = [SAVINGS, STOCK_PROFIT, EQUITY];
    summary.push(
        "Total equity",
        data.get(EQUITY)?.last().unwrap_or_default(),
        !caps.values_are_fractional,
    );
    sink.draw(date_chart(
        &data,
        "Wealth progress",
        "€",
        names
            .iter()
            .map(|name| data.get(name).cloned())
            .collect::<Result<Vec<Series>, Error>>()?,
    ))?;
    sink.draw(date_chart(&data, "Wealth change between rows", "€", changes))?;

    if !caps.interpolate_year_boundaries {
        return Ok(summary);
    }

    let yearly = year_end_values(&data, &names)?;
    info!(years = yearly.rows.len(), "year-end values interpolated");
    if yearly.rows.is_empty() {
        return Ok(summary);
    }
    sink.draw(Chart {
        title: "Year-end wealth".to_string(),
        y_label: "€".to_string(),
        axis: Axis::Years(yearly.years()),
        series: names
            .iter()
            .map(|name| Ok(Series::new(*name, yearly.column(name)?)))
            .collect::<Result<Vec<Series>, Error>>()?,
    })?;

    let requests = [
        GrowthRequest::own(EQUITY),
        GrowthRequest::against(SAVINGS, EQUITY),
        GrowthRequest::against(STOCK_PROFIT, EQUITY).with_offset(dec!(100)),
    ];
    let mut series = Vec::new();
    for request in &requests {
        let records = growth(&yearly, request)?;
        series.push(Series::new(
            request.label(),
            records.iter().map(|r| r.growth_percent).collect(),
        ));
        if let Some(latest) = records.last() {
            summary.push(
                format!("{} growth in {} (%)", request.label(), latest.year),
                latest.growth_percent,
                false,
            );
        }
    }
    let years = yearly.years();
    if years.len() > 1 {
        sink.draw(Chart {
            title: "Yearly growth".to_string(),
            y_label: "%".to_string(),
            axis: Axis::Years(years[1..].to_vec()),
            series,
        })?;
    }
    Ok(summary)
}

/// Upper-cases the first letter of every word.
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
