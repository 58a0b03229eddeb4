use chrono::NaiveDate;

use crate::data::{Series, Year, SIGNIFICANT_DIGITS};

/// X axis of a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Axis {
    Dates(Vec<NaiveDate>),
    Years(Vec<Year>),
}

impl Axis {
    pub fn len(&self) -> usize {
        match self {
            Axis::Dates(d) => d.len(),
            Axis::Years(y) => y.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One finished chart: every series has one value per axis point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    pub title: String,
    pub y_label: String,
    pub axis: Axis,
    pub series: Vec<Series>,
}

/// Whatever displays charts. The pipeline only produces them.
pub trait ChartSink {
    fn draw(&mut self, chart: Chart) -> Result<(), anyhow::Error>;
}

/// Keeps charts in memory.
impl ChartSink for Vec<Chart> {
    fn draw(&mut self, chart: Chart) -> Result<(), anyhow::Error> {
        self.push(chart);
        Ok(())
    }
}

/// Basic CSV exporter for charts: a title row, a header row, then one row
/// per axis point.
pub struct CsvChartSink<W: std::io::Write> {
    wtr: csv::Writer<W>,
    date_format: String,
}

impl<W: std::io::Write> CsvChartSink<W> {
    pub fn new(writer: W, delimiter: u8, date_format: &str) -> Self {
        Self {
            wtr: csv::WriterBuilder::new()
                .flexible(true)
                .delimiter(delimiter)
                .from_writer(writer),
            date_format: date_format.to_string(),
        }
    }

    pub fn into_inner(self) -> Result<W, anyhow::Error> {
        self.wtr.into_inner().map_err(|e| anyhow::anyhow!("{}", e.error()))
    }
}

impl<W: std::io::Write> ChartSink for CsvChartSink<W> {
    fn draw(&mut self, chart: Chart) -> Result<(), anyhow::Error> {
        self.wtr.write_record([format!("# {} ({})", chart.title, chart.y_label)])?;
        let x_name = match chart.axis {
            Axis::Dates(_) => "date",
            Axis::Years(_) => "year",
        };
        let mut header = vec![x_name.to_string()];
        header.extend(chart.series.iter().map(|s| s.name.clone()));
        self.wtr.write_record(&header)?;
        for i in 0..chart.axis.len() {
            let mut row = vec![match &chart.axis {
                Axis::Dates(d) => d[i].format(&self.date_format).to_string(),
                Axis::Years(y) => y[i].to_string(),
            }];
            row.extend(
                chart
                    .series
                    .iter()
                    .map(|s| s.values[i].round_dp(SIGNIFICANT_DIGITS).normalize().to_string()),
            );
            self.wtr.write_record(&row)?;
        }
        self.wtr.flush()?;
        Ok(())
    }
}
