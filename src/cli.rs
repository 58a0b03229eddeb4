//! Shared entry point of the `tally-*` binaries. Each binary only picks its
//! dataset; argument parsing, logging and output are the same for all.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    config::{parse_delimiter, DatasetKind, PipelineConfig},
    pipeline::run,
    write::{ChartSink, CsvChartSink},
};

#[derive(Debug, Parser)]
#[command(version, about = "Derive totals, ratios and growth rates from a tracking CSV")]
pub struct Args {
    /// Input file [default: the dataset's usual file name]
    pub input: Option<PathBuf>,

    /// Field delimiter, a single character [default: ,]
    #[arg(value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

impl Args {
    pub fn apply(self, config: &mut PipelineConfig) {
        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
    }
}

/// Logs go to stderr so stdout only carries the summary and chart tables.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn main(dataset: DatasetKind) -> Result<(), anyhow::Error> {
    init_tracing();
    let args = Args::parse();
    let mut config = PipelineConfig::load(dataset)?;
    args.apply(&mut config);

    let mut charts = Vec::new();
    let summary = run(&config, &mut charts)?;

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{summary}")?;
    let mut sink = CsvChartSink::new(stdout, config.delimiter, &config.date_format);
    for chart in charts {
        sink.draw(chart)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Args;
    use crate::config::{DatasetKind, PipelineConfig};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn positional_arguments() {
        let mut config = PipelineConfig::new(DatasetKind::Progress);
        Args::try_parse_from(["tally-progress", "mine.csv", ";"])
            .unwrap()
            .apply(&mut config);
        assert_eq!(config.input_path, PathBuf::from("mine.csv"));
        assert_eq!(config.delimiter, b';');
    }

    #[test]
    fn defaults_without_arguments() {
        let mut config = PipelineConfig::new(DatasetKind::Progress);
        Args::try_parse_from(["tally-progress"]).unwrap().apply(&mut config);
        assert_eq!(config, PipelineConfig::new(DatasetKind::Progress));
    }

    #[test]
    fn rejects_long_delimiter() {
        assert!(Args::try_parse_from(["tally-progress", "mine.csv", "::"]).is_err());
        assert!(Args::try_parse_from(["tally-progress", "a", "b", "c"]).is_err());
    }
}
