//! End-to-end runs of the pipeline on small files, one per dataset.

use std::io::Write;

use rust_decimal_macros::dec;
use tally::{
    config::{DatasetKind, PipelineConfig},
    data::Error,
    pipeline::run,
    write::{Axis, Chart, ChartSink, CsvChartSink},
};
use tempfile::NamedTempFile;

fn input(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn config(dataset: DatasetKind, file: &NamedTempFile) -> PipelineConfig {
    PipelineConfig {
        input_path: file.path().to_path_buf(),
        ..PipelineConfig::new(dataset)
    }
}

fn chart<'a>(charts: &'a [Chart], title: &str) -> &'a Chart {
    charts
        .iter()
        .find(|c| c.title == title)
        .unwrap_or_else(|| panic!("no chart titled {title:?}"))
}

#[test]
fn work_hours() {
    let file = input("day,month,year,hours\n1,2,2021,8\n2,2,2021,6\n4,2,2021,7\n");
    let mut charts = Vec::new();
    let summary = run(&config(DatasetKind::WorkHours, &file), &mut charts).unwrap();

    assert_eq!(summary.to_string(), "Total working hours: 21\n");
    assert_eq!(charts.len(), 2);
    assert_eq!(
        chart(&charts, "Cumulative hours").series[0].values,
        vec![dec!(8), dec!(14), dec!(21)]
    );
}

#[test]
fn progress_with_label() {
    let file = input(
        "day;month;year;hours;Pages\n\
         1;3;2021;2;10\n\
         2;3;2021;2.5;20\n\
         3;3;2021;1.5;23\n",
    );
    let mut cfg = config(DatasetKind::Progress, &file);
    cfg.delimiter = b';';
    let mut charts = Vec::new();
    let summary = run(&cfg, &mut charts).unwrap();

    assert_eq!(summary.get("Total working hours"), Some(dec!(6)));
    assert_eq!(summary.get("Average efficiency"), Some(dec!(23) / dec!(6)));
    assert_eq!(charts.len(), 6);

    let absolute = chart(&charts, "Working hours and absolute pages");
    assert_eq!(absolute.series[1].name, "absolute pages");
    assert_eq!(absolute.series[1].values, vec![dec!(10), dec!(10), dec!(3)]);
    assert_eq!(
        chart(&charts, "Pages per hours").series[0].values,
        vec![dec!(5), dec!(4), dec!(2)]
    );
}

#[test]
fn progress_labelled_like_hours() {
    let file = input("d,m,y,h,Hours\n1,1,2021,2,10\n2,1,2021,4,30\n");
    let mut charts = Vec::new();
    let summary = run(&config(DatasetKind::Progress, &file), &mut charts).unwrap();

    assert_eq!(summary.get("Average efficiency"), Some(dec!(5)));
    assert_eq!(
        chart(&charts, "Hours per hours").series[0].values,
        vec![dec!(5), dec!(5)]
    );
}

#[test]
fn progress_fractional_total_hours() {
    let file = input("d,m,y,h,p\n1,1,2021,2,10\n2,1,2021,4.5,30\n");
    let summary = run(&config(DatasetKind::Progress, &file), &mut Vec::new()).unwrap();
    assert_eq!(
        summary.to_string(),
        "Total working hours: 6.5\nAverage efficiency: 4.6154\n"
    );
}

#[test]
fn work_hours_total_is_truncated() {
    let file = input("d,m,y,h\n1,2,2021,8\n2,2,2021,6.75\n");
    let summary = run(&config(DatasetKind::WorkHours, &file), &mut Vec::new()).unwrap();
    assert_eq!(summary.to_string(), "Total working hours: 14\n");
}

#[test]
fn progress_zero_hours_is_undefined() {
    let file = input("d,m,y,h,p\n1,3,2021,2,10\n2,3,2021,0,12\n");
    let err = run(&config(DatasetKind::Progress, &file), &mut Vec::new()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<Error>(),
        Some(&Error::UndefinedRatio {
            what: "row dated 2021-03-02".to_string()
        })
    );
}

#[test]
fn wealth_growth() {
    let file = input(
        "day,month,year,savings,stock profits\n\
         1,1,2020,1000,0\n\
         1,1,2021,1000,0\n\
         1,1,2022,1100,100\n",
    );
    let mut charts = Vec::new();
    let summary = run(&config(DatasetKind::Wealth, &file), &mut charts).unwrap();

    assert_eq!(summary.get("Total equity"), Some(dec!(1200)));

    let changes = chart(&charts, "Wealth change between rows");
    assert_eq!(changes.series[0].name, "savings");
    assert_eq!(changes.series[0].values, vec![dec!(1000), dec!(0), dec!(100)]);
    assert_eq!(changes.series[1].values, vec![dec!(0), dec!(0), dec!(100)]);

    let yearly = chart(&charts, "Year-end wealth");
    assert_eq!(yearly.axis, Axis::Years(vec![2020, 2021]));
    // 2021 ends one day before the 1.1.2022 observation.
    let equity_2021 = yearly.series[2].values[1];
    let expected = dec!(1000) + dec!(200) * dec!(364) / dec!(365);
    assert!((equity_2021 - expected).abs() < dec!(0.000001));
    for i in 0..2 {
        assert!(
            (yearly.series[2].values[i] - yearly.series[0].values[i] - yearly.series[1].values[i])
                .abs()
                < dec!(0.000001)
        );
    }

    let growth = chart(&charts, "Yearly growth");
    assert_eq!(growth.axis, Axis::Years(vec![2021]));
    let names: Vec<&str> = growth.series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        ["equity", "savings per equity", "stock_profit per equity"]
    );
    assert!(summary.get("equity growth in 2021 (%)").is_some());
}

#[test]
fn wealth_single_row() {
    let file = input("d,m,y,s,p\n15,6,2020,500,20\n");
    let mut charts = Vec::new();
    let summary = run(&config(DatasetKind::Wealth, &file), &mut charts).unwrap();
    assert_eq!(summary.get("Total equity"), Some(dec!(520)));
    let titles: Vec<&str> = charts.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["Wealth progress", "Wealth change between rows"]);
}

#[test]
fn wealth_zero_equity_baseline() {
    let file = input("d,m,y,s,p\n31,12,2020,0,0\n31,12,2021,100,0\n1,1,2022,100,0\n");
    let err = run(&config(DatasetKind::Wealth, &file), &mut Vec::new()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<Error>(),
        Some(&Error::UndefinedRatio {
            what: "equity growth in 2021".to_string()
        })
    );
}

#[test]
fn bad_row_aborts() {
    let file = input("d,m,y,h\n1,1,2021,3\n2,1,2021\n3,1,2021,4\n");
    let err = run(&config(DatasetKind::WorkHours, &file), &mut Vec::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::MalformedRow { line: 3, .. })
    ));
}

#[test]
fn unsorted_input_aborts() {
    let file = input("d,m,y,h\n2,1,2021,3\n1,1,2021,4\n");
    let err = run(&config(DatasetKind::WorkHours, &file), &mut Vec::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::UnsortedInput { line: 3, .. })
    ));
}

#[test]
fn missing_file() {
    let cfg = PipelineConfig {
        input_path: "does/not/exist.csv".into(),
        ..PipelineConfig::new(DatasetKind::WorkHours)
    };
    assert!(run(&cfg, &mut Vec::new()).is_err());
}

#[test]
fn charts_as_csv() {
    let file = input("d,m,y,h\n1,2,2021,8\n2,2,2021,6.25\n");
    let mut charts = Vec::new();
    run(&config(DatasetKind::WorkHours, &file), &mut charts).unwrap();
    let mut sink = CsvChartSink::new(Vec::new(), b',', "%d.%m.%Y");
    for chart in charts {
        sink.draw(chart).unwrap();
    }
    let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    assert_eq!(
        out,
        "# Hours per day (Hours)\ndate,hours\n01.02.2021,8\n02.02.2021,6.25\n\
         # Cumulative hours (Hours)\ndate,cumulative hours\n01.02.2021,8\n02.02.2021,14.25\n"
    );
}
