//! Integration tests for export and summary rendering.

use chrono::NaiveDate;
use std::fs;
use tenor_data::TimeSeriesTable;
use tenor_output::{
    ExportFormat, Exporter, FILTERED_RETURNS_FILE, FilteredReturnsExport, ReportBuilder,
    ReportSelection, asset_summaries, metrics_table, summary_table,
};
use tenor_risk::{PortfolioMetrics, ReturnStatistics, RiskThresholds};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn filtered_returns() -> TimeSeriesTable {
    TimeSeriesTable::new(
        &[date(2024, 1, 4), date(2024, 1, 3)],
        vec![
            ("BOND_A".to_string(), vec![Some(-0.0294117647), Some(0.02)]),
            ("BOND_B".to_string(), vec![Some(-0.0098039216), Some(0.02)]),
        ],
    )
    .unwrap()
}

#[test]
fn test_export_filtered_returns_to_file() {
    let export = FilteredReturnsExport::from_table(&filtered_returns()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(FILTERED_RETURNS_FILE);
    export.export_to_file(&path, ExportFormat::Csv).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        "Date,BOND_A,BOND_B\n2024-01-04,-2.9412%,-0.9804%\n2024-01-03,2.0000%,2.0000%\n"
    );

    let json_path = dir.path().join("filtered_returns.json");
    export
        .export_to_file(&json_path, ExportFormat::PrettyJson)
        .unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed["assets"], serde_json::json!(["BOND_A", "BOND_B"]));
    assert_eq!(parsed["rows"][0]["date"], "2024-01-04");
    assert_eq!(parsed["rows"][1]["values"][0], 0.02);
}

#[test]
fn test_full_analytics_workflow() {
    let stats = ReturnStatistics::from_table(&filtered_returns()).unwrap();
    let metrics = PortfolioMetrics::compute(&stats, &RiskThresholds::default());

    let ascii = summary_table(&asset_summaries(&stats)).to_ascii_table();
    assert!(ascii.contains("Summary Statistics"));
    assert!(ascii.contains("BOND_A"));
    assert!(ascii.contains("BOND_B"));

    let markdown = metrics_table(&metrics).to_markdown();
    assert!(markdown.contains("## Risk Metrics"));
    assert!(markdown.contains("| Worst Period Return | -2.94% |"));

    let report = ReportBuilder::new()
        .section("analytics")
        .selection(ReportSelection {
            assets: stats.names().to_vec(),
            start: Some(date(2024, 1, 3)),
            end: Some(date(2024, 1, 4)),
        })
        .contents(&metrics)
        .unwrap()
        .build();
    let json = report.to_json().unwrap();
    assert!(json.contains("\"average_volatility\""));
    assert!(json.contains("\"BOND_A\""));
}
