//! Integration tests for reading the input workbooks.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tenor_data::{DataError, InputFiles, InputKind, RawSheet, ReadError};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_load_fixture_workbooks() {
    let tables = InputFiles::new(fixtures()).load().unwrap();

    // Key rates carry Excel serial dates and are scaled from percent
    assert_eq!(tables.rate_curve.column_names(), vec!["2Y", "5Y", "10Y"]);
    assert_eq!(tables.rate_curve.height(), 4);
    assert_eq!(
        tables.rate_curve.dates().unwrap()[0],
        date(2024, 1, 1)
    );
    assert_relative_eq!(
        tables.rate_curve.values("2Y").unwrap()[1].unwrap(),
        0.02,
        epsilon = 1e-12
    );

    // Asset prices carry text dates
    assert_eq!(
        tables.asset_prices.column_names(),
        vec!["BOND_A", "BOND_B", "EQ_X"]
    );
    assert_eq!(
        tables.asset_prices.date_range().unwrap(),
        Some((date(2024, 1, 2), date(2024, 1, 5)))
    );
    assert_eq!(tables.asset_prices.values("BOND_A").unwrap()[0], Some(100.0));

    assert_eq!(tables.durations.row_labels(), ["BOND_A", "BOND_B", "BOND_C"]);
    assert_eq!(tables.durations.column_labels(), ["2Y", "5Y", "10Y"]);
    assert_eq!(tables.durations.get("BOND_B", "5Y"), Some(3.9));
    assert_eq!(tables.convexity.get("BOND_C", "10Y"), Some(0.7));
}

#[test]
fn test_raw_sheet_from_workbook() {
    let sheet = RawSheet::read(&fixtures().join("durations.xlsx")).unwrap();
    assert_eq!(sheet.header, vec!["", "2Y", "5Y", "10Y"]);
    assert_eq!(sheet.rows.len(), 3);
}

#[test]
fn test_csv_inputs_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("rates.csv"),
        "Date,2Y\n2024-01-02,2.00\n2024-01-03,2.10\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("prices.csv"),
        "Date,BOND_A\n2024-01-02,100\n2024-01-03,102\n",
    )
    .unwrap();
    fs::write(dir.path().join("dur.csv"), ",2Y\nBOND_A,1.8\n").unwrap();
    fs::write(dir.path().join("cvx.csv"), ",2Y\nBOND_A,0.04\n").unwrap();

    let files = InputFiles::new(dir.path())
        .with_file_name(InputKind::KeyRates, "rates.csv")
        .with_file_name(InputKind::Assets, "prices.csv")
        .with_file_name(InputKind::Durations, "dur.csv")
        .with_file_name(InputKind::Convexity, "cvx.csv");

    let tables = files.load().unwrap();
    assert_relative_eq!(
        tables.rate_curve.values("2Y").unwrap()[1].unwrap(),
        0.021,
        epsilon = 1e-12
    );
    assert_eq!(tables.durations.get("BOND_A", "2Y"), Some(1.8));
}

#[test]
fn test_three_of_four_files_present() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["KeyRates.xlsx", "Assets.xlsx", "durations.xlsx"] {
        fs::copy(fixtures().join(name), dir.path().join(name)).unwrap();
    }

    let err = InputFiles::new(dir.path()).load().unwrap_err();
    match err {
        DataError::MissingInput {
            missing, available, ..
        } => {
            assert_eq!(missing, vec!["convexity.xlsx"]);
            assert_eq!(
                available,
                vec!["Assets.xlsx", "KeyRates.xlsx", "durations.xlsx"]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_non_numeric_value_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["KeyRates.xlsx", "durations.xlsx", "convexity.xlsx"] {
        fs::copy(fixtures().join(name), dir.path().join(name)).unwrap();
    }
    fs::write(
        dir.path().join("prices.csv"),
        "Date,BOND_A\n2024-01-02,n/a\n",
    )
    .unwrap();

    let err = InputFiles::new(dir.path())
        .with_file_name(InputKind::Assets, "prices.csv")
        .load()
        .unwrap_err();

    match err {
        DataError::UnreadableInput { file, reason } => {
            assert_eq!(file, "prices.csv");
            assert_eq!(reason, "row 2, column BOND_A: non-numeric value \"n/a\"");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_corrupt_workbook_is_a_workbook_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("KeyRates.xlsx");
    fs::write(&path, b"not a workbook").unwrap();

    let err = RawSheet::read(&path).unwrap_err();
    assert!(matches!(err, ReadError::Calamine(_)), "unexpected error: {err}");
}
