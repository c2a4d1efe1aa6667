//! CSV export written to disk.
use std::fs;

use smsguard::error::ExportError;
use smsguard::export::{self, CARRIERS};
use smsguard::model::PredictionRecord;

fn rec(text: &str, label: &str, carrier: Option<&str>) -> PredictionRecord {
    PredictionRecord {
        text: text.to_string(),
        label: label.to_string(),
        probability: 0.5,
        timestamp: None,
        carrier: carrier.map(str::to_string),
    }
}

#[test]
fn header_lists_every_carrier_between_text_and_labels() {
    let header = export::header();
    let columns: Vec<&str> = header.split(',').collect();
    assert_eq!(columns.len(), CARRIERS.len() + 3);
    assert_eq!(columns[0], "text");
    assert_eq!(columns[1], "carrier_DITO");
    assert_eq!(columns[CARRIERS.len()], "carrier_TNT");
    assert_eq!(&columns[CARRIERS.len() + 1..], ["label", "predicted_label"]);
}

#[test]
fn text_with_quotes_and_newline_is_escaped() {
    let row = export::row(&rec("He said \"hi\"\nbye", "Not Spam", None));
    assert!(row.starts_with("\"He said \"\"hi\"\" bye\","));
    assert!(row.ends_with(",\"Not Spam\",\"Not Spam\""));
}

#[test]
fn carrier_flag_set_only_for_matching_column() {
    let row = export::row(&rec("promo", "Spam", Some("Globe")));
    let cells: Vec<&str> = row.split(',').collect();
    let flags = &cells[1..=CARRIERS.len()];

    let globe = CARRIERS.iter().position(|c| *c == "Globe").unwrap();
    for (i, flag) in flags.iter().enumerate() {
        let expected = if i == globe { "True" } else { "False" };
        assert_eq!(*flag, expected, "column {}", CARRIERS[i]);
    }
}

#[test]
fn unknown_carrier_sets_no_flag() {
    let row = export::row(&rec("hi", "Not Spam", Some("Verizon")));
    assert!(!row.contains("True"));
}

#[test]
fn write_csv_creates_file_without_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let records = vec![
        rec("first", "Spam", Some("Smart")),
        rec("second", "Not Spam", None),
    ];

    export::write_csv(&records, &path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.split('\n').collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], export::header());
    assert!(lines[1].starts_with("\"first\","));
    assert!(lines[2].starts_with("\"second\","));
    assert!(!contents.ends_with('\n'));
}

#[test]
fn empty_history_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let err = export::write_csv(&[], &path).unwrap_err();
    assert!(matches!(err, ExportError::NoHistory));
    assert!(!path.exists());
}

#[test]
fn unwritable_path_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.csv");

    let err = export::write_csv(&[rec("x", "Spam", None)], &path).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
    assert!(err.to_string().starts_with("failed to write"));
}
