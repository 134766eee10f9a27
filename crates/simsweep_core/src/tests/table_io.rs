//! Tests for the CSV result artifact
//!
//! These tests verify that:
//! - Tables round-trip through write and read exactly
//! - Headers come from declared names or positional labels, no index column
//! - Read-back validates the header width and every field

use std::fs;

use crate::error::TableError;
use crate::grid::ResultGrid;
use crate::space::{ParamValue, Parameter, ParameterSpace, ResultColumns, RowMode};
use crate::table::{read_table, write_table};

fn sample_grid() -> ResultGrid {
    ResultGrid::from_flat(2, vec![11.0, 0.5, 21.0, 0.25, 12.0, 0.75, 22.0, 1.0]).unwrap()
}

#[test]
fn test_named_header_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");
    let columns = ResultColumns::Names(vec!["throughput".into(), "loss".into()]);
    let grid = sample_grid();

    write_table(&path, &grid, &columns).unwrap();
    let read_back = read_table(&path, &columns).unwrap();
    assert_eq!(read_back, grid);

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("throughput,loss"),
        "Header must be the declared names with no index column"
    );
    assert_eq!(lines.count(), grid.rows());
}

#[test]
fn test_positional_header_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");
    let columns = ResultColumns::Count(2);

    write_table(&path, &sample_grid(), &columns).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some("0,1"));

    let read_back = read_table(&path, &columns).unwrap();
    assert_eq!(read_back, sample_grid());
}

#[test]
fn test_read_rejects_header_width_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");
    write_table(&path, &sample_grid(), &ResultColumns::Count(2)).unwrap();

    match read_table(&path, &ResultColumns::Count(3)) {
        Err(TableError::HeaderMismatch { expected, found }) => {
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        other => panic!("Expected HeaderMismatch, got {other:?}"),
    }
}

#[test]
fn test_read_rejects_non_numeric_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");
    fs::write(&path, "x,y\n1.0,2.0\n3.0,broken\n").unwrap();

    match read_table(&path, &ResultColumns::Count(2)) {
        Err(TableError::BadNumber { row, column, token }) => {
            assert_eq!(row, 1);
            assert_eq!(column, 1);
            assert_eq!(token, "broken");
        }
        other => panic!("Expected BadNumber, got {other:?}"),
    }
}

#[test]
fn test_write_rejects_label_width_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");
    let columns = ResultColumns::Names(vec!["only".into()]);
    assert!(matches!(
        write_table(&path, &sample_grid(), &columns),
        Err(TableError::HeaderMismatch { .. })
    ));
}

/// Persist, read back, reshape: the whole artifact path in one go
#[test]
fn test_round_trip_then_reshape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");
    let columns = ResultColumns::Count(2);
    let space = ParameterSpace::new(vec![
        Parameter::new("a", vec![ParamValue::Int(1), ParamValue::Int(2)]),
        Parameter::new("b", vec![ParamValue::Int(10), ParamValue::Int(20)]),
    ])
    .unwrap();

    write_table(&path, &sample_grid(), &columns).unwrap();
    let shaped = read_table(&path, &columns)
        .unwrap()
        .reshape(&space, 7, RowMode::Averaged)
        .unwrap();
    assert_eq!(shaped.shape(), &[2, 2, 2]);
    assert_eq!(shaped.get(&[1, 1, 0]), Some(22.0));
}
