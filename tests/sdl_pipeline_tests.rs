//! End-to-end tests of the public pipeline: SDL text -> `Parser` ->
//! `MetadataState` -> `FrozenMetadata` -> `Instance` -> extracted rows.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::io::Cursor;

use sheet_sdl::instance::append_row;
use sheet_sdl::{Parser, SdlError, Warning};

mod common;
use common::{MemoryWorkbook, SheetBuilder};

fn metadata(src: &str) -> sheet_sdl::FrozenMetadata {
    let mut parser = Parser::new(Cursor::new(src.as_bytes()));
    parser.parse().unwrap().validate().unwrap()
}

#[test]
fn row_oriented_header_extracts_named_rows() {
    let sdl = "\
declare-type\t\"Product\"\tString\n\
declare-type\t\"Price\"\tGBPxVAT\n\
declare-header\tA1:B1\n\
declare-data\tA2:B3\n";
    let metadata = metadata(sdl);

    let sheet = SheetBuilder::new()
        .row(&["Product", "Price"])
        .row(&["Pen", "1.20"])
        .row(&["Ink", "3.50"])
        .build();
    let workbook = MemoryWorkbook::single(sheet);

    let mut instance = metadata.bind(&workbook);
    let mut rows = Vec::new();
    let warnings = instance.extract(&mut rows, append_row).unwrap();

    assert!(warnings.is_empty());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0].name, "Product");
    assert_eq!(rows[0][0].value(), "Pen");
    assert_eq!(rows[0][1].value(), "1.20");
    assert_eq!(rows[1][0].value(), "Ink");
}

#[test]
fn comments_and_blank_lines_are_ignored_by_the_parser() {
    let sdl = "\
# price list, v2\n\
\n\
declare-type\t\"Product\"\tString\n\
\n\
# header occupies row 1\n\
declare-header\tA1:A1\n\
declare-data\tA2:A2\n";
    let metadata = metadata(sdl);
    assert_eq!(metadata.keys().len(), 1);
}

#[test]
fn unknown_header_cell_is_fatal_with_the_offending_name() {
    let metadata = metadata(
        "declare-type\t\"Product\"\tString\ndeclare-header\tA1:A1\ndeclare-data\tA2:A2\n",
    );
    let sheet = SheetBuilder::new()
        .row(&["Cost"])
        .row(&["1.00"])
        .build();
    let workbook = MemoryWorkbook::single(sheet);

    let mut instance = metadata.bind(&workbook);
    let mut rows = Vec::new();
    let err = instance.extract(&mut rows, append_row).unwrap_err();
    assert!(matches!(err, SdlError::UnknownHeader(ref s) if s == "Cost"));
}

#[test]
fn declared_key_absent_from_header_warns_but_does_not_fail() {
    let metadata = metadata(
        "declare-type\t\"Product\"\tString\n\
         declare-type\t\"Discontinued\"\tString\n\
         declare-header\tA1:A1\n\
         declare-data\tA2:A2\n",
    );
    let sheet = SheetBuilder::new().row(&["Product"]).row(&["Pen"]).build();
    let workbook = MemoryWorkbook::single(sheet);

    let mut instance = metadata.bind(&workbook);
    let mut rows = Vec::new();
    let warnings = instance.extract(&mut rows, append_row).unwrap();

    assert_eq!(rows.len(), 1);
    assert!(warnings
        .iter()
        .any(|w| matches!(w, Warning::UnusedKey(name, _) if name == "Discontinued")));
}

#[test]
fn column_header_shares_constructors_across_data_columns() {
    let metadata = metadata(
        "declare-type\t\"Product\"\tString\n\
         declare-type\t\"Price\"\tGBPxVAT\n\
         declare-header\tA1:A2\n\
         declare-data\tB1:D2\n",
    );
    let sheet = SheetBuilder::new()
        .row(&["Product", "Pen", "Ink", "Glue"])
        .row(&["Price", "1.20", "3.50", "2.00"])
        .build();
    let workbook = MemoryWorkbook::single(sheet);

    let mut instance = metadata.bind(&workbook);
    let mut rows = Vec::new();
    instance.extract(&mut rows, append_row).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 3);
    assert!(rows[0].iter().all(|c| c.name == "Product"));
    assert!(rows[1].iter().all(|c| c.name == "Price"));
}

#[test]
fn two_dimensional_header_is_rejected_at_declare_time() {
    let mut parser = Parser::new(Cursor::new(
        b"declare-header\tA1:B2\n".as_slice(),
    ));
    let err = parser.parse().unwrap_err();
    match err {
        SdlError::AtLine { line_no, source, .. } => {
            assert_eq!(line_no, 1);
            assert!(matches!(*source, SdlError::HeaderNotOneDim(_)));
        }
        other => panic!("expected AtLine, got {other:?}"),
    }
}

#[test]
fn mismatched_header_and_data_shape_is_rejected() {
    let mut parser = Parser::new(Cursor::new(
        b"declare-header\tA1:C1\ndeclare-data\tA2:B3\n".as_slice(),
    ));
    let metadata = parser.parse().unwrap();
    assert!(matches!(
        metadata.validate(),
        Err(SdlError::ShapeMismatch { .. })
    ));
}

#[test]
fn range_exceeding_the_sheet_extent_is_fatal() {
    let metadata = metadata(
        "declare-type\t\"Product\"\tString\ndeclare-header\tA1:A1\ndeclare-data\tA2:A3\n",
    );
    let sheet = SheetBuilder::new().row(&["Product"]).row(&["Pen"]).build();
    let workbook = MemoryWorkbook::single(sheet);

    let mut instance = metadata.bind(&workbook);
    let mut rows = Vec::new();
    let err = instance.extract(&mut rows, append_row).unwrap_err();
    assert!(matches!(err, SdlError::RangeOutOfBounds(_)));
}
