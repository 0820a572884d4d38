//! The spreadsheet provider interface consumed by the validation/extraction
//! engine.
//!
//! The source's own `Cell` type is a base class with an ODF-specific
//! subclass; here it is a narrow capability trait instead (see
//! `DESIGN.md`), since the set of backends (ODS, XLSX, an in-memory test
//! double, ...) is open. `Cell::type_name` stands in for the source's
//! `type()` accessor (`type` is a reserved word in Rust); `formula` and
//! `currency` return `Option<&str>` rather than the source's
//! accessors that built but never returned a value (see `DESIGN.md`).

use crate::error::{SdlError, SdlResult};

/// One spreadsheet cell.
pub trait Cell {
    /// Zero-based row.
    fn row(&self) -> u32;
    /// Zero-based column.
    fn column(&self) -> u32;
    /// `true` if this cell holds a string value.
    fn is_string(&self) -> bool;
    /// `true` if this cell holds a formula.
    fn is_formula(&self) -> bool;
    /// `true` if this cell holds a currency value.
    fn is_currency(&self) -> bool;
    /// A short designator for the cell's underlying type (backend-specific,
    /// e.g. `"string"`, `"float"`, `"currency"`).
    fn type_name(&self) -> &str;
    /// The cell's raw textual value.
    fn value(&self) -> &str;
    /// The formula text, when [`Cell::is_formula`] holds.
    fn formula(&self) -> Option<&str> {
        None
    }
    /// The currency code or symbol, when [`Cell::is_currency`] holds.
    fn currency(&self) -> Option<&str> {
        None
    }
}

/// A sheet: a rectangular grid of cells, addressed by `(row, column)`.
pub trait Sheet {
    type Cell: Cell;

    /// Number of rows in the sheet.
    fn row_count(&self) -> u32;
    /// Number of cells in the given row (rows may be ragged).
    fn row_len(&self, row: u32) -> u32;
    /// The cell at `(row, column)`, if it exists.
    fn cell(&self, row: u32, column: u32) -> Option<&Self::Cell>;
}

/// A workbook: an ordered sequence of sheets. The core only ever looks at
/// the first one (see spec §1 Non-goals: multi-sheet selection).
pub trait Workbook {
    type Sheet: Sheet;

    /// All sheets, in file order.
    fn sheets(&self) -> &[Self::Sheet];

    /// The first sheet, or [`SdlError::NoSheet`] if the workbook is empty.
    fn first_sheet(&self) -> SdlResult<&Self::Sheet> {
        self.sheets().first().ok_or(SdlError::NoSheet)
    }
}
