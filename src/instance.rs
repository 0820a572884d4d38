//! Binding metadata to a concrete sheet, and extracting typed rows.
//!
//! [`FrozenMetadata::bind`] is spec's "`validate(sheet) -> Instance`": it
//! constructs an [`Instance`] carrying the sheet handle and a fresh copy of
//! the declared keys as `unused_keys`. [`Instance::extract`] then walks the
//! header and data ranges and streams rows through a caller-supplied sink.

use std::collections::BTreeSet;

use crate::error::{SdlError, SdlResult, Warning};
use crate::metadata::FrozenMetadata;
use crate::reference::RangeRef;
use crate::sheet::{Cell, Sheet, Workbook};
use crate::types::TypeTag;

/// The binding of one data-region cell to its declared name and type.
pub struct CellValue<'a, C: Cell> {
    pub type_tag: TypeTag,
    pub name: String,
    pub cell: &'a C,
}

impl<'a, C: Cell> CellValue<'a, C> {
    /// Delegates to the underlying cell's raw value.
    pub fn value(&self) -> &str {
        self.cell.value()
    }

    /// Per-type validation hook. Currently a no-op; reserved for future
    /// per-`TypeTag` checks (e.g. rejecting a `Number` cell whose raw text
    /// doesn't parse).
    pub fn check(&self) {}
}

/// Transient binding of a [`FrozenMetadata`] to one concrete sheet.
///
/// Multiple `Instance`s may be derived from the same `FrozenMetadata`
/// (bound to different sheets); `FrozenMetadata` itself is read-only after
/// construction and may be shared across them.
pub struct Instance<'a, W: Workbook> {
    metadata: &'a FrozenMetadata,
    workbook: &'a W,
    unused_keys: BTreeSet<String>,
}

impl FrozenMetadata {
    /// Bind this metadata to a workbook, producing an [`Instance`] ready
    /// for [`Instance::extract`]. May be called repeatedly with different
    /// workbooks.
    pub fn bind<'a, W: Workbook>(&'a self, workbook: &'a W) -> Instance<'a, W> {
        Instance {
            metadata: self,
            workbook,
            unused_keys: self.keys().keys().cloned().collect(),
        }
    }
}

/// Checked before walking a range: the sheet must have at least
/// `range.end.row + 1` rows, and every row the range touches must have at
/// least `range.end.column + 1` cells.
fn check_bounds<S: Sheet>(sheet: &S, range: &RangeRef) -> SdlResult<()> {
    if sheet.row_count() < range.end.row + 1 {
        return Err(SdlError::RangeOutOfBounds(range.clone()));
    }
    for row in range.start.row..=range.end.row {
        if sheet.row_len(row) < range.end.column + 1 {
            return Err(SdlError::RangeOutOfBounds(range.clone()));
        }
    }
    Ok(())
}

/// A `(name, type)` pair assigned to a data-cell position by the header.
type Constructor = (String, TypeTag);

impl<'a, W: Workbook> Instance<'a, W> {
    /// Walk the header range, then the data range, tagging each data cell
    /// with its declared name and type and streaming completed rows through
    /// `row_sink`. Returns any non-fatal [`Warning`]s collected along the
    /// way (§7).
    pub fn extract<Acc>(
        &mut self,
        acc: &mut Acc,
        mut row_sink: impl FnMut(&mut Acc, Vec<CellValue<'a, W::Sheet>>),
    ) -> SdlResult<Vec<Warning>> {
        let sheet = self.workbook.first_sheet()?;
        let mut warnings = Vec::new();

        let header = self.metadata.header();
        check_bounds(sheet, header)?;
        let header_array = self.walk_header(sheet, header, &mut warnings)?;

        for (name, ty) in self.metadata.keys() {
            if self.unused_keys.contains(name) {
                warnings.push(Warning::UnusedKey(name.clone(), *ty));
            }
        }

        let data = self.metadata.data();
        check_bounds(sheet, data)?;
        self.walk_data(sheet, data, &header_array, acc, &mut row_sink)?;

        Ok(warnings)
    }

    fn walk_header(
        &mut self,
        sheet: &'a W::Sheet,
        header: &RangeRef,
        warnings: &mut Vec<Warning>,
    ) -> SdlResult<Vec<Vec<Constructor>>> {
        let rows = header.height;
        let cols = header.width;
        let mut array: Vec<Vec<Constructor>> = Vec::with_capacity(rows as usize);

        for r in 0..rows {
            let mut row = Vec::with_capacity(cols as usize);
            for c in 0..cols {
                let sheet_row = header.start.row + r;
                let sheet_col = header.start.column + c;
                // check_bounds already guarantees this cell is in range.
                let cell = sheet.cell(sheet_row, sheet_col).ok_or_else(|| {
                    SdlError::Internal(format!(
                        "header cell ({sheet_row}, {sheet_col}) missing despite passing bounds check"
                    ))
                })?;

                if !cell.is_string() {
                    return Err(SdlError::HeaderNotString {
                        row: sheet_row,
                        col: sheet_col,
                    });
                }

                let name = cell.value().to_string();
                let ty = *self
                    .metadata
                    .keys()
                    .get(&name)
                    .ok_or_else(|| SdlError::UnknownHeader(name.clone()))?;

                if !self.unused_keys.remove(&name) {
                    warnings.push(Warning::DuplicateHeader(name.clone()));
                }

                tracing::debug!(row = sheet_row, col = sheet_col, name = %name, "header cell bound");
                row.push((name, ty));
            }
            array.push(row);
        }

        Ok(array)
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_data<Acc>(
        &self,
        sheet: &'a W::Sheet,
        data: &RangeRef,
        header_array: &[Vec<Constructor>],
        acc: &mut Acc,
        row_sink: &mut impl FnMut(&mut Acc, Vec<CellValue<'a, W::Sheet>>),
    ) -> SdlResult<()> {
        let header_rows = u32::try_from(header_array.len()).unwrap_or(u32::MAX);
        let header_cols = header_array
            .first()
            .map_or(0, |r| u32::try_from(r.len()).unwrap_or(u32::MAX));

        for r in 0..data.height {
            let mut row = Vec::with_capacity(data.width as usize);
            for c in 0..data.width {
                let sheet_row = data.start.row + r;
                let sheet_col = data.start.column + c;
                let cell = sheet.cell(sheet_row, sheet_col).ok_or_else(|| {
                    SdlError::Internal(format!(
                        "data cell ({sheet_row}, {sheet_col}) missing despite passing bounds check"
                    ))
                })?;

                let (name, ty) = find_constructor(header_array, header_rows, header_cols, r, c)?;
                let cell_value = CellValue {
                    type_tag: ty,
                    name,
                    cell,
                };
                cell_value.check();
                tracing::debug!(row = sheet_row, col = sheet_col, "data cell bound");
                row.push(cell_value);
            }
            row_sink(acc, row);
        }

        Ok(())
    }
}

/// Map a data-region position to its header-assigned constructor via
/// periodic (modular) indexing. Correct for single-row and single-column
/// headers; periodic 2D headers are an unspecified extension (see
/// `DESIGN.md`).
fn find_constructor(
    header_array: &[Vec<Constructor>],
    header_rows: u32,
    header_cols: u32,
    r_in_data: u32,
    c_in_data: u32,
) -> SdlResult<Constructor> {
    let row_idx = (r_in_data % header_rows) as usize;
    let col_idx = (c_in_data % header_cols) as usize;
    header_array
        .get(row_idx)
        .and_then(|row| row.get(col_idx))
        .cloned()
        .ok_or_else(|| {
            SdlError::Internal(format!(
                "header constructor ({row_idx}, {col_idx}) out of range"
            ))
        })
}

/// The default row sink: append the row to a `Vec<Vec<CellValue>>` accumulator.
pub fn append_row<'a, C: Cell>(acc: &mut Vec<Vec<CellValue<'a, C>>>, row: Vec<CellValue<'a, C>>) {
    acc.push(row);
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::memory::{MemoryWorkbook, SheetBuilder};
    use crate::metadata::MetadataState;

    fn basic_metadata() -> FrozenMetadata {
        let mut m = MetadataState::new();
        m.declare_type("Product".into(), TypeTag::String).unwrap();
        m.declare_type("Price".into(), TypeTag::GbpExVat).unwrap();
        m.declare_header(RangeRef::parse("A1:B1").unwrap())
            .unwrap();
        m.declare_data(RangeRef::parse("A2:B3").unwrap()).unwrap();
        m.validate().unwrap()
    }

    #[test]
    fn s1_basic_row_header_extraction() {
        let metadata = basic_metadata();
        let sheet = SheetBuilder::new()
            .row(&["Product", "Price"])
            .row(&["Pen", "1.20"])
            .row(&["Ink", "3.50"])
            .build();
        let wb = MemoryWorkbook::single(sheet);

        let mut instance = metadata.bind(&wb);
        let mut rows = Vec::new();
        let warnings = instance.extract(&mut rows, append_row).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].name, "Product");
        assert_eq!(rows[0][0].value(), "Pen");
        assert_eq!(rows[0][1].name, "Price");
        assert_eq!(rows[0][1].value(), "1.20");
        assert_eq!(rows[1][0].value(), "Ink");
        assert_eq!(rows[1][1].value(), "3.50");
    }

    #[test]
    fn s2_unknown_header_is_fatal() {
        let metadata = basic_metadata();
        let sheet = SheetBuilder::new()
            .row(&["Product", "Cost"])
            .row(&["Pen", "1.20"])
            .row(&["Ink", "3.50"])
            .build();
        let wb = MemoryWorkbook::single(sheet);

        let mut instance = metadata.bind(&wb);
        let mut rows = Vec::new();
        let err = instance.extract(&mut rows, append_row).unwrap_err();
        assert!(matches!(err, SdlError::UnknownHeader(ref s) if s == "Cost"));
        assert!(rows.is_empty());
    }

    #[test]
    fn s3_unused_key_warning() {
        let mut m = MetadataState::new();
        m.declare_type("Product".into(), TypeTag::String).unwrap();
        m.declare_type("Price".into(), TypeTag::GbpExVat).unwrap();
        m.declare_type("Quantity".into(), TypeTag::Number).unwrap();
        m.declare_header(RangeRef::parse("A1:B1").unwrap())
            .unwrap();
        m.declare_data(RangeRef::parse("A2:B2").unwrap()).unwrap();
        let metadata = m.validate().unwrap();

        let sheet = SheetBuilder::new()
            .row(&["Product", "Price"])
            .row(&["Pen", "1.20"])
            .build();
        let wb = MemoryWorkbook::single(sheet);

        let mut instance = metadata.bind(&wb);
        let mut rows = Vec::new();
        let warnings = instance.extract(&mut rows, append_row).unwrap();
        assert_eq!(
            warnings,
            vec![Warning::UnusedKey("Quantity".to_string(), TypeTag::Number)]
        );
    }

    #[test]
    fn s6_column_header_orientation() {
        let mut m = MetadataState::new();
        m.declare_type("Product".into(), TypeTag::String).unwrap();
        m.declare_type("Price".into(), TypeTag::GbpExVat).unwrap();
        m.declare_type("Quantity".into(), TypeTag::Number).unwrap();
        m.declare_header(RangeRef::parse("A1:A2").unwrap())
            .unwrap();
        m.declare_data(RangeRef::parse("B1:D2").unwrap()).unwrap();
        let metadata = m.validate().unwrap();

        // Column header occupies A1:A2; row 1 names column-group 1, row 2
        // names column-group 2; data spans two rows (B,C,D) x (1,2).
        let sheet = SheetBuilder::new()
            .row(&["Product", "Pen", "Ink", "Glue"])
            .row(&["Price", "1.20", "3.50", "2.00"])
            .build();
        let wb = MemoryWorkbook::single(sheet);

        let mut instance = metadata.bind(&wb);
        let mut rows = Vec::new();
        let warnings = instance.extract(&mut rows, append_row).unwrap();
        assert_eq!(
            warnings,
            vec![Warning::UnusedKey(
                "Quantity".to_string(),
                TypeTag::Number
            )]
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0][0].name, "Product");
        assert_eq!(rows[1][0].name, "Price");
    }

    #[test]
    fn range_out_of_bounds_is_fatal() {
        let metadata = basic_metadata();
        let sheet = SheetBuilder::new().row(&["Product", "Price"]).build();
        let wb = MemoryWorkbook::single(sheet);

        let mut instance = metadata.bind(&wb);
        let mut rows = Vec::new();
        let err = instance.extract(&mut rows, append_row).unwrap_err();
        assert!(matches!(err, SdlError::RangeOutOfBounds(_)));
    }

    #[test]
    fn no_sheet_is_fatal() {
        let metadata = basic_metadata();
        let wb = MemoryWorkbook::new(vec![]);
        let mut instance = metadata.bind(&wb);
        let mut rows = Vec::new();
        assert!(matches!(
            instance.extract(&mut rows, append_row),
            Err(SdlError::NoSheet)
        ));
    }
}
