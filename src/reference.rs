//! A1-style cell and range references.
//!
//! Column letters are base-26 with letter-value 1..26 (not 0..25), so `A` is
//! column 1 and `AA` is column 27 before the final zero-based adjustment.
#![allow(clippy::indexing_slicing)] // Safe: every index is bounds-checked against bytes.len() first.

use crate::error::{SdlError, SdlResult};

/// A single cell reference, e.g. `A1` or `AB12`.
///
/// `column` and `row` are zero-based. `spec` retains the original text for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
    spec: String,
}

impl CellRef {
    /// Parse a cell specifier matching `[A-Z]+[1-9][0-9]*`.
    ///
    /// Lowercase letters, a leading zero in the row, or any trailing
    /// characters are all rejected with [`SdlError::BadReference`].
    pub fn parse(spec: &str) -> SdlResult<Self> {
        let bytes = spec.as_bytes();
        let mut i = 0;

        while i < bytes.len() && bytes[i].is_ascii_uppercase() {
            i += 1;
        }
        if i == 0 {
            return Err(SdlError::BadReference(spec.to_string()));
        }
        let letters = &bytes[..i];

        let digits = &bytes[i..];
        if digits.is_empty() || digits[0] == b'0' {
            return Err(SdlError::BadReference(spec.to_string()));
        }
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(SdlError::BadReference(spec.to_string()));
        }

        let mut column: u64 = 0;
        for &b in letters {
            column = column * 26 + u64::from(b - b'A' + 1);
        }
        let column = column - 1;

        let mut row: u64 = 0;
        for &b in digits {
            row = row * 10 + u64::from(b - b'0');
        }
        let row = row - 1;

        let column = u32::try_from(column).map_err(|_| SdlError::BadReference(spec.to_string()))?;
        let row = u32::try_from(row).map_err(|_| SdlError::BadReference(spec.to_string()))?;

        Ok(CellRef {
            column,
            row,
            spec: spec.to_string(),
        })
    }

    /// The original textual form, as supplied to [`CellRef::parse`].
    pub fn spec(&self) -> &str {
        &self.spec
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.spec)
    }
}

/// A rectangular range of cells, e.g. `A1:D8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRef {
    pub start: CellRef,
    pub end: CellRef,
    pub width: u32,
    pub height: u32,
}

impl RangeRef {
    fn new(start: CellRef, end: CellRef) -> SdlResult<Self> {
        if end.column < start.column || end.row < start.row {
            return Err(SdlError::EmptyRange(format!("{start}:{end}")));
        }
        let width = end.column - start.column + 1;
        let height = end.row - start.row + 1;
        Ok(RangeRef {
            start,
            end,
            width,
            height,
        })
    }

    /// Parse a range specifier. Two grammars are recognised:
    ///
    /// - `<cell>:<cell>` — a literal range, both halves parsed with
    ///   [`CellRef::parse`].
    /// - `<sheet>!<name>` — a named range. Syntactically recognised but
    ///   rejected with [`SdlError::Unsupported`]; escaping of `!` inside
    ///   sheet or range names is undefined and deferred.
    pub fn parse(spec: &str) -> SdlResult<Self> {
        if let Some((_sheet, _name)) = spec.split_once('!') {
            return Err(SdlError::Unsupported("named range".to_string()));
        }

        let (start, end) = spec
            .split_once(':')
            .ok_or_else(|| SdlError::BadReference(spec.to_string()))?;
        let start = CellRef::parse(start)?;
        let end = CellRef::parse(end)?;
        RangeRef::new(start, end)
    }

    /// `true` if the range collapses to a single row or a single column.
    pub fn is_one_dimensional(&self) -> bool {
        self.width == 1 || self.height == 1
    }
}

impl std::fmt::Display for RangeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
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

    #[test]
    fn parses_a1_as_origin() {
        let c = CellRef::parse("A1").unwrap();
        assert_eq!(c.column, 0);
        assert_eq!(c.row, 0);
    }

    #[test]
    fn parses_z1() {
        assert_eq!(CellRef::parse("Z1").unwrap().column, 25);
    }

    #[test]
    fn parses_aa1() {
        assert_eq!(CellRef::parse("AA1").unwrap().column, 26);
    }

    #[test]
    fn parses_ba1() {
        assert_eq!(CellRef::parse("BA1").unwrap().column, 52);
    }

    #[test]
    fn rejects_lowercase() {
        assert!(CellRef::parse("a1").is_err());
    }

    #[test]
    fn rejects_leading_zero_row() {
        assert!(CellRef::parse("A01").is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(CellRef::parse("A1x").is_err());
    }

    #[test]
    fn round_trips_through_spec() {
        for s in ["A1", "Z1", "AA1", "BA1", "AB12"] {
            let c = CellRef::parse(s).unwrap();
            assert_eq!(c.spec(), s);
        }
    }

    #[test]
    fn literal_range_computes_geometry() {
        let r = RangeRef::parse("A1:D8").unwrap();
        assert_eq!(r.width, 4);
        assert_eq!(r.height, 8);
    }

    #[test]
    fn range_rejects_end_before_start() {
        assert!(matches!(
            RangeRef::parse("B1:A1"),
            Err(SdlError::EmptyRange(_))
        ));
    }

    #[test]
    fn named_range_is_unsupported() {
        assert!(matches!(
            RangeRef::parse("Sheet1!Foo"),
            Err(SdlError::Unsupported(_))
        ));
    }
}
