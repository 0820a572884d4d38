//! Structured error and warning types for the Spreadsheet Description Language.
//!
//! Fatal conditions are represented by [`SdlError`]; non-fatal conditions
//! (`DuplicateHeader`, `UnusedKey`) are represented by [`Warning`] and
//! delivered through a side channel rather than aborting an operation.

use crate::reference::RangeRef;
use crate::types::TypeTag;

/// All fatal errors that can occur while parsing SDL, validating metadata,
/// or extracting rows from a bound sheet.
#[derive(Debug, thiserror::Error)]
pub enum SdlError {
    /// A cell or range specifier failed the A1 grammar.
    #[error("bad reference: {0}")]
    BadReference(String),

    /// A named range (`sheet!name`) was encountered; named ranges are
    /// syntactically recognised but not yet implemented.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A range's end is before its start on some axis.
    #[error("empty range: {0}")]
    EmptyRange(String),

    /// `type` deserialiser got a name the type registry doesn't know.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// First field of an SDL line is not in the directive table.
    #[error("unknown directive on line {line_no}: {directive}")]
    UnknownDirective { line_no: usize, directive: String },

    /// A quoted string argument was malformed.
    #[error("bad string: {0}")]
    BadString(String),

    /// `declare-type` redeclared an existing name.
    #[error("duplicate key `{name}` (already declared as {existing})")]
    DuplicateKey { name: String, existing: TypeTag },

    /// `declare-header` or `declare-data` was used twice.
    #[error("already declared: {0}")]
    AlreadyDeclared(&'static str),

    /// Metadata was validated without a `declare-header` line.
    #[error("no header range declared")]
    MissingHeader,

    /// Metadata was validated without a `declare-data` line.
    #[error("no data range declared")]
    MissingData,

    /// `declare-header`'s range was not one-dimensional.
    #[error("header range is not one-dimensional: {0}")]
    HeaderNotOneDim(RangeRef),

    /// Header and data region shapes disagree.
    #[error("shape mismatch: header is {header} but data is {data}")]
    ShapeMismatch { header: RangeRef, data: RangeRef },

    /// `Parser::parse` was invoked twice on the same parser.
    #[error("parse() has already been called on this parser")]
    AlreadyParsed,

    /// The workbook has no sheets.
    #[error("workbook has no sheet")]
    NoSheet,

    /// A declared range exceeds the sheet's actual extent.
    #[error("range out of bounds: {0}")]
    RangeOutOfBounds(RangeRef),

    /// A header cell was not string-typed.
    #[error("header cell at (row {row}, col {col}) is not a string")]
    HeaderNotString { row: u32, col: u32 },

    /// A header cell's text was never declared by `declare-type`.
    #[error("unknown header: {0}")]
    UnknownHeader(String),

    /// An error raised while handling a specific SDL line, annotated with
    /// the line's original text and line number. The inner error keeps its
    /// original kind.
    #[error("line {line_no}: \"{line}\": {source}")]
    AtLine {
        line_no: usize,
        line: String,
        #[source]
        source: Box<SdlError>,
    },

    /// I/O error reading an SDL source or spreadsheet file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal invariant was violated. Seeing this is a bug in this
    /// crate, not a malformed SDL document or spreadsheet.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SdlError {
    /// Wrap this error with the SDL line that produced it, preserving the
    /// original error kind as the `source`.
    pub fn at_line(self, line_no: usize, line: &str) -> Self {
        SdlError::AtLine {
            line_no,
            line: line.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result alias used throughout the crate.
pub type SdlResult<T> = std::result::Result<T, SdlError>;

/// Non-fatal conditions surfaced during extraction.
///
/// Warnings never abort an operation; they are collected and returned
/// alongside a successful result (see [`crate::instance::Instance::extract`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A declared name appeared more than once in the header.
    DuplicateHeader(String),
    /// A declared name never appeared in the header.
    UnusedKey(String, TypeTag),
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::DuplicateHeader(name) => write!(f, "duplicate header: {name}"),
            Warning::UnusedKey(name, ty) => write!(f, "unused key: {name} ({ty})"),
        }
    }
}
