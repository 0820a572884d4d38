//! sheet-sdl — the Spreadsheet Description Language.
//!
//! A small declarative metadata language that describes the structure of
//! tabular data inside a spreadsheet, together with a validator/extractor
//! that reads a concrete spreadsheet, checks it against a metadata
//! description, and emits typed rows of data through a caller-supplied
//! sink.
//!
//! The pipeline is:
//!
//! ```text
//! SDL text --[Parser]--> MetadataState --[validate]--> FrozenMetadata
//!   --[bind(workbook)]--> Instance --[extract(row_sink)]--> rows + warnings
//! ```
//!
//! The spreadsheet itself is read through the [`sheet::Workbook`] /
//! [`sheet::Sheet`] / [`sheet::Cell`] traits; this crate only ships an
//! in-memory reference implementation ([`memory`]) plus, behind the `xlsx`
//! feature, a minimal real adapter ([`providers::xlsx`]). Parsing an actual
//! `.xlsx`/`.ods` file end-to-end is the CLI's job, not the core's.

pub mod directive;
pub mod error;
pub mod instance;
pub mod memory;
pub mod metadata;
pub mod parser;
pub mod reference;
pub mod sheet;
pub mod types;

#[cfg(feature = "xlsx")]
pub mod providers;

pub use error::{SdlError, SdlResult, Warning};
pub use instance::{append_row, CellValue, Instance};
pub use metadata::{FrozenMetadata, MetadataState};
pub use parser::Parser;
pub use reference::{CellRef, RangeRef};
pub use sheet::{Cell, Sheet, Workbook};
pub use types::TypeTag;
