//! Concrete spreadsheet-format adapters, each behind its own Cargo feature.
//!
//! Only `xlsx` exists today; an `ods` adapter would live alongside it the
//! same way, implementing the same [`crate::sheet`] traits.

#[cfg(feature = "xlsx")]
pub mod xlsx;
