//! Shared test helpers for the integration suite.
//!
//! The in-memory sheet builder itself lives in `sheet_sdl::memory` (it is
//! also used from unit tests inside the crate); this module just re-exports
//! it under a conventional `tests/common` path, the way the teacher keeps a
//! `tests/common/mod.rs` alongside its own `tests/fixtures/mod.rs`.
#![allow(dead_code)]

pub use sheet_sdl::memory::{MemoryCell, MemoryWorkbook, SheetBuilder};
