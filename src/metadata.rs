//! Metadata state: the declared named types, header range, and data range.
//!
//! [`MetadataState`] is a builder populated by the SDL parser. A successful
//! call to [`MetadataState::validate`] freezes it into a [`FrozenMetadata`],
//! which can be shared read-only across multiple [`crate::instance::Instance`]s.

use std::collections::BTreeMap;

use crate::error::{SdlError, SdlResult};
use crate::reference::RangeRef;
use crate::types::TypeTag;

/// Mutable builder accumulating declared types and the header/data ranges.
#[derive(Debug, Default)]
pub struct MetadataState {
    keys: BTreeMap<String, TypeTag>,
    header: Option<RangeRef>,
    data: Option<RangeRef>,
}

impl MetadataState {
    /// Construct an empty metadata state.
    pub fn new() -> Self {
        MetadataState::default()
    }

    /// `declare-type name type`: introduce a new declared name.
    ///
    /// Fails with [`SdlError::BadString`] if `name` is empty, or with
    /// [`SdlError::DuplicateKey`] if `name` was already declared.
    pub fn declare_type(&mut self, name: String, ty: TypeTag) -> SdlResult<()> {
        if name.is_empty() {
            return Err(SdlError::BadString(
                "declare-type name must not be empty".to_string(),
            ));
        }
        if let Some(existing) = self.keys.get(&name).copied() {
            return Err(SdlError::DuplicateKey { name, existing });
        }
        tracing::debug!(name = %name, ty = %ty, "declare-type");
        self.keys.insert(name, ty);
        Ok(())
    }

    /// `declare-header range`: single assignment of the header range.
    ///
    /// Fails with [`SdlError::HeaderNotOneDim`] if `range` is 2D, or with
    /// [`SdlError::AlreadyDeclared`] if called a second time.
    pub fn declare_header(&mut self, range: RangeRef) -> SdlResult<()> {
        if !range.is_one_dimensional() {
            return Err(SdlError::HeaderNotOneDim(range));
        }
        if self.header.is_some() {
            return Err(SdlError::AlreadyDeclared("header"));
        }
        tracing::debug!(range = %range, "declare-header");
        self.header = Some(range);
        Ok(())
    }

    /// `declare-data range`: single assignment of the data range.
    ///
    /// Fails with [`SdlError::AlreadyDeclared`] if called a second time.
    pub fn declare_data(&mut self, range: RangeRef) -> SdlResult<()> {
        if self.data.is_some() {
            return Err(SdlError::AlreadyDeclared("data"));
        }
        tracing::debug!(range = %range, "declare-data");
        self.data = Some(range);
        Ok(())
    }

    /// Check presence of header/data and the shape-compatibility invariant,
    /// then freeze this state for use by [`crate::instance::Instance`].
    pub fn validate(self) -> SdlResult<FrozenMetadata> {
        let header = self.header.ok_or(SdlError::MissingHeader)?;
        let data = self.data.ok_or(SdlError::MissingData)?;

        let shape_ok = if header.height == 1 {
            data.width == header.width
        } else {
            data.height == header.height
        };
        if !shape_ok {
            return Err(SdlError::ShapeMismatch { header, data });
        }

        Ok(FrozenMetadata {
            keys: self.keys,
            header,
            data,
        })
    }
}

/// An immutable, validated view of a [`MetadataState`].
///
/// Safe to share across multiple [`crate::instance::Instance`]s bound to
/// different sheets.
#[derive(Debug, Clone)]
pub struct FrozenMetadata {
    pub(crate) keys: BTreeMap<String, TypeTag>,
    pub(crate) header: RangeRef,
    pub(crate) data: RangeRef,
}

impl FrozenMetadata {
    /// The declared names and their types.
    pub fn keys(&self) -> &BTreeMap<String, TypeTag> {
        &self.keys
    }

    /// The declared header range.
    pub fn header(&self) -> &RangeRef {
        &self.header
    }

    /// The declared data range.
    pub fn data(&self) -> &RangeRef {
        &self.data
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

    fn range(spec: &str) -> RangeRef {
        RangeRef::parse(spec).unwrap()
    }

    #[test]
    fn rejects_empty_declare_type_name() {
        let mut m = MetadataState::new();
        let err = m.declare_type(String::new(), TypeTag::String).unwrap_err();
        assert!(matches!(err, SdlError::BadString(_)));
    }

    #[test]
    fn rejects_duplicate_declare_type() {
        let mut m = MetadataState::new();
        m.declare_type("Price".into(), TypeTag::GbpExVat).unwrap();
        let err = m
            .declare_type("Price".into(), TypeTag::GbpExVat)
            .unwrap_err();
        assert!(matches!(err, SdlError::DuplicateKey { .. }));
    }

    #[test]
    fn rejects_2d_header() {
        let mut m = MetadataState::new();
        let err = m.declare_header(range("A1:B2")).unwrap_err();
        assert!(matches!(err, SdlError::HeaderNotOneDim(_)));
    }

    #[test]
    fn rejects_second_header_declaration() {
        let mut m = MetadataState::new();
        m.declare_header(range("A1:B1")).unwrap();
        let err = m.declare_header(range("A2:B2")).unwrap_err();
        assert!(matches!(err, SdlError::AlreadyDeclared("header")));
    }

    #[test]
    fn validates_row_header_shape() {
        let mut m = MetadataState::new();
        m.declare_header(range("A1:B1")).unwrap();
        m.declare_data(range("A2:B3")).unwrap();
        assert!(m.validate().is_ok());
    }

    #[test]
    fn rejects_shape_mismatch() {
        let mut m = MetadataState::new();
        m.declare_header(range("A1:C1")).unwrap();
        m.declare_data(range("A2:B4")).unwrap();
        let err = m.validate().unwrap_err();
        assert!(matches!(err, SdlError::ShapeMismatch { .. }));
    }

    #[test]
    fn validates_column_header_shape() {
        let mut m = MetadataState::new();
        m.declare_header(range("A1:A2")).unwrap();
        m.declare_data(range("B1:D2")).unwrap();
        assert!(m.validate().is_ok());
    }
}
