//! Built-in cell-value type registry.
//!
//! The four types are disjoint singletons, expressed as a closed enum
//! rather than a class hierarchy (see `DESIGN.md`). Adding a new built-in
//! is a single match-arm edit in [`TypeTag::lookup`].

use crate::error::SdlError;

/// One of the built-in cell-value types a `declare-type` line can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Free-form text.
    String,
    /// Sterling currency, excluding VAT.
    GbpExVat,
    /// A numeric value.
    Number,
    /// A spreadsheet formula (the raw formula text, not its evaluated
    /// result — formula evaluation is out of scope).
    Formula,
}

impl TypeTag {
    /// Look up a type by the name used in SDL source (`String`, `GBPxVAT`,
    /// `Number`, `Formula`).
    pub fn lookup(name: &str) -> Result<Self, SdlError> {
        match name {
            "String" => Ok(TypeTag::String),
            "GBPxVAT" => Ok(TypeTag::GbpExVat),
            "Number" => Ok(TypeTag::Number),
            "Formula" => Ok(TypeTag::Formula),
            other => Err(SdlError::UnknownType(other.to_string())),
        }
    }

    /// The canonical SDL name for this type, the inverse of [`TypeTag::lookup`].
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::String => "String",
            TypeTag::GbpExVat => "GBPxVAT",
            TypeTag::Number => "Number",
            TypeTag::Formula => "Formula",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
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

    #[test_case::test_case("String", TypeTag::String)]
    #[test_case::test_case("GBPxVAT", TypeTag::GbpExVat)]
    #[test_case::test_case("Number", TypeTag::Number)]
    #[test_case::test_case("Formula", TypeTag::Formula)]
    fn looks_up_known_types(name: &str, expected: TypeTag) {
        assert_eq!(TypeTag::lookup(name).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(matches!(
            TypeTag::lookup("Currency"),
            Err(SdlError::UnknownType(_))
        ));
    }

    #[test]
    fn name_round_trips_through_lookup() {
        for t in [
            TypeTag::String,
            TypeTag::GbpExVat,
            TypeTag::Number,
            TypeTag::Formula,
        ] {
            assert_eq!(TypeTag::lookup(t.name()).unwrap(), t);
        }
    }
}
