//! The SDL parser: tokenises tab-separated directive lines and dispatches
//! each to its handler via the [`crate::directive`] table.
//!
//! Grammar (see spec §6.1):
//!
//! ```text
//! line      := directive ("\t" arg)*
//! directive := ident
//! arg       := any-bytes-except-tab-or-newline
//! ```
//!
//! Leading/trailing whitespace on fields is significant — only tabs
//! delimit. A line that is empty before splitting is skipped.
#![allow(clippy::indexing_slicing)] // Safe: str::split always yields at least one field.

use std::io::BufRead;

use crate::directive::{lookup_directive, unescape, DirectiveKind};
use crate::error::{SdlError, SdlResult};
use crate::metadata::MetadataState;

/// Parses SDL source, one line at a time, into a [`MetadataState`].
///
/// `parse` consumes the parser's source and may be called at most once;
/// a second call fails with [`SdlError::AlreadyParsed`].
pub struct Parser<R> {
    source: R,
    parsed: bool,
}

impl<R: BufRead> Parser<R> {
    /// Build a parser over any line-oriented byte source. The caller owns
    /// the source's lifetime.
    pub fn new(source: R) -> Self {
        Parser {
            source,
            parsed: false,
        }
    }

    /// Parse the whole source and return the resulting (unvalidated)
    /// metadata state. Call [`MetadataState::validate`] on the result to
    /// freeze it.
    pub fn parse(&mut self) -> SdlResult<MetadataState> {
        if self.parsed {
            return Err(SdlError::AlreadyParsed);
        }
        self.parsed = true;

        let mut state = MetadataState::new();
        let mut line_no = 0usize;
        let mut buf = String::new();

        loop {
            buf.clear();
            let n = self.source.read_line(&mut buf)?;
            if n == 0 {
                break;
            }
            line_no += 1;

            let line = buf.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }

            self.dispatch(&mut state, line, line_no)
                .map_err(|e| e.at_line(line_no, line))?;
        }

        Ok(state)
    }

    fn dispatch(&self, state: &mut MetadataState, line: &str, line_no: usize) -> SdlResult<()> {
        let fields: Vec<&str> = line.split('\t').collect();
        let directive_name = unescape(fields[0]);

        let directive = lookup_directive(&directive_name).ok_or_else(|| {
            SdlError::UnknownDirective {
                line_no,
                directive: directive_name.clone(),
            }
        })?;

        // First pass: transport-decode every raw argument.
        let decoded: Vec<String> = fields[1..].iter().map(|raw| unescape(raw)).collect();

        // Second pass: directive-specific semantic deserialisers.
        let mut args = directive.args.deserialise(&decoded)?.into_iter();
        let missing = || SdlError::BadString(format!("`{directive_name}` is missing an argument"));

        match directive.kind {
            DirectiveKind::DeclareType => {
                let name = args.next().ok_or_else(missing)?.into_str()?;
                let ty = args.next().ok_or_else(missing)?.into_type()?;
                state.declare_type(name, ty)?;
            }
            DirectiveKind::DeclareHeader => {
                let range = args.next().ok_or_else(missing)?.into_range()?;
                state.declare_header(range)?;
            }
            DirectiveKind::DeclareData => {
                let range = args.next().ok_or_else(missing)?.into_range()?;
                state.declare_data(range)?;
            }
            DirectiveKind::Comment => {}
        }

        Ok(())
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
    use crate::types::TypeTag;
    use std::io::Cursor;

    fn parser(src: &str) -> Parser<Cursor<&[u8]>> {
        Parser::new(Cursor::new(src.as_bytes()))
    }

    #[test]
    fn parses_basic_metadata() {
        let src = "# a comment\ndeclare-type\t\"Product\"\tString\ndeclare-type\t\"Price\"\tGBPxVAT\ndeclare-header\tA3:D3\ndeclare-data\tA4:D8\n";
        let mut p = parser(src);
        let state = p.parse().unwrap();
        let frozen = state.validate().unwrap();
        assert_eq!(frozen.keys().len(), 2);
        assert_eq!(frozen.keys()["Product"], TypeTag::String);
        assert_eq!(frozen.keys()["Price"], TypeTag::GbpExVat);
    }

    #[test]
    fn skips_blank_lines() {
        let src = "declare-type\t\"A\"\tString\n\n\ndeclare-header\tA1:A1\n";
        let mut p = parser(src);
        let state = p.parse().unwrap();
        assert!(state.validate().is_err()); // no data range yet, but no crash on blanks
    }

    #[test]
    fn unknown_directive_is_fatal_and_annotated() {
        let mut p = parser("frobnicate\tfoo\n");
        let err = p.parse().unwrap_err();
        match err {
            SdlError::AtLine { line_no, line, source } => {
                assert_eq!(line_no, 1);
                assert_eq!(line, "frobnicate\tfoo");
                assert!(matches!(*source, SdlError::UnknownDirective { .. }));
            }
            other => panic!("expected AtLine, got {other:?}"),
        }
    }

    #[test]
    fn second_declaration_of_same_key_fails_with_line_number() {
        let mut p = parser(
            "declare-type\t\"Price\"\tGBPxVAT\ndeclare-type\t\"Price\"\tGBPxVAT\n",
        );
        let err = p.parse().unwrap_err();
        match err {
            SdlError::AtLine { line_no, source, .. } => {
                assert_eq!(line_no, 2);
                assert!(matches!(*source, SdlError::DuplicateKey { .. }));
            }
            other => panic!("expected AtLine, got {other:?}"),
        }
    }

    #[test]
    fn parse_is_single_use() {
        let mut p = parser("declare-header\tA1:A1\n");
        p.parse().unwrap();
        assert!(matches!(p.parse(), Err(SdlError::AlreadyParsed)));
    }
}
