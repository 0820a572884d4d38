//! A minimal real `.xlsx` adapter over the [`crate::sheet`] traits.
//!
//! This reads values, types, and formulas only — no styles, merges,
//! comments, drawings, or number formatting. It exists so the CLI can point
//! at a real workbook; anything richer belongs outside the core (see
//! `DESIGN.md`).
//!
//! The zip-and-XML walk below is the same shape as the source repository's
//! own worksheet/relationship parsing, trimmed to the handful of elements
//! this crate actually needs (`sheet`, `sharedStrings`, `c`/`v`/`f`/`is`/`t`).

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{SdlError, SdlResult};
use crate::reference::CellRef;
use crate::sheet::{Cell, Sheet, Workbook};

/// One parsed `.xlsx` cell. Owns its text; there is no lazy/shared storage
/// the way a production reader would use for shared strings.
#[derive(Debug, Clone)]
pub struct XlsxCell {
    row: u32,
    column: u32,
    value: String,
    type_name: &'static str,
    is_string: bool,
    is_formula: bool,
    formula: Option<String>,
}

impl XlsxCell {
    fn blank(row: u32, column: u32) -> Self {
        XlsxCell {
            row,
            column,
            value: String::new(),
            type_name: "empty",
            is_string: true,
            is_formula: false,
            formula: None,
        }
    }
}

impl Cell for XlsxCell {
    fn row(&self) -> u32 {
        self.row
    }
    fn column(&self) -> u32 {
        self.column
    }
    fn is_string(&self) -> bool {
        self.is_string
    }
    fn is_formula(&self) -> bool {
        self.is_formula
    }
    fn is_currency(&self) -> bool {
        // XLSX currency is a number-format/style concern; this reader drops
        // styles entirely (see `DESIGN.md`), so it never reports currency.
        false
    }
    fn type_name(&self) -> &str {
        self.type_name
    }
    fn value(&self) -> &str {
        &self.value
    }
    fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }
}

/// One parsed worksheet, as a dense grid. Cells the XML omitted (blank
/// cells are usually not written at all) are filled with [`XlsxCell::blank`]
/// so every position within the sheet's extent resolves.
#[derive(Debug, Clone, Default)]
pub struct XlsxSheet {
    rows: Vec<Vec<XlsxCell>>,
}

impl Sheet for XlsxSheet {
    type Cell = XlsxCell;

    fn row_count(&self) -> u32 {
        u32::try_from(self.rows.len()).unwrap_or(u32::MAX)
    }

    fn row_len(&self, row: u32) -> u32 {
        self.rows
            .get(row as usize)
            .map(|r| u32::try_from(r.len()).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    fn cell(&self, row: u32, column: u32) -> Option<&XlsxCell> {
        self.rows.get(row as usize)?.get(column as usize)
    }
}

/// A parsed `.xlsx` package. Only the sheets are kept; workbook-level
/// metadata (defined names, theme, calculation chain, ...) is not read.
#[derive(Debug, Clone, Default)]
pub struct XlsxWorkbook {
    sheets: Vec<XlsxSheet>,
}

impl Workbook for XlsxWorkbook {
    type Sheet = XlsxSheet;

    fn sheets(&self) -> &[XlsxSheet] {
        &self.sheets
    }
}

impl XlsxWorkbook {
    /// Open and parse a `.xlsx` file from disk.
    pub fn open(path: &Path) -> SdlResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a `.xlsx` package from any seekable byte source.
    pub fn from_reader<R: Read + Seek>(reader: R) -> SdlResult<Self> {
        let mut archive = zip_open(reader)?;

        let worksheet_paths = read_workbook_sheet_paths(&mut archive)?;
        let shared_strings = read_shared_strings(&mut archive)?;

        let mut sheets = Vec::with_capacity(worksheet_paths.len());
        for path in &worksheet_paths {
            sheets.push(read_worksheet(&mut archive, path, &shared_strings)?);
        }

        Ok(XlsxWorkbook { sheets })
    }
}

fn zip_open<R: Read + Seek>(reader: R) -> SdlResult<ZipArchive<R>> {
    ZipArchive::new(reader).map_err(|e| SdlError::Internal(format!("not a zip archive: {e}")))
}

/// Resolve `xl/_rels/workbook.xml.rels` + `xl/workbook.xml` into the ordered
/// list of worksheet part paths (e.g. `xl/worksheets/sheet1.xml`).
fn read_workbook_sheet_paths<R: Read + Seek>(archive: &mut ZipArchive<R>) -> SdlResult<Vec<String>> {
    let rel_targets = read_worksheet_relationships(archive)?;

    let mut xml_bytes = Vec::new();
    archive
        .by_name("xl/workbook.xml")
        .map_err(|e| SdlError::Internal(format!("xl/workbook.xml: {e}")))?
        .read_to_end(&mut xml_bytes)
        .map_err(SdlError::Io)?;

    let mut xml = Reader::from_reader(xml_bytes.as_slice());
    xml.trim_text(true);

    let mut order = Vec::new();
    let mut buf = Vec::new();
    loop {
        match xml
            .read_event_into(&mut buf)
            .map_err(|e| SdlError::Internal(format!("xl/workbook.xml: {e}")))?
        {
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sheet" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r:id" || attr.key.as_ref() == b"id" {
                        if let Ok(rid) = std::str::from_utf8(&attr.value) {
                            if let Some(path) = rel_targets.get(rid) {
                                order.push(path.clone());
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(order)
}

fn read_worksheet_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> SdlResult<HashMap<String, String>> {
    let mut map = HashMap::new();
    let Ok(mut file) = archive.by_name("xl/_rels/workbook.xml.rels") else {
        return Ok(map);
    };

    let mut xml_bytes = Vec::new();
    file.read_to_end(&mut xml_bytes).map_err(SdlError::Io)?;
    drop(file);

    let mut xml = Reader::from_reader(xml_bytes.as_slice());
    xml.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match xml
            .read_event_into(&mut buf)
            .map_err(|e| SdlError::Internal(format!("workbook.xml.rels: {e}")))?
        {
            Event::Empty(ref e) | Event::Start(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                let mut is_worksheet = false;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = std::str::from_utf8(&attr.value).ok().map(str::to_string),
                        b"Target" => {
                            target = std::str::from_utf8(&attr.value).ok().map(str::to_string)
                        }
                        b"Type" => {
                            is_worksheet = attr.value.ends_with(b"worksheet");
                        }
                        _ => {}
                    }
                }
                if is_worksheet {
                    if let (Some(id), Some(target)) = (id, target) {
                        let full = match target.strip_prefix('/') {
                            Some(stripped) => stripped.to_string(),
                            None => format!("xl/{target}"),
                        };
                        map.insert(id, full);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(map)
}

fn read_shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>) -> SdlResult<Vec<String>> {
    let Ok(mut file) = archive.by_name("xl/sharedStrings.xml") else {
        return Ok(Vec::new());
    };

    let mut xml_bytes = Vec::new();
    file.read_to_end(&mut xml_bytes).map_err(SdlError::Io)?;
    drop(file);

    let mut xml = Reader::from_reader(xml_bytes.as_slice());
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut buf = Vec::new();

    loop {
        match xml
            .read_event_into(&mut buf)
            .map_err(|e| SdlError::Internal(format!("sharedStrings.xml: {e}")))?
        {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Event::Text(ref e) if in_t => {
                if let Ok(text) = e.unescape() {
                    current.push_str(&text);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                    in_si = false;
                }
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

enum CellKind {
    SharedString,
    InlineString,
    StringResult,
    Boolean,
    Default,
}

fn cell_kind(raw: &[u8]) -> CellKind {
    match raw {
        b"s" => CellKind::SharedString,
        b"inlineStr" => CellKind::InlineString,
        b"str" => CellKind::StringResult,
        b"b" => CellKind::Boolean,
        _ => CellKind::Default,
    }
}

fn read_worksheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
    shared_strings: &[String],
) -> SdlResult<XlsxSheet> {
    let mut xml_bytes = Vec::new();
    archive
        .by_name(path)
        .map_err(|e| SdlError::Internal(format!("{path}: {e}")))?
        .read_to_end(&mut xml_bytes)
        .map_err(SdlError::Io)?;

    let mut xml = Reader::from_reader(xml_bytes.as_slice());
    xml.trim_text(false);

    let mut cells: HashMap<(u32, u32), XlsxCell> = HashMap::new();
    let mut max_row = 0u32;
    let mut max_col = 0u32;
    let mut buf = Vec::new();

    loop {
        let event = xml
            .read_event_into(&mut buf)
            .map_err(|e| SdlError::Internal(format!("{path}: {e}")))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"c" => {
                let mut r_attr = None;
                let mut kind = CellKind::Default;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"r" => r_attr = std::str::from_utf8(&attr.value).ok().map(str::to_string),
                        b"t" => kind = cell_kind(&attr.value),
                        _ => {}
                    }
                }
                let Some(r_attr) = r_attr else { continue };
                let Ok(cell_ref) = CellRef::parse(&r_attr) else {
                    continue;
                };

                let mut value_text: Option<String> = None;
                let mut formula_text: Option<String> = None;
                let mut inline_text = String::new();
                let mut in_value = false;
                let mut in_formula = false;
                let mut in_inline_t = false;

                if matches!(event, Event::Start(_)) {
                    let mut inner = Vec::new();
                    loop {
                        match xml
                            .read_event_into(&mut inner)
                            .map_err(|e| SdlError::Internal(format!("{path}: {e}")))?
                        {
                            Event::Start(ref inner_e) => match inner_e.local_name().as_ref() {
                                b"v" => in_value = true,
                                b"f" => in_formula = true,
                                b"t" => in_inline_t = true,
                                _ => {}
                            },
                            Event::Text(ref text) => {
                                if in_value {
                                    if let Ok(t) = text.unescape() {
                                        value_text = Some(t.to_string());
                                    }
                                } else if in_formula {
                                    if let Ok(t) = text.unescape() {
                                        formula_text = Some(t.to_string());
                                    }
                                } else if in_inline_t {
                                    if let Ok(t) = text.unescape() {
                                        inline_text.push_str(&t);
                                    }
                                }
                            }
                            Event::End(ref inner_e) => match inner_e.local_name().as_ref() {
                                b"v" => in_value = false,
                                b"f" => in_formula = false,
                                b"t" => in_inline_t = false,
                                b"c" => break,
                                _ => {}
                            },
                            Event::Eof => break,
                            _ => {}
                        }
                        inner.clear();
                    }
                }

                let is_formula = formula_text.is_some();
                let (value, type_name, is_string) = if is_formula {
                    (value_text.unwrap_or_default(), "formula", false)
                } else {
                    match kind {
                        CellKind::SharedString => {
                            let idx: Option<usize> =
                                value_text.as_deref().and_then(|s| s.parse().ok());
                            let text = idx
                                .and_then(|i| shared_strings.get(i))
                                .cloned()
                                .unwrap_or_default();
                            (text, "string", true)
                        }
                        CellKind::InlineString => (inline_text, "string", true),
                        CellKind::StringResult => (value_text.unwrap_or_default(), "string", true),
                        CellKind::Boolean => (value_text.unwrap_or_default(), "boolean", false),
                        CellKind::Default => (value_text.unwrap_or_default(), "number", false),
                    }
                };

                max_row = max_row.max(cell_ref.row + 1);
                max_col = max_col.max(cell_ref.column + 1);
                cells.insert(
                    (cell_ref.row, cell_ref.column),
                    XlsxCell {
                        row: cell_ref.row,
                        column: cell_ref.column,
                        value,
                        type_name,
                        is_string,
                        is_formula,
                        formula: formula_text,
                    },
                );
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut rows = Vec::with_capacity(max_row as usize);
    for row in 0..max_row {
        let mut cells_in_row = Vec::with_capacity(max_col as usize);
        for col in 0..max_col {
            let cell = cells
                .remove(&(row, col))
                .unwrap_or_else(|| XlsxCell::blank(row, col));
            cells_in_row.push(cell);
        }
        rows.push(cells_in_row);
    }

    Ok(XlsxSheet { rows })
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
    use std::io::Write;

    /// Build a minimal one-sheet `.xlsx` in memory: shared strings "Product",
    /// "Price", "Pen"; row 1 is the header, row 2 is one data row.
    fn sample_xlsx_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            let opts = zip::write::FileOptions::default();

            zip.start_file("xl/workbook.xml", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
                <workbook xmlns="x" xmlns:r="r">
                  <sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
                </workbook>"#,
            )
            .unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
                <Relationships xmlns="r">
                  <Relationship Id="rId1" Type="http://.../worksheet" Target="worksheets/sheet1.xml"/>
                </Relationships>"#,
            )
            .unwrap();

            zip.start_file("xl/sharedStrings.xml", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
                <sst xmlns="x"><si><t>Product</t></si><si><t>Price</t></si><si><t>Pen</t></si></sst>"#,
            )
            .unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", opts).unwrap();
            zip.write_all(
                br#"<?xml version="1.0"?>
                <worksheet xmlns="x">
                  <sheetData>
                    <row r="1">
                      <c r="A1" t="s"><v>0</v></c>
                      <c r="B1" t="s"><v>1</v></c>
                    </row>
                    <row r="2">
                      <c r="A2" t="s"><v>2</v></c>
                      <c r="B2"><v>1.2</v></c>
                    </row>
                  </sheetData>
                </worksheet>"#,
            )
            .unwrap();

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn reads_header_and_data_rows() {
        let bytes = sample_xlsx_bytes();
        let wb = XlsxWorkbook::from_reader(std::io::Cursor::new(bytes)).unwrap();
        let sheet = wb.first_sheet().unwrap();

        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.cell(0, 0).unwrap().value(), "Product");
        assert_eq!(sheet.cell(0, 1).unwrap().value(), "Price");
        assert_eq!(sheet.cell(1, 0).unwrap().value(), "Pen");
        assert_eq!(sheet.cell(1, 1).unwrap().value(), "1.2");
    }

    #[test]
    fn missing_file_is_an_error() {
        let bytes = b"not a zip".to_vec();
        assert!(XlsxWorkbook::from_reader(std::io::Cursor::new(bytes)).is_err());
    }
}
