use crate::error::ExpTableError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use tracing::debug;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

/// An Excel XLSX workbook opened for reading.
///
/// The archive handle is owned by the workbook and released when it is dropped,
/// so every early return from a reading operation closes the file.
pub struct XlsxWorkbook<RS: Read + Seek = BufReader<File>> {
    /// File name of the workbook
    name: String,
    /// ZIP archive containing the XLSX file contents
    zip: ZipArchive<RS>,
    /// Parsed number formats for cell type detection
    number_formats: Vec<CellType>,
    /// List of worksheets with (name, zip_path) pairs
    sheets: Vec<(String, String)>,
    /// Shared string table, loaded on first sheet read
    shared_strings: Option<Vec<String>>,
}

impl XlsxWorkbook<BufReader<File>> {
    /// Opens an XLSX workbook file and parses its structure
    pub fn open(file_name: &str) -> Result<Self, ExpTableError> {
        let file = File::open(file_name)?;
        Self::from_reader(file_name, BufReader::new(file))
    }
}

impl<RS: Read + Seek> XlsxWorkbook<RS> {
    /// Parses the workbook structure from any seekable source
    ///
    /// # Arguments
    /// * `file_name` - Name used in messages
    /// * `reader` - Source of the XLSX archive bytes
    pub fn from_reader(file_name: &str, reader: RS) -> Result<Self, ExpTableError> {
        let mut zip = ZipArchive::new(reader)?;
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
        }
        let number_formats = load_number_formats(&mut zip, is_1904)?;
        debug!(file = file_name, sheets = sheets.len(), "opened workbook");
        Ok(XlsxWorkbook {
            name: file_name.to_owned(),
            zip,
            number_formats,
            sheets,
            shared_strings: None,
        })
    }

    /// Returns the file name of this workbook
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the worksheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Reads one worksheet into memory
    ///
    /// Fails with [`SpreadsheetError::SheetNotFoundError`] listing the available
    /// sheets when `sheet_name` is not part of the workbook.
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, ExpTableError> {
        let zip_path = self.sheets.iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, path)| path.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(
                sheet_name.to_owned(),
                self.sheet_names().join(", "),
            ))?;
        if self.shared_strings.is_none() {
            self.shared_strings = Some(load_shared_strings(&mut self.zip)?);
        }
        let shared_strings = self.shared_strings.as_deref().unwrap_or_default();

        let mut sheet = Sheet::new(&self.name, sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                row_count = event.get_attribute_value("r")?
                    .and_then(|reference| row_to_index(&reference))
                    .unwrap_or(row_count);
                col_count = 0;
                sheet.mark_row(row_count);
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                value.clear();
                kind = event.get_attribute_value("t")?.map(|t| {
                    match t.as_ref() {
                        "inlineStr" | "str" => CellType::InlineString,
                        "s" => CellType::SharedString,
                        "d" => CellType::IsoDateTime,
                        "b" => CellType::Boolean,
                        "e" => CellType::Error,
                        _ => CellType::Number,
                    }
                }).unwrap_or(CellType::Number);
                if let Some(format_id) = event.get_attribute_value("s")? {
                    if kind == CellType::Number && !format_id.is_empty() {
                        let index = format_id.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                // Error cells are read as empty
                if kind != CellType::Empty && kind != CellType::Error && !value.is_empty() {
                    if kind == CellType::SharedString {
                        let index = value.parse::<usize>()?;
                        value = shared_strings.get(index)
                            .cloned()
                            .ok_or_else(|| SpreadsheetError::CellValueError(
                                self.name.to_owned(),
                                sheet_name.to_owned(),
                                index_to_reference(row, col),
                                value.to_owned(),
                            ))?;
                        kind = CellType::InlineString;
                    }
                    sheet.push(Cell {
                        row,
                        col,
                        kind,
                        value: value.to_owned(),
                    });
                }
                kind = CellType::Empty;
                value.clear();
            }
        });
        debug!(sheet = sheet_name, max_row = sheet.max_row(), "read worksheet");
        Ok(sheet)
    }
}

/// Loads the shared string table of the workbook; absent tables yield an empty list
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, ExpTableError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
            shared_strings.push(string);
        }
    });
    Ok(shared_strings)
}

/// Loads workbook structure and worksheet information from XLSX file
///
/// Parses the workbook.xml file to extract worksheet names and their corresponding
/// XML file paths, and determines the date system (1900 vs 1904) used in the file.
///
/// # Returns
/// Tuple of (worksheets, is_1904_date_system) where worksheets are (name, zip_path) pairs
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<(Vec<(String, String)>, bool), ExpTableError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads number formats and cell styles from XLSX styles.xml file
///
/// Parses custom number formats and cell style indexes to determine
/// how numeric values should be interpreted (dates, times or plain numbers).
fn load_number_formats<RS: Read + Seek>(zip: &mut ZipArchive<RS>, is_1904: bool) -> Result<Vec<CellType>, ExpTableError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut has_custom_formats = false;
    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut has_format_indexes = false;
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if !custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            has_custom_formats = true;
            custom_formats_context = true;
        }
        Event::End(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            custom_formats_context = false;
            if has_custom_formats && has_format_indexes {
                break;
            }
        }
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                let style = CellType::parse_custom_number_format(&format, is_1904);
                custom_formats.insert(id.to_string(), style);
            }
        }

        Event::Start(event) if !format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            has_format_indexes = true;
            format_indexes_context = true;
        }
        Event::End(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            format_indexes_context = false;
            if has_custom_formats && has_format_indexes {
                break;
            }
        }
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            if let Some(id) = event.get_attribute_value("numFmtId")? {
                format_indexes.push(id.to_string());
            }
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Extracts string content from XML elements, skipping phonetic text annotations
/// and properly handling both text nodes and CDATA sections.
///
/// # Arguments
/// * `reader` - XML reader positioned at the start of the string content
/// * `end_tag` - XML tag that marks the end of the string content
/// * `is_text_content` - Whether to treat the content as text by default
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, ExpTableError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Builds a minimal XLSX archive with one sheet per `(name, sheet_xml)` pair.
    pub(crate) fn build_xlsx(sheets: &[(&str, &str)], shared_strings: &[&str]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let mut workbook = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
        let mut rels = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships>"#);
        for (index, (name, xml)) in sheets.iter().enumerate() {
            let id = index + 1;
            workbook.push_str(&format!(r#"<sheet name="{name}" sheetId="{id}" r:id="rId{id}"/>"#));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{id}.xml"/>"#
            ));
            zip.start_file(format!("xl/worksheets/sheet{id}.xml"), options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();

        let mut strings = String::from("<sst>");
        for string in shared_strings {
            strings.push_str(&format!("<si><t>{string}</t></si>"));
        }
        strings.push_str("</sst>");
        zip.start_file("xl/sharedStrings.xml", options).unwrap();
        zip.write_all(strings.as_bytes()).unwrap();

        zip.start_file("xl/styles.xml", options).unwrap();
        zip.write_all(br#"<styleSheet><numFmts><numFmt numFmtId="164" formatCode="dd/mm/yyyy"/></numFmts><cellXfs><xf numFmtId="0"/><xf numFmtId="164"/></cellXfs></styleSheet>"#).unwrap();

        zip.finish().unwrap().into_inner()
    }

    const SHEET: &str = r#"<worksheet><sheetData>
        <row r="3"><c r="A3" t="s"><v>0</v></c><c r="D3" t="s"><v>1</v></c></row>
        <row r="4"><c r="D4" t="inlineStr"><is><t>Contratante</t></is></c></row>
        <row r="5"><c r="A5"><v>1</v></c><c r="B5" s="1"><v>45352</v></c><c r="C5" t="e"><v>#N/A</v></c><c r="D5" t="s"><v>2</v></c></row>
        <row r="7"/>
    </sheetData></worksheet>"#;

    fn open() -> XlsxWorkbook<Cursor<Vec<u8>>> {
        let bytes = build_xlsx(&[("ESP", SHEET), ("ENG", "<worksheet/>")], &["No.", "Entidad", "Gobierno de Chile"]);
        XlsxWorkbook::from_reader("test.xlsx", Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn workbook_lists_sheets_in_order() {
        let workbook = open();
        assert_eq!(workbook.name(), "test.xlsx");
        assert_eq!(workbook.sheet_names(), vec!["ESP".to_owned(), "ENG".to_owned()]);
    }

    #[test]
    fn read_sheet_resolves_values() {
        let mut workbook = open();
        let sheet = workbook.read_sheet("ESP").unwrap();

        assert_eq!(sheet.value(3, 0).as_deref(), Some("No."));
        assert_eq!(sheet.value(3, 3).as_deref(), Some("Entidad"));
        assert_eq!(sheet.value(4, 3).as_deref(), Some("Contratante"));
        assert_eq!(sheet.value(5, 0).as_deref(), Some("1"));
        assert_eq!(sheet.value(5, 1).as_deref(), Some("2024-03-01"));
        assert_eq!(sheet.value(5, 2), None);
        assert_eq!(sheet.value(5, 3).as_deref(), Some("Gobierno de Chile"));
        assert_eq!(sheet.max_row(), 7);
    }

    #[test]
    fn missing_sheet_lists_available_sheets() {
        let mut workbook = open();
        let error = workbook.read_sheet("Hoja1").err().unwrap();
        assert_eq!(error.to_string(), "Sheet 'Hoja1' not found. Available: ESP, ENG");
    }

    #[test]
    fn not_a_zip_archive_fails() {
        let result = XlsxWorkbook::from_reader("broken.xlsx", Cursor::new(b"plain text".to_vec()));
        assert!(result.is_err());
    }
}
