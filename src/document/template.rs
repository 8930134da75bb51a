//! Template reader: title, page setup and first-table columns of a .docx file.

use crate::document::Alignment;
use crate::document::DocumentError;
use crate::document::PageSetup;
use crate::document::TemplateColumn;
use crate::document::TemplateInfo;
use crate::document::DEFAULT_COLUMN_WIDTH;
use crate::error::ExpTableError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

// WordprocessingML local names
const TAG_PARAGRAPH: &[u8] = b"p";
const TAG_PARAGRAPH_PROPERTIES: &[u8] = b"pPr";
const TAG_JUSTIFICATION: &[u8] = b"jc";
const TAG_RUN: &[u8] = b"r";
const TAG_RUN_PROPERTIES: &[u8] = b"rPr";
const TAG_BOLD: &[u8] = b"b";
const TAG_TEXT: &[u8] = b"t";
const TAG_TAB: &[u8] = b"tab";
const TAG_BREAK: &[u8] = b"br";
const TAG_TABLE: &[u8] = b"tbl";
const TAG_GRID_COLUMN: &[u8] = b"gridCol";
const TAG_TABLE_ROW: &[u8] = b"tr";
const TAG_TABLE_CELL: &[u8] = b"tc";
const TAG_SECTION: &[u8] = b"sectPr";
const TAG_PAGE_SIZE: &[u8] = b"pgSz";
const TAG_PAGE_MARGIN: &[u8] = b"pgMar";

/// Reads the template at `file_name`.
///
/// Fails with [`DocumentError::MissingTable`] when the document has no table.
pub fn read_template(file_name: &str) -> Result<TemplateInfo, ExpTableError> {
    let file = File::open(file_name)?;
    let template = read_template_from(BufReader::new(file))?;
    debug!(file = file_name, columns = template.columns.len(), "read template");
    Ok(template)
}

/// Reads a template from any seekable source of .docx bytes.
pub fn read_template_from<RS: Read + Seek>(reader: RS) -> Result<TemplateInfo, ExpTableError> {
    let mut zip = ZipArchive::new(reader)?;
    let mut xml = zip.xml_reader(DOCUMENT_PART)?
        .ok_or_else(|| DocumentError::FileError(DOCUMENT_PART.to_owned()))?;
    let mut parser = TemplateParser::default();
    match_xml_events!(xml => {
        Event::Start(event) => parser.start(&event)?,
        Event::End(event) => parser.end(event.local_name().as_ref()),
        Event::Text(event) => parser.text(&event.xml_content()?),
        Event::GeneralRef(event) => {
            let mut text = String::new();
            text.push_bytes_ref(&event)?;
            parser.text(&text);
        }
    });
    parser.finish()
}

/// Cell of the first table as read from the document.
#[derive(Default)]
struct TableCell {
    paragraphs: Vec<String>,
    /// Alignment of the first paragraph, if set
    alignment: Option<Alignment>,
    /// Whether a run of the first paragraph is bold
    bold: bool,
}

/// Streaming state over `word/document.xml`.
#[derive(Default)]
struct TemplateParser {
    /// Number of open tables
    table_depth: usize,
    in_first_table: bool,
    first_table_done: bool,
    grid: Vec<u32>,
    rows: Vec<Vec<TableCell>>,
    cell: Option<TableCell>,
    /// Open paragraphs; text boxes nest paragraphs inside paragraphs
    paragraph_depth: usize,
    paragraph: String,
    in_paragraph_properties: bool,
    in_run: bool,
    in_run_properties: bool,
    in_text: bool,
    title: Option<String>,
    in_section: bool,
    page: Option<PageSetup>,
}

impl TemplateParser {
    /// Body paragraphs and paragraphs directly inside a cell of the first table are read.
    fn collecting(&self) -> bool {
        self.paragraph_depth == 1
            && (self.table_depth == 0 || (self.in_first_table && self.table_depth == 1 && self.cell.is_some()))
    }

    /// Whether the open paragraph is the first one of a first-table cell.
    fn in_first_cell_paragraph(&self) -> bool {
        self.collecting()
            && self.table_depth == 1
            && self.cell.as_ref().map(|cell| cell.paragraphs.is_empty()).unwrap_or(false)
    }

    fn start(&mut self, event: &BytesStart) -> Result<(), ExpTableError> {
        match event.local_name().as_ref() {
            TAG_TABLE => {
                self.table_depth += 1;
                if self.table_depth == 1 && !self.in_first_table && !self.first_table_done {
                    self.in_first_table = true;
                }
            }
            TAG_GRID_COLUMN if self.in_first_table && self.table_depth == 1 => {
                self.grid.push(event.parse_local_attribute_value("w")?.unwrap_or(DEFAULT_COLUMN_WIDTH));
            }
            TAG_TABLE_ROW if self.in_first_table && self.table_depth == 1 => self.rows.push(Vec::new()),
            TAG_TABLE_CELL if self.in_first_table && self.table_depth == 1 => self.cell = Some(TableCell::default()),
            TAG_PARAGRAPH => {
                self.paragraph_depth += 1;
                if self.paragraph_depth == 1 {
                    self.paragraph.clear();
                }
            }
            TAG_PARAGRAPH_PROPERTIES => self.in_paragraph_properties = true,
            TAG_JUSTIFICATION if self.in_paragraph_properties && self.in_first_cell_paragraph() => {
                let alignment = event.get_local_attribute_value("val")?.map(|value| Alignment::from_jc(&value));
                if let Some(cell) = self.cell.as_mut() {
                    cell.alignment = alignment;
                }
            }
            TAG_RUN => self.in_run = true,
            TAG_RUN_PROPERTIES if self.in_run => self.in_run_properties = true,
            TAG_BOLD if self.in_run_properties && self.in_first_cell_paragraph() => {
                let bold = event.get_local_attribute_value("val")?
                    .map(|value| !matches!(value.as_ref(), "0" | "false" | "off"))
                    .unwrap_or(true);
                if let Some(cell) = self.cell.as_mut() {
                    cell.bold |= bold;
                }
            }
            TAG_TEXT if self.in_run => self.in_text = true,
            TAG_TAB if self.in_run && self.collecting() => self.paragraph.push('\t'),
            TAG_BREAK if self.in_run && self.collecting() => self.paragraph.push('\n'),
            TAG_SECTION if self.page.is_none() => {
                self.in_section = true;
                self.page = Some(PageSetup::default());
            }
            TAG_PAGE_SIZE if self.in_section => {
                if let Some(page) = self.page.as_mut() {
                    page.width = twips(event, "w")?.unwrap_or(page.width);
                    page.height = twips(event, "h")?.unwrap_or(page.height);
                    page.landscape = event.get_local_attribute_value("orient")?
                        .map(|orient| orient == "landscape")
                        .unwrap_or(false);
                }
            }
            TAG_PAGE_MARGIN if self.in_section => {
                if let Some(page) = self.page.as_mut() {
                    page.left_margin = twips(event, "left")?.unwrap_or(page.left_margin);
                    page.right_margin = twips(event, "right")?.unwrap_or(page.right_margin);
                    page.top_margin = twips(event, "top")?.unwrap_or(page.top_margin);
                    page.bottom_margin = twips(event, "bottom")?.unwrap_or(page.bottom_margin);
                }
            }
            _ => (),
        }
        Ok(())
    }

    fn end(&mut self, local_name: &[u8]) {
        match local_name {
            TAG_TABLE => {
                if self.table_depth == 1 && self.in_first_table {
                    self.in_first_table = false;
                    self.first_table_done = true;
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            TAG_TABLE_CELL if self.in_first_table && self.table_depth == 1 => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.rows.last_mut()) {
                    row.push(cell);
                }
            }
            TAG_PARAGRAPH => {
                if self.collecting() {
                    let text = std::mem::take(&mut self.paragraph);
                    if self.table_depth == 0 {
                        if self.title.is_none() && !text.trim().is_empty() {
                            self.title = Some(text.trim().to_owned());
                        }
                    } else if let Some(cell) = self.cell.as_mut() {
                        cell.paragraphs.push(text);
                    }
                }
                self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
            }
            TAG_PARAGRAPH_PROPERTIES => self.in_paragraph_properties = false,
            TAG_RUN => self.in_run = false,
            TAG_RUN_PROPERTIES => self.in_run_properties = false,
            TAG_TEXT => self.in_text = false,
            TAG_SECTION => self.in_section = false,
            _ => (),
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text && self.collecting() {
            self.paragraph.push_str(text);
        }
    }

    fn finish(self) -> Result<TemplateInfo, ExpTableError> {
        if !self.first_table_done && !self.in_first_table {
            Err(DocumentError::MissingTable)?
        }
        let mut rows = self.rows.into_iter();
        let header_row = rows.next().unwrap_or_default();
        let sample_row = rows.next().unwrap_or_default();
        let columns = header_row.iter()
            .enumerate()
            .map(|(index, cell)| {
                let sample = sample_row.get(index);
                TemplateColumn {
                    header: cell.paragraphs.join("\n").trim().to_owned(),
                    width: self.grid.get(index).copied().unwrap_or(DEFAULT_COLUMN_WIDTH),
                    bold: sample.map(|cell| cell.bold).unwrap_or(false),
                    alignment: sample.and_then(|cell| cell.alignment).unwrap_or_default(),
                }
            })
            .collect();
        Ok(TemplateInfo {
            title: self.title.unwrap_or_default(),
            page: self.page.unwrap_or_default(),
            columns,
        })
    }
}

/// Reads a measurement attribute; negative margins are clamped to zero.
fn twips(event: &BytesStart, local_name: &str) -> Result<Option<u32>, ExpTableError> {
    let value = event.parse_local_attribute_value::<i64>(local_name)?;
    Ok(value.map(|value| value.clamp(0, u32::MAX as i64) as u32))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Wraps a `w:body` fragment into a minimal .docx archive.
    pub(crate) fn build_docx(body: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        zip.start_file(DOCUMENT_PART, SimpleFileOptions::default()).unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    const BODY: &str = r#"
        <w:p/>
        <w:p><w:r><w:t xml:space="preserve">Convenios </w:t></w:r><w:r><w:t>vigentes</w:t></w:r></w:p>
        <w:p><w:r><w:t>Second paragraph</w:t></w:r></w:p>
        <w:tbl>
            <w:tblPr><w:jc w:val="right"/></w:tblPr>
            <w:tblGrid><w:gridCol w:w="800"/><w:gridCol w:w="2400"/></w:tblGrid>
            <w:tr>
                <w:tc><w:p><w:r><w:t>No.</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:r><w:t>Pa&#237;s</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:r><w:t>Fecha</w:t></w:r></w:p><w:p><w:r><w:t>Desde</w:t></w:r></w:p></w:tc>
            </w:tr>
            <w:tr>
                <w:tc><w:p><w:pPr><w:jc w:val="left"/><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>1</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Chile</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>mar-24</w:t></w:r></w:p></w:tc>
            </w:tr>
        </w:tbl>
        <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Ignored</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
        <w:sectPr>
            <w:pgSz w:w="16838" w:h="11906" w:orient="landscape"/>
            <w:pgMar w:top="720" w:right="1000" w:bottom="-720" w:left="1100"/>
        </w:sectPr>"#;

    #[test]
    fn template_columns_are_read() {
        let template = read_template_from(Cursor::new(build_docx(BODY))).unwrap();

        assert_eq!(template.title, "Convenios vigentes");
        let headers: Vec<&str> = template.columns.iter().map(|column| column.header.as_str()).collect();
        assert_eq!(headers, vec!["No.", "País", "Fecha\nDesde"]);

        assert_eq!(template.columns[0].width, 800);
        assert_eq!(template.columns[1].width, 2400);
        assert_eq!(template.columns[2].width, DEFAULT_COLUMN_WIDTH);

        // paragraph-mark formatting is not run formatting
        assert!(!template.columns[0].bold);
        assert!(template.columns[1].bold);
        assert!(!template.columns[2].bold);

        assert_eq!(template.columns[0].alignment, Alignment::Left);
        assert_eq!(template.columns[1].alignment, Alignment::Center);
        assert_eq!(template.columns[2].alignment, Alignment::Justify);
    }

    #[test]
    fn template_page_setup_is_read() {
        let template = read_template_from(Cursor::new(build_docx(BODY))).unwrap();
        assert_eq!(template.page, PageSetup {
            width: 16838,
            height: 11906,
            landscape: true,
            left_margin: 1100,
            right_margin: 1000,
            top_margin: 720,
            bottom_margin: 0,
        });
    }

    #[test]
    fn template_without_table_fails() {
        let body = r#"<w:p><w:r><w:t>Only text</w:t></w:r></w:p>"#;
        let error = read_template_from(Cursor::new(build_docx(body))).err().unwrap();
        assert!(matches!(error, ExpTableError::DocumentError(DocumentError::MissingTable)));
    }

    #[test]
    fn template_without_sample_row_uses_defaults() {
        let body = r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Entidad</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;
        let template = read_template_from(Cursor::new(build_docx(body))).unwrap();
        assert_eq!(template.title, "");
        assert_eq!(template.page, PageSetup::default());
        assert_eq!(template.columns, vec![TemplateColumn::new("Entidad")]);
    }

    #[test]
    fn non_docx_archive_fails() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("other.xml", SimpleFileOptions::default()).unwrap();
        let bytes = zip.finish().unwrap().into_inner();
        let error = read_template_from(Cursor::new(bytes)).err().unwrap();
        assert_eq!(error.to_string(), "Missing part 'word/document.xml' in document");
    }
}
