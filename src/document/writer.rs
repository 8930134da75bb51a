//! Document writer: one title paragraph followed by the generated table.

use crate::document::Alignment;
use crate::document::PageSetup;
use crate::document::TemplateInfo;
use crate::error::ExpTableError;
use crate::mapping::ColumnMapping;
use crate::mapping::DataRecord;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::fs::File;
use std::io::BufWriter;
use std::io::Seek;
use std::io::Write;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

const WORDPROCESSING_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" "#,
    r#"ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" "#,
    r#"Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" "#,
    r#"Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

/// Font size of title, header and data runs, in half-points (11pt).
const FONT_SIZE: &str = "22";

/// Fill of the header row cells.
const HEADER_FILL: &str = "BFBFBF";

const TABLE_BORDERS: [&str; 6] = ["top", "left", "bottom", "right", "insideH", "insideV"];

/// Writes the generated document to `file_name`, replacing any existing file.
///
/// # Arguments
///
/// * `file_name` - Output .docx path
/// * `template` - Title and page setup to reproduce
/// * `mapping` - Output columns, in order
/// * `records` - One data row per record, values looked up by column header
pub fn write_document(
    file_name: &str,
    template: &TemplateInfo,
    mapping: &[ColumnMapping],
    records: &[DataRecord],
) -> Result<(), ExpTableError> {
    let file = BufWriter::new(File::create(file_name)?);
    let mut file = write_document_to(file, template, mapping, records)?;
    file.flush()?;
    debug!(file = file_name, rows = records.len(), columns = mapping.len(), "wrote document");
    Ok(())
}

/// Writes the generated document into any seekable sink and hands the sink back.
pub fn write_document_to<W: Write + Seek>(
    writer: W,
    template: &TemplateInfo,
    mapping: &[ColumnMapping],
    records: &[DataRecord],
) -> Result<W, ExpTableError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELATIONSHIPS.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    let mut xml = Writer::new(&mut zip);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    start(&mut xml, "w:document", &[("xmlns:w", WORDPROCESSING_NAMESPACE)])?;
    start(&mut xml, "w:body", &[])?;
    write_paragraph(&mut xml, &template.title, Alignment::Center, true)?;
    write_table(&mut xml, mapping, records)?;
    write_section(&mut xml, &template.page)?;
    end(&mut xml, "w:body")?;
    end(&mut xml, "w:document")?;

    Ok(zip.finish()?)
}

fn write_table<W: Write>(
    xml: &mut Writer<W>,
    mapping: &[ColumnMapping],
    records: &[DataRecord],
) -> Result<(), ExpTableError> {
    let total_width = mapping.iter().fold(0u32, |total, column| total.saturating_add(column.width));
    start(xml, "w:tbl", &[])?;

    start(xml, "w:tblPr", &[])?;
    empty(xml, "w:tblW", &[("w:w", total_width.to_string().as_str()), ("w:type", "dxa")])?;
    start(xml, "w:tblBorders", &[])?;
    for border in TABLE_BORDERS {
        let name = format!("w:{border}");
        empty(xml, &name, &[("w:val", "single"), ("w:sz", "4"), ("w:space", "0"), ("w:color", "auto")])?;
    }
    end(xml, "w:tblBorders")?;
    empty(xml, "w:tblLayout", &[("w:type", "fixed")])?;
    end(xml, "w:tblPr")?;

    start(xml, "w:tblGrid", &[])?;
    for column in mapping {
        empty(xml, "w:gridCol", &[("w:w", column.width.to_string().as_str())])?;
    }
    end(xml, "w:tblGrid")?;

    start(xml, "w:tr", &[])?;
    for column in mapping {
        write_cell(xml, &column.header, column.width, Alignment::Center, true, true)?;
    }
    end(xml, "w:tr")?;

    for record in records {
        start(xml, "w:tr", &[])?;
        for column in mapping {
            let value = record.get(&column.header).map(String::as_str).unwrap_or("");
            write_cell(xml, value, column.width, column.alignment, column.bold, false)?;
        }
        end(xml, "w:tr")?;
    }

    end(xml, "w:tbl")
}

fn write_cell<W: Write>(
    xml: &mut Writer<W>,
    text: &str,
    width: u32,
    alignment: Alignment,
    bold: bool,
    header: bool,
) -> Result<(), ExpTableError> {
    start(xml, "w:tc", &[])?;
    start(xml, "w:tcPr", &[])?;
    empty(xml, "w:tcW", &[("w:w", width.to_string().as_str()), ("w:type", "dxa")])?;
    if header {
        empty(xml, "w:shd", &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", HEADER_FILL)])?;
        empty(xml, "w:vAlign", &[("w:val", "center")])?;
    }
    end(xml, "w:tcPr")?;
    write_paragraph(xml, text, alignment, bold)?;
    end(xml, "w:tc")
}

/// Single-run paragraph with compact spacing; line breaks in `text` become `w:br`.
fn write_paragraph<W: Write>(
    xml: &mut Writer<W>,
    text: &str,
    alignment: Alignment,
    bold: bool,
) -> Result<(), ExpTableError> {
    start(xml, "w:p", &[])?;
    start(xml, "w:pPr", &[])?;
    empty(xml, "w:spacing", &[("w:after", "0"), ("w:line", "240"), ("w:lineRule", "auto")])?;
    empty(xml, "w:jc", &[("w:val", alignment.as_jc())])?;
    end(xml, "w:pPr")?;

    start(xml, "w:r", &[])?;
    start(xml, "w:rPr", &[])?;
    if bold {
        empty(xml, "w:b", &[])?;
    }
    empty(xml, "w:sz", &[("w:val", FONT_SIZE)])?;
    empty(xml, "w:szCs", &[("w:val", FONT_SIZE)])?;
    end(xml, "w:rPr")?;
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            empty(xml, "w:br", &[])?;
        }
        start(xml, "w:t", &[("xml:space", "preserve")])?;
        xml.write_event(Event::Text(BytesText::new(line)))?;
        end(xml, "w:t")?;
    }
    end(xml, "w:r")?;

    end(xml, "w:p")
}

fn write_section<W: Write>(xml: &mut Writer<W>, page: &PageSetup) -> Result<(), ExpTableError> {
    let width = page.width.to_string();
    let height = page.height.to_string();
    let mut size = vec![("w:w", width.as_str()), ("w:h", height.as_str())];
    if page.landscape {
        size.push(("w:orient", "landscape"));
    }

    start(xml, "w:sectPr", &[])?;
    empty(xml, "w:pgSz", &size)?;
    empty(xml, "w:pgMar", &[
        ("w:top", page.top_margin.to_string().as_str()),
        ("w:right", page.right_margin.to_string().as_str()),
        ("w:bottom", page.bottom_margin.to_string().as_str()),
        ("w:left", page.left_margin.to_string().as_str()),
        ("w:header", "720"),
        ("w:footer", "720"),
        ("w:gutter", "0"),
    ])?;
    end(xml, "w:sectPr")
}

fn start<W: Write>(xml: &mut Writer<W>, name: &str, attributes: &[(&str, &str)]) -> Result<(), ExpTableError> {
    xml.write_event(Event::Start(BytesStart::new(name).with_attributes(attributes.iter().copied())))?;
    Ok(())
}

fn empty<W: Write>(xml: &mut Writer<W>, name: &str, attributes: &[(&str, &str)]) -> Result<(), ExpTableError> {
    xml.write_event(Event::Empty(BytesStart::new(name).with_attributes(attributes.iter().copied())))?;
    Ok(())
}

fn end<W: Write>(xml: &mut Writer<W>, name: &str) -> Result<(), ExpTableError> {
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
