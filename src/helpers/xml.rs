//! XML parsing utilities for the OOXML parts of spreadsheets and documents
//! Provides XML reader wrapper and helper traits for attribute and text processing

use crate::error::ExpTableError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),

    #[error("Parse attribute value '{0}' failed")]
    ParseAttributeValueError(String),
}

/// XML reader wrapper configured for OOXML parts
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    /// Creates a new XML reader; empty elements are expanded into start/end pairs
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event from the reader
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, ExpTableError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(ExpTableError::XmlError(error)),
        }
    }
}

/// Helper trait for XML attributes providing convenient value extraction and parsing
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, ExpTableError>;

    /// Parses the attribute value to the specified type
    fn parse_value<T: FromStr>(&self) -> Result<T, ExpTableError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, ExpTableError> {
        Ok(self.unescape_value()?)
    }

    fn parse_value<T: FromStr>(&self) -> Result<T, ExpTableError> {
        self.get_value()?
            .parse()
            .map_err(|_| match std::str::from_utf8(&self.value) {
                Ok(value) => ExpTableError::XmlHelperError(XmlError::ParseAttributeValueError(value.to_string())),
                Err(error) => ExpTableError::StringEncodingError(error),
            })
    }
}

/// Helper trait for XML nodes providing attribute access methods
pub(crate) trait XmlNodeHelper<'a> {
    /// Gets an attribute value by its qualified name
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, ExpTableError>;

    /// Gets an attribute value by local name, ignoring the namespace prefix (`w:val` matches `val`)
    fn get_local_attribute_value(&'a self, local_name: &str) -> Result<Option<Cow<'a, str>>, ExpTableError>;

    /// Parses an attribute value, looked up by local name, to the specified type
    fn parse_local_attribute_value<T: FromStr>(&'a self, local_name: &str) -> Result<Option<T>, ExpTableError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, ExpTableError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }

    fn get_local_attribute_value(&'a self, local_name: &str) -> Result<Option<Cow<'a, str>>, ExpTableError> {
        for result in self.attributes() {
            let attribute = result?;
            if attribute.key.local_name().as_ref() == local_name.as_bytes() {
                return Ok(Some(attribute.get_value()?));
            }
        }
        Ok(None)
    }

    fn parse_local_attribute_value<T: FromStr>(&'a self, local_name: &str) -> Result<Option<T>, ExpTableError> {
        for result in self.attributes() {
            let attribute = result?;
            if attribute.key.local_name().as_ref() == local_name.as_bytes() {
                return attribute.parse_value().map(Some);
            }
        }
        Ok(None)
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends text content from a BytesRef event (handles entities and character references)
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), ExpTableError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), ExpTableError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                u32::from_str_radix(number, 10)?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push_str(character.encode_utf8(&mut [0u8; 4]));
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn local_attribute_ignores_prefix() -> Result<(), ExpTableError> {
        let mut reader = XmlReader::new(Cursor::new(r#"<w:jc w:val="center"/>"#.as_bytes()));
        let mut value = None;
        match_xml_events!(reader => {
            Event::Start(event) => {
                value = event.get_local_attribute_value("val")?.map(|v| v.to_string());
            }
        });
        assert_eq!(value.as_deref(), Some("center"));
        Ok(())
    }

    #[test]
    fn parse_local_attribute_reports_bad_value() -> Result<(), ExpTableError> {
        let mut reader = XmlReader::new(Cursor::new(r#"<w:gridCol w:w="wide"/>"#.as_bytes()));
        let mut failed = false;
        match_xml_events!(reader => {
            Event::Start(event) => {
                failed = event.parse_local_attribute_value::<u32>("w").is_err();
            }
        });
        assert!(failed);
        Ok(())
    }
}
