//! Low-level helpers shared by the spreadsheet and document readers

pub(crate) mod xml;
pub(crate) mod zip;
