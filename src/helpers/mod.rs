//! Low-level readers shared by the spreadsheet backends.

pub(crate) mod reader;
pub(crate) mod xml;
pub(crate) mod zip;
