use crate::error::EnricherError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::RectangularTable;
use crate::spreadsheet::SpreadsheetClient;
use crate::spreadsheet::SpreadsheetError;
use chrono::DateTime;
use chrono::Utc;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::io::BufReader;
use zip::read::ZipFile;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

/// A spreadsheet exported as an `.xlsx` workbook.
///
/// The workbook is opened from a local path or downloaded from an `http(s)` URL
/// (for example a Google Sheets `export?format=xlsx` link). The sheet listing is
/// parsed once on open and the shared string table on the first sheet read.
pub struct WorkbookFile {
    /// File name or URL of the workbook
    name: String,
    /// ZIP archive containing the XLSX file contents
    zip: ZipArchive<UnifiedReader>,
    /// List of worksheets with (name, zip_path) pairs
    sheets: Vec<(String, String)>,
    /// Shared string table, loaded on first use
    shared_strings: Option<Vec<String>>,
    /// Modification time of a local file
    last_modified: Option<DateTime<Utc>>,
}

impl WorkbookFile {
    /// Opens an XLSX workbook and parses its sheet listing
    ///
    /// # Arguments
    /// * `file_name` - Local path or `http(s)` URL of the workbook
    ///
    /// # Returns
    /// Result containing the opened workbook or an error
    pub fn open(file_name: &str) -> Result<WorkbookFile, EnricherError> {
        let reader = UnifiedReader::new(file_name)?;
        let last_modified = match &reader {
            UnifiedReader::Local(file) => file.get_ref().metadata()
                .and_then(|metadata| metadata.modified())
                .map(DateTime::<Utc>::from)
                .ok(),
            UnifiedReader::Remote(_) => None,
        };
        let mut zip = ZipArchive::new(reader)?;
        let sheets = load_workbook(&mut zip)?;
        tracing::debug!(workbook = file_name, sheets = sheets.len(), "opened workbook");
        Ok(WorkbookFile {
            name: file_name.to_owned(),
            zip,
            sheets,
            shared_strings: None,
            last_modified,
        })
    }
}

impl SpreadsheetClient for WorkbookFile {
    fn id(&self) -> &str {
        &self.name
    }

    fn sheet_names(&mut self) -> Result<Vec<String>, EnricherError> {
        Ok(self.sheets.iter().map(|(name, _)| name.to_owned()).collect())
    }

    fn last_modified(&mut self) -> Option<DateTime<Utc>> {
        if self.last_modified.is_none() {
            tracing::warn!(workbook = %self.name, "workbook has no modification time");
        }
        self.last_modified
    }

    /// Parses a worksheet and lays its cells out as a rectangular table
    ///
    /// Cells are placed by their `r` reference; cells without one follow the
    /// previous cell. Shared strings are resolved, booleans rendered as
    /// `TRUE`/`FALSE` and error values kept as their text (`#N/A`).
    fn read_sheet(&mut self, name: &str) -> Result<RectangularTable, EnricherError> {
        let Some(zip_path) = self.sheets.iter()
            .find(|(sheet_name, _)| sheet_name == name)
            .map(|(_, zip_path)| zip_path.to_owned()) else {
            return Err(SpreadsheetError::SheetNotFound {
                spreadsheet: self.name.to_owned(),
                sheet: name.to_owned(),
            }.into());
        };
        if self.shared_strings.is_none() {
            self.shared_strings = Some(load_shared_strings(&mut self.zip)?);
        }
        let shared_strings = self.shared_strings.as_deref().unwrap_or_default();

        let mut sheet = Sheet::new(name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                kind = CellType::from_attribute(event.get_attribute_value("t")?.as_deref());
                value.clear();
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if !value.is_empty() && event.name() == TAG_CELL => {
                let mut cell = Cell {
                    row,
                    col,
                    kind,
                    value: std::mem::take(&mut value),
                };
                if cell.kind == CellType::SharedString {
                    let index = cell.value.parse::<usize>()?;
                    cell.value = shared_strings.get(index).cloned().ok_or_else(|| {
                        SpreadsheetError::InvalidResponse(
                            self.name.to_owned(),
                            format!("cell {} references missing shared string {}", cell.reference(), index),
                        )
                    })?;
                }
                if !cell.value.is_empty() {
                    sheet.push(cell);
                }
            }
        });

        tracing::debug!(workbook = %self.name, sheet = %sheet.name, cells = sheet.cells.len(), "read worksheet");
        Ok(RectangularTable::from_rows(sheet.into_rows()))
    }
}

/// Loads the worksheet listing from `xl/workbook.xml`
///
/// # Returns
/// Worksheets as (name, zip_path) pairs in workbook order
fn load_workbook(zip: &mut ZipArchive<UnifiedReader>) -> Result<Vec<(String, String)>, EnricherError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
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
                if let Some(path) = relationships.get(&*id) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Loads the shared string table, empty when the workbook has none
fn load_shared_strings(zip: &mut ZipArchive<UnifiedReader>) -> Result<Vec<String>, EnricherError> {
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

/// Reads string value from XML content, handling text and CDATA sections
///
/// Phonetic annotations (`rPh`) are skipped.
///
/// # Arguments
/// * `reader` - XML reader positioned at the start of the string content
/// * `end_tag` - XML tag that marks the end of the string content
/// * `is_text_content` - Whether to treat the content as text by default
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, UnifiedReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, EnricherError> {
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
