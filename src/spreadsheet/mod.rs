//! # Workbook Snapshots
//!
//! Reads a worksheet out of an `.xlsx` export of the booking spreadsheet so
//! it can be loaded into a [`MemoryStore`](crate::store::MemoryStore) and
//! inspected or edited offline.
use crate::spreadsheet::xlsx::XlsxWorkbook;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub(crate) mod reference;
pub(crate) mod xlsx;

/// Errors raised while reading a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("Invalid xlsx archive: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    /// A part the workbook cannot do without is missing from the archive
    #[error("Missing '{0}' in workbook")]
    FileError(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),
}

/// Reads every row of `sheet_name`, header first, as text.
pub fn read_worksheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Vec<Vec<String>>, SpreadsheetError> {
    let file = File::open(path.as_ref())?;
    let mut workbook = XlsxWorkbook::new(BufReader::new(file))?;
    debug!(
        path = %path.as_ref().display(),
        sheets = ?workbook.sheet_names().collect::<Vec<_>>(),
        "Opened workbook"
    );
    let rows = workbook.read_rows(sheet_name)?;
    debug!(sheet = sheet_name, rows = rows.len(), "Read worksheet");
    Ok(rows)
}
