//! Access to the XML parts of an `.xlsx` archive.

use crate::helpers::xml::XmlReader;
use crate::spreadsheet::SpreadsheetError;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use zip::read::ZipFile;
use zip::ZipArchive;

pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Opens a part for XML reading, None if the archive lacks it.
    /// Part names match case-insensitively and with either path separator.
    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, SpreadsheetError>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, SpreadsheetError> {
        let wanted = name.replace('\\', "/");
        let index = (0..self.len()).find(|index| {
            self.name_for_index(*index)
                .map(|part| part.eq_ignore_ascii_case(&wanted))
                .unwrap_or(false)
        });
        match index {
            Some(index) => Ok(Some(XmlReader::new(BufReader::new(self.by_index(index)?)))),
            None => Ok(None),
        }
    }
}
