use crate::spreadsheet::read_worksheet;
use crate::spreadsheet::SpreadsheetError;
use crate::store::StoreError;
use crate::store::TabularStore;
use std::path::Path;

/// A worksheet held entirely in memory.
///
/// Behaves like a spreadsheet tab: writing past the end of a row widens it,
/// but rows only come into existence through [`TabularStore::append_row`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    rows: Vec<Vec<String>>,
}

impl MemoryStore {
    /// Creates an empty store with no header row.
    pub fn new() -> Self {
        MemoryStore { rows: Vec::new() }
    }

    pub fn with_header<S: AsRef<str>>(header: &[S]) -> Self {
        MemoryStore::from_rows(vec![header.iter().map(|cell| cell.as_ref().to_string()).collect()])
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        MemoryStore { rows }
    }

    /// Loads a worksheet from an `.xlsx` snapshot of the booking spreadsheet.
    pub fn from_workbook<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Self, SpreadsheetError> {
        Ok(MemoryStore::from_rows(read_worksheet(path, sheet_name)?))
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_mut(&mut self, row: usize) -> Result<&mut Vec<String>, StoreError> {
        row.checked_sub(1)
            .and_then(|index| self.rows.get_mut(index))
            .ok_or(StoreError::RowOutOfRange(row))
    }
}

impl TabularStore for MemoryStore {
    fn get_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self.rows.clone())
    }

    fn append_row(&mut self, values: Vec<String>) -> Result<(), StoreError> {
        self.rows.push(values);
        Ok(())
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        if col == 0 {
            return Err(StoreError::ColumnOutOfRange(col));
        }
        let cells = self.row_mut(row)?;
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
        Ok(())
    }

    fn delete_row(&mut self, row: usize) -> Result<(), StoreError> {
        self.row_mut(row)?;
        self.rows.remove(row - 1);
        Ok(())
    }
}
