//! # Tabular Store Adapter
//!
//! The boundary between the guest repository and whatever keeps the rows:
//! a remote spreadsheet worksheet in production, [`MemoryStore`] in tests and
//! when working from a downloaded workbook snapshot.
//!
//! Rows and columns are 1-based and row 1 is always the header.
use crate::guest::record::GuestRecord;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

/// Failures reported by a store adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Row {0} is out of range")]
    RowOutOfRange(usize),

    #[error("Column {0} is out of range")]
    ColumnOutOfRange(usize),

    /// Network, authentication or quota failures of a remote store
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Position-addressed access to a headered table of text cells.
pub trait TabularStore {
    /// Every row, header first.
    fn get_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError>;

    /// One record per data row, keyed by the header names.
    fn get_all_records(&self) -> Result<Vec<GuestRecord>, StoreError> {
        let rows = self.get_all_rows()?;
        let mut rows = rows.iter();
        let header = match rows.next() {
            Some(header) => header,
            None => return Ok(Vec::new()),
        };
        Ok(rows.map(|row| GuestRecord::from_row(header, row)).collect())
    }

    /// Appends a row after the last one.
    fn append_row(&mut self, values: Vec<String>) -> Result<(), StoreError>;

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), StoreError>;

    /// Removes a row; every later row moves up by one.
    fn delete_row(&mut self, row: usize) -> Result<(), StoreError>;
}

impl<T: TabularStore + ?Sized> TabularStore for &mut T {
    fn get_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        (**self).get_all_rows()
    }

    fn get_all_records(&self) -> Result<Vec<GuestRecord>, StoreError> {
        (**self).get_all_records()
    }

    fn append_row(&mut self, values: Vec<String>) -> Result<(), StoreError> {
        (**self).append_row(values)
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        (**self).update_cell(row, col, value)
    }

    fn delete_row(&mut self, row: usize) -> Result<(), StoreError> {
        (**self).delete_row(row)
    }
}
