//! # Guest Repository
//!
//! Key-based operations over a position-addressed [`TabularStore`]. Every
//! public operation reads the store afresh, locates its record by Email
//! Address and only then turns the logical index into a row number; nothing
//! positional survives from one call to the next, because a delete shifts
//! every later row up by one.
use crate::guest::record::GuestRecord;
use crate::guest::schema::Field;
use crate::guest::schema::Schema;
use crate::guest::schema::SchemaError;
use crate::guest::validate::ValidationError;
use crate::guest::validate::Validator;
use crate::store::StoreError;
use crate::store::TabularStore;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Rows above the first data row (just the header).
const HEADER_ROWS: usize = 1;

/// Failures of repository operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Invalid {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("Email already exists: '{0}'")]
    DuplicateKey(String),

    #[error("No guest found with email '{0}'")]
    NotFound(String),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// The key column can only change through [`Repository::rekey`]
    #[error("Field '{0}' is the record key and cannot be updated in place")]
    ImmutableKey(String),

    #[error("{0}")]
    SchemaMismatch(#[from] SchemaError),

    #[error("{0}")]
    StoreUnavailable(#[from] StoreError),
}

impl From<ValidationError> for RepositoryError {
    fn from(error: ValidationError) -> Self {
        RepositoryError::ValidationFailed {
            field: error.field.name().to_string(),
            reason: error.reason,
        }
    }
}

/// Header and data rows read by a single operation.
struct Snapshot {
    header: Vec<String>,
    records: Vec<GuestRecord>,
}

impl Snapshot {
    /// Logical index of the first record whose key equals `email`.
    fn position(&self, key: &str, email: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| has_key(record, key, email))
    }
}

/// A blank key cell never matches, not even a blank `email`.
fn has_key(record: &GuestRecord, key: &str, email: &str) -> bool {
    matches!(record.get(key), Some(value) if !value.is_empty() && value == email)
}

/// Converts a zero-based logical record index to a 1-based store row.
pub const fn row_index(logical: usize) -> usize {
    logical + HEADER_ROWS + 1
}

/// Guest records kept in a [`TabularStore`], keyed by Email Address.
///
/// Assumes a single writer. Lookups and the writes that follow them are not
/// atomic: another writer inserting or deleting rows between the scan and the
/// write would make the computed row number point at a different record.
/// Sharing a store between processes needs a lock in front of the repository.
pub struct Repository<S: TabularStore> {
    store: S,
    schema: Schema,
    validator: Validator,
}

impl<S: TabularStore> Repository<S> {
    pub fn new(store: S, schema: Schema) -> Self {
        Repository {
            store,
            schema,
            validator: Validator::default(),
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn key(&self) -> &str {
        &self.schema.key().name
    }

    fn snapshot(&self) -> Result<Snapshot, RepositoryError> {
        let mut rows = self.store.get_all_rows()?.into_iter();
        let header = rows.next().unwrap_or_default();
        let records = rows.map(|row| GuestRecord::from_row(&header, &row)).collect();
        Ok(Snapshot { header, records })
    }

    /// Writes the schema header into an empty store, or checks the one already there.
    pub fn ensure_header(&mut self) -> Result<(), RepositoryError> {
        let rows = self.store.get_all_rows()?;
        match rows.first() {
            Some(header) => Ok(self.schema.check_header(header)?),
            None => {
                self.store.append_row(self.schema.names())?;
                info!(header = ?self.schema.names(), "Created header row");
                Ok(())
            }
        }
    }

    /// Validates every schema field of `record`, in column order.
    fn validate(&self, record: &GuestRecord) -> Result<(), RepositoryError> {
        if let Some((name, _)) = record
            .fields()
            .find(|(name, _)| self.schema.column(name).is_none())
        {
            Err(RepositoryError::UnknownField(name.to_string()))?;
        }
        for column in self.schema.columns() {
            let value = record.get(&column.name).unwrap_or("");
            self.validator.check(column.field, value)?;
        }
        Ok(())
    }

    /// Appends a new guest after checking every field and the uniqueness of its email.
    pub fn add(&mut self, record: &GuestRecord) -> Result<(), RepositoryError> {
        self.validate(record)?;
        let snapshot = self.snapshot()?;
        if snapshot.header.is_empty() {
            Err(SchemaError::MissingHeader)?;
        }
        self.schema.check_header(&snapshot.header)?;

        let email = record.email(&self.schema).unwrap_or("");
        if snapshot.position(self.key(), email).is_some() {
            warn!(email, "Rejected guest with duplicate email");
            return Err(RepositoryError::DuplicateKey(email.to_string()));
        }

        let row = record.to_row(&self.schema);
        debug!(row = row_index(snapshot.records.len()), "append_row");
        self.store.append_row(row)?;
        info!(email, "Added guest");
        Ok(())
    }

    /// Returns the first record, in store order, whose email equals `email`.
    pub fn find_by_email(&self, email: &str) -> Result<Option<GuestRecord>, RepositoryError> {
        let key = self.key();
        let record = self
            .store
            .get_all_records()?
            .into_iter()
            .find(|record| has_key(record, key, email));
        Ok(record)
    }

    /// Overwrites the fields present in `changes` on the record keyed by `email`.
    ///
    /// All names and values are checked before the first cell is written. The
    /// cells are then written one at a time, so a store failure part way
    /// through leaves the earlier fields updated; the error is returned as
    /// [`RepositoryError::StoreUnavailable`] and the applied fields are logged.
    pub fn update_by_email(&mut self, email: &str, changes: &GuestRecord) -> Result<(), RepositoryError> {
        let snapshot = self.snapshot()?;
        let logical = snapshot
            .position(self.key(), email)
            .ok_or_else(|| RepositoryError::NotFound(email.to_string()))?;

        let mut writes = Vec::<(usize, &str, &str)>::with_capacity(changes.len());
        for (name, value) in changes.fields() {
            let column = self
                .schema
                .column(name)
                .ok_or_else(|| RepositoryError::UnknownField(name.to_string()))?;
            let col = Schema::column_index(&snapshot.header, name)
                .ok_or_else(|| RepositoryError::UnknownField(name.to_string()))?;
            if column.field == Field::EmailAddress {
                if value == email {
                    continue;
                }
                return Err(RepositoryError::ImmutableKey(name.to_string()));
            }
            self.validator.check(column.field, value)?;
            writes.push((col, name, value));
        }

        let row = row_index(logical);
        let mut applied = Vec::<&str>::with_capacity(writes.len());
        for (col, name, value) in writes {
            debug!(row, col, field = name, "update_cell");
            if let Err(error) = self.store.update_cell(row, col, value) {
                if !applied.is_empty() {
                    warn!(email, ?applied, %error, "Update partially applied");
                }
                return Err(error.into());
            }
            applied.push(name);
        }
        if !applied.is_empty() {
            info!(email, fields = ?applied, "Updated guest");
        }
        Ok(())
    }

    /// Removes the record keyed by `email`.
    pub fn delete_by_email(&mut self, email: &str) -> Result<(), RepositoryError> {
        let snapshot = self.snapshot()?;
        let logical = snapshot
            .position(self.key(), email)
            .ok_or_else(|| RepositoryError::NotFound(email.to_string()))?;
        let row = row_index(logical);
        debug!(row, "delete_row");
        self.store.delete_row(row)?;
        info!(email, "Deleted guest");
        Ok(())
    }

    /// Every row of the store, header included, for display.
    pub fn list_all(&self) -> Result<Vec<Vec<String>>, RepositoryError> {
        Ok(self.store.get_all_rows()?)
    }

    /// Moves a record from `old_email` to `new_email`.
    ///
    /// The record is appended under the new key before the old row is deleted,
    /// so a failure between the two steps leaves both copies rather than none.
    pub fn rekey(&mut self, old_email: &str, new_email: &str) -> Result<(), RepositoryError> {
        self.validator.check(Field::EmailAddress, new_email)?;
        let snapshot = self.snapshot()?;
        let key = self.key().to_string();
        let logical = snapshot
            .position(&key, old_email)
            .ok_or_else(|| RepositoryError::NotFound(old_email.to_string()))?;
        if old_email == new_email {
            return Ok(());
        }
        if snapshot.position(&key, new_email).is_some() {
            warn!(email = new_email, "Rejected rekey to an existing email");
            return Err(RepositoryError::DuplicateKey(new_email.to_string()));
        }
        self.schema.check_header(&snapshot.header)?;

        let mut record = snapshot.records[logical].clone();
        record.set(&key, new_email);
        self.validate(&record)?;
        debug!(row = row_index(snapshot.records.len()), "append_row");
        self.store.append_row(record.to_row(&self.schema))?;

        // Rows may have moved since the first read
        let snapshot = self.snapshot()?;
        let logical = snapshot
            .position(&key, old_email)
            .ok_or_else(|| RepositoryError::NotFound(old_email.to_string()))?;
        let row = row_index(logical);
        debug!(row, "delete_row");
        self.store.delete_row(row)?;
        info!(old_email, new_email, "Changed guest email");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guest::schema::SchemaVariant;
    use crate::store::MemoryStore;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Append(Vec<String>),
        UpdateCell(usize, usize, String),
        DeleteRow(usize),
    }

    /// Records every write on its way to an in-memory store.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        calls: Vec<Call>,
    }

    impl TabularStore for RecordingStore {
        fn get_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
            self.inner.get_all_rows()
        }

        fn append_row(&mut self, values: Vec<String>) -> Result<(), StoreError> {
            self.calls.push(Call::Append(values.clone()));
            self.inner.append_row(values)
        }

        fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
            self.calls.push(Call::UpdateCell(row, col, value.to_string()));
            self.inner.update_cell(row, col, value)
        }

        fn delete_row(&mut self, row: usize) -> Result<(), StoreError> {
            self.calls.push(Call::DeleteRow(row));
            self.inner.delete_row(row)
        }
    }

    /// Accepts a fixed number of cell writes, then reports the store as gone.
    struct FailingStore {
        inner: MemoryStore,
        writes_left: usize,
    }

    impl TabularStore for FailingStore {
        fn get_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
            self.inner.get_all_rows()
        }

        fn append_row(&mut self, values: Vec<String>) -> Result<(), StoreError> {
            self.inner.append_row(values)
        }

        fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
            if self.writes_left == 0 {
                return Err(StoreError::Unavailable("quota exceeded".to_string()));
            }
            self.writes_left -= 1;
            self.inner.update_cell(row, col, value)
        }

        fn delete_row(&mut self, row: usize) -> Result<(), StoreError> {
            self.inner.delete_row(row)
        }
    }

    /// Fails every read and counts attempted writes.
    #[derive(Default)]
    struct UnreadableStore {
        writes: usize,
    }

    impl TabularStore for UnreadableStore {
        fn get_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
            Err(StoreError::Unavailable("token expired".to_string()))
        }

        fn append_row(&mut self, _values: Vec<String>) -> Result<(), StoreError> {
            self.writes += 1;
            Ok(())
        }

        fn update_cell(&mut self, _row: usize, _col: usize, _value: &str) -> Result<(), StoreError> {
            self.writes += 1;
            Ok(())
        }

        fn delete_row(&mut self, _row: usize) -> Result<(), StoreError> {
            self.writes += 1;
            Ok(())
        }
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn guest(name: &str, email: &str) -> GuestRecord {
        GuestRecord::new()
            .with("Name", name)
            .with("Phone Number", "+447000000000")
            .with("Address", "Leeds")
            .with("Email Address", email)
            .with("Room Class", "Double")
            .with("Room Number", "12")
            .with("Amount Paid", "150.00")
    }

    fn full_repository() -> Repository<RecordingStore> {
        let schema = Schema::variant(SchemaVariant::Full);
        let store = RecordingStore {
            inner: MemoryStore::with_header(&schema.names()),
            calls: Vec::new(),
        };
        Repository::new(store, schema)
    }

    fn repository_with(count: usize) -> Repository<RecordingStore> {
        let mut repository = full_repository();
        for index in 0..count {
            let name = format!("Guest{}", (b'A' + index as u8) as char);
            repository.add(&guest(&name, &format!("guest{index}@x.com"))).unwrap();
        }
        repository.store_mut().calls.clear();
        repository
    }

    fn amy_repository() -> Repository<RecordingStore> {
        let schema = Schema::from_names(&["Name", "Phone", "Address", "Email"]).unwrap();
        let store = RecordingStore {
            inner: MemoryStore::from_rows(vec![
                row(&["Name", "Phone", "Address", "Email"]),
                row(&["Amy", "+447000000000", "Leeds", "amy@x.com"]),
            ]),
            calls: Vec::new(),
        };
        Repository::new(store, schema)
    }

    #[test]
    fn update_single_field_addresses_exact_cell() {
        let mut repository = amy_repository();
        repository
            .update_by_email("amy@x.com", &GuestRecord::new().with("Address", "Bolton"))
            .unwrap();

        assert_eq!(repository.store().calls, vec![Call::UpdateCell(2, 3, "Bolton".to_string())]);
        assert_eq!(
            repository.store().inner.rows()[1],
            row(&["Amy", "+447000000000", "Bolton", "amy@x.com"])
        );
    }

    #[test]
    fn add_then_find_round_trip() {
        let mut repository = full_repository();
        let amy = guest("Amy", "amy@x.com");
        repository.add(&amy).unwrap();

        assert_eq!(
            repository.store().calls,
            vec![Call::Append(row(&["Amy", "+447000000000", "Leeds", "amy@x.com", "Double", "12", "150.00"]))]
        );
        assert_eq!(repository.find_by_email("amy@x.com").unwrap(), Some(amy));
    }

    #[test]
    fn add_duplicate_email_is_rejected() {
        let mut repository = repository_with(2);
        let result = repository.add(&guest("Other", "guest1@x.com"));

        assert_eq!(result, Err(RepositoryError::DuplicateKey("guest1@x.com".to_string())));
        assert!(repository.store().calls.is_empty());
        assert_eq!(repository.store().inner.row_count(), 3);
    }

    #[test]
    fn add_invalid_field_writes_nothing() {
        let mut repository = full_repository();
        let result = repository.add(&guest("O'Brien", "ob@x.com"));

        assert_eq!(
            result,
            Err(RepositoryError::ValidationFailed {
                field: "Name".to_string(),
                reason: "use letters, hyphens and spaces only".to_string(),
            })
        );
        assert!(repository.store().calls.is_empty());
    }

    #[test]
    fn add_missing_field_writes_nothing() {
        let mut repository = full_repository();
        let mut record = GuestRecord::new();
        for (name, value) in guest("Amy", "amy@x.com").fields().filter(|(name, _)| *name != "Room Number") {
            record.set(name, value);
        }

        match repository.add(&record) {
            Err(RepositoryError::ValidationFailed { field, .. }) => assert_eq!(field, "Room Number"),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(repository.store().calls.is_empty());
    }

    #[test]
    fn add_unknown_field_writes_nothing() {
        let mut repository = full_repository();
        let record = guest("Amy", "amy@x.com").with("Nickname", "Ames");

        assert_eq!(repository.add(&record), Err(RepositoryError::UnknownField("Nickname".to_string())));
        assert!(repository.store().calls.is_empty());
    }

    #[test]
    fn add_requires_matching_header() {
        let schema = Schema::variant(SchemaVariant::Full);
        let mut repository = Repository::new(MemoryStore::new(), schema.clone());
        assert_eq!(
            repository.add(&guest("Amy", "amy@x.com")),
            Err(RepositoryError::SchemaMismatch(SchemaError::MissingHeader))
        );

        let minimal = Schema::variant(SchemaVariant::Minimal);
        let mut repository = Repository::new(MemoryStore::with_header(&minimal.names()), schema);
        assert!(matches!(
            repository.add(&guest("Amy", "amy@x.com")),
            Err(RepositoryError::SchemaMismatch(SchemaError::HeaderMismatch { .. }))
        ));
        assert_eq!(repository.store().row_count(), 1);
    }

    #[test]
    fn read_failures_surface_without_writes() {
        let mut repository = Repository::new(UnreadableStore::default(), Schema::variant(SchemaVariant::Full));

        assert!(matches!(
            repository.add(&guest("Amy", "amy@x.com")),
            Err(RepositoryError::StoreUnavailable(StoreError::Unavailable(_)))
        ));
        assert!(matches!(
            repository.find_by_email("amy@x.com"),
            Err(RepositoryError::StoreUnavailable(_))
        ));
        assert!(matches!(
            repository.update_by_email("amy@x.com", &GuestRecord::new().with("Room Number", "7")),
            Err(RepositoryError::StoreUnavailable(_))
        ));
        assert!(matches!(
            repository.delete_by_email("amy@x.com"),
            Err(RepositoryError::StoreUnavailable(_))
        ));
        assert_eq!(repository.store().writes, 0);
    }

    #[test]
    fn find_missing_is_none() {
        let repository = repository_with(3);
        assert_eq!(repository.find_by_email("nobody@x.com").unwrap(), None);
    }

    #[test]
    fn find_tolerates_records_without_email() {
        let store = MemoryStore::from_rows(vec![row(&["Name", "Address"]), row(&["Amy", "Leeds"])]);
        let repository = Repository::new(store, Schema::variant(SchemaVariant::Minimal));
        assert_eq!(repository.find_by_email("amy@x.com").unwrap(), None);
    }

    #[test]
    fn blank_email_cell_never_matches() {
        let store = RecordingStore {
            inner: MemoryStore::from_rows(vec![
                row(&["Name", "Phone Number", "Address", "Email Address"]),
                row(&["Amy", "+447000000000", "Leeds", "amy@x.com"]),
                row(&["Bob", "+447000000001", "York"]),
            ]),
            calls: Vec::new(),
        };
        let mut repository = Repository::new(store, Schema::variant(SchemaVariant::Minimal));

        assert_eq!(repository.find_by_email("").unwrap(), None);
        assert!(matches!(
            repository.update_by_email("", &GuestRecord::new().with("Address", "Hull")),
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(repository.delete_by_email(""), Err(RepositoryError::NotFound(_))));
        assert!(repository.store().calls.is_empty());
        assert_eq!(repository.list_all().unwrap().len(), 2);
    }

    #[test]
    fn update_and_delete_use_logical_index_plus_two() {
        for k in 0..5 {
            let mut repository = repository_with(5);
            let email = format!("guest{k}@x.com");
            repository
                .update_by_email(&email, &GuestRecord::new().with("Room Number", "99"))
                .unwrap();
            assert_eq!(repository.store().calls, vec![Call::UpdateCell(k + 2, 6, "99".to_string())]);

            repository.store_mut().calls.clear();
            repository.delete_by_email(&email).unwrap();
            assert_eq!(repository.store().calls, vec![Call::DeleteRow(k + 2)]);
        }
    }

    #[test]
    fn row_indices_are_recomputed_after_delete() {
        let mut repository = repository_with(3);
        repository.delete_by_email("guest0@x.com").unwrap();
        repository
            .update_by_email("guest2@x.com", &GuestRecord::new().with("Address", "York"))
            .unwrap();

        assert_eq!(
            repository.store().calls,
            vec![Call::DeleteRow(2), Call::UpdateCell(3, 3, "York".to_string())]
        );
        let guest2 = repository.find_by_email("guest2@x.com").unwrap().unwrap();
        assert_eq!(guest2.get("Address"), Some("York"));
        assert_eq!(guest2.get("Name"), Some("GuestC"));
    }

    #[test]
    fn update_with_no_fields_changes_nothing() {
        let mut repository = repository_with(2);
        let before = repository.store().inner.clone();
        repository.update_by_email("guest1@x.com", &GuestRecord::new()).unwrap();

        assert!(repository.store().calls.is_empty());
        assert_eq!(repository.store().inner, before);
    }

    #[test]
    fn update_several_fields() {
        let mut repository = repository_with(2);
        let changes = GuestRecord::new()
            .with("Room Class", "suite")
            .with("Amount Paid", "0")
            .with("Phone Number", "+15550100");
        repository.update_by_email("guest1@x.com", &changes).unwrap();

        assert_eq!(
            repository.store().calls,
            vec![
                Call::UpdateCell(3, 5, "suite".to_string()),
                Call::UpdateCell(3, 7, "0".to_string()),
                Call::UpdateCell(3, 2, "+15550100".to_string()),
            ]
        );
        let guest0 = repository.find_by_email("guest0@x.com").unwrap().unwrap();
        assert_eq!(guest0, guest("GuestA", "guest0@x.com"));
    }

    #[test]
    fn update_missing_email_is_not_found() {
        let mut repository = repository_with(2);
        let result = repository.update_by_email("nobody@x.com", &GuestRecord::new().with("Address", "York"));

        assert_eq!(result, Err(RepositoryError::NotFound("nobody@x.com".to_string())));
        assert!(repository.store().calls.is_empty());
    }

    #[test]
    fn update_unknown_field_writes_nothing() {
        let mut repository = repository_with(2);
        let changes = GuestRecord::new().with("Address", "York").with("Nickname", "Ames");

        assert_eq!(
            repository.update_by_email("guest0@x.com", &changes),
            Err(RepositoryError::UnknownField("Nickname".to_string()))
        );
        assert!(repository.store().calls.is_empty());
    }

    #[test]
    fn update_field_missing_from_header_is_unknown() {
        // Minimal worksheet, full schema: Room Class has no column
        let store = MemoryStore::from_rows(vec![
            row(&["Name", "Phone Number", "Address", "Email Address"]),
            row(&["Amy", "+447000000000", "Leeds", "amy@x.com"]),
        ]);
        let mut repository = Repository::new(store, Schema::variant(SchemaVariant::Full));

        assert_eq!(
            repository.update_by_email("amy@x.com", &GuestRecord::new().with("Room Class", "Suite")),
            Err(RepositoryError::UnknownField("Room Class".to_string()))
        );
    }

    #[test]
    fn update_invalid_value_writes_nothing() {
        let mut repository = repository_with(1);
        let changes = GuestRecord::new().with("Address", "York").with("Room Number", "0");

        match repository.update_by_email("guest0@x.com", &changes) {
            Err(RepositoryError::ValidationFailed { field, .. }) => assert_eq!(field, "Room Number"),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(repository.store().calls.is_empty());
    }

    #[test]
    fn update_cannot_change_email() {
        let mut repository = repository_with(1);
        let changes = GuestRecord::new().with("Email Address", "new@x.com");
        assert_eq!(
            repository.update_by_email("guest0@x.com", &changes),
            Err(RepositoryError::ImmutableKey("Email Address".to_string()))
        );

        let unchanged = GuestRecord::new().with("Email Address", "guest0@x.com").with("Address", "York");
        repository.update_by_email("guest0@x.com", &unchanged).unwrap();
        assert_eq!(repository.store().calls, vec![Call::UpdateCell(2, 3, "York".to_string())]);
    }

    #[test]
    fn update_follows_header_positions() {
        let schema = Schema::variant(SchemaVariant::Minimal);
        let store = RecordingStore {
            inner: MemoryStore::from_rows(vec![
                row(&["Email Address", "Address", "Name", "Phone Number"]),
                row(&["amy@x.com", "Leeds", "Amy", "+447000000000"]),
            ]),
            calls: Vec::new(),
        };
        let mut repository = Repository::new(store, schema);
        repository
            .update_by_email("amy@x.com", &GuestRecord::new().with("Name", "Amy-Rose"))
            .unwrap();
        assert_eq!(repository.store().calls, vec![Call::UpdateCell(2, 3, "Amy-Rose".to_string())]);
    }

    #[test]
    fn failed_store_write_leaves_partial_update() {
        let schema = Schema::variant(SchemaVariant::Full);
        let mut inner = MemoryStore::with_header(&schema.names());
        inner.append_row(guest("Amy", "amy@x.com").to_row(&schema)).unwrap();
        let store = FailingStore { inner, writes_left: 1 };
        let mut repository = Repository::new(store, schema);

        let changes = GuestRecord::new().with("Address", "York").with("Room Number", "7");
        assert_eq!(
            repository.update_by_email("amy@x.com", &changes),
            Err(RepositoryError::StoreUnavailable(StoreError::Unavailable("quota exceeded".to_string())))
        );
        let amy = repository.find_by_email("amy@x.com").unwrap().unwrap();
        assert_eq!(amy.get("Address"), Some("York"));
        assert_eq!(amy.get("Room Number"), Some("12"));
    }

    #[test]
    fn delete_then_find_is_none() {
        let mut repository = repository_with(3);
        repository.delete_by_email("guest1@x.com").unwrap();

        assert_eq!(repository.find_by_email("guest1@x.com").unwrap(), None);
        assert!(repository.find_by_email("guest2@x.com").unwrap().is_some());
        assert_eq!(repository.store().inner.row_count(), 3);
        assert_eq!(
            repository.delete_by_email("guest1@x.com"),
            Err(RepositoryError::NotFound("guest1@x.com".to_string()))
        );
    }

    #[test]
    fn duplicate_emails_act_on_first_match() {
        let store = RecordingStore {
            inner: MemoryStore::from_rows(vec![
                row(&["Name", "Phone", "Address", "Email"]),
                row(&["Amy", "+447000000000", "Leeds", "amy@x.com"]),
                row(&["Bob", "+447000000001", "York", "bob@x.com"]),
                row(&["Ann", "+447000000002", "Hull", "amy@x.com"]),
            ]),
            calls: Vec::new(),
        };
        let schema = Schema::from_names(&["Name", "Phone", "Address", "Email"]).unwrap();
        let mut repository = Repository::new(store, schema);

        let amy = repository.find_by_email("amy@x.com").unwrap().unwrap();
        assert_eq!(amy.get("Name"), Some("Amy"));

        repository
            .update_by_email("amy@x.com", &GuestRecord::new().with("Address", "Bolton"))
            .unwrap();
        repository.delete_by_email("amy@x.com").unwrap();
        assert_eq!(
            repository.store().calls,
            vec![Call::UpdateCell(2, 3, "Bolton".to_string()), Call::DeleteRow(2)]
        );

        let ann = repository.find_by_email("amy@x.com").unwrap().unwrap();
        assert_eq!(ann.get("Name"), Some("Ann"));
    }

    #[test]
    fn list_all_includes_header() {
        let repository = amy_repository();
        assert_eq!(
            repository.list_all().unwrap(),
            vec![
                row(&["Name", "Phone", "Address", "Email"]),
                row(&["Amy", "+447000000000", "Leeds", "amy@x.com"]),
            ]
        );
    }

    #[test]
    fn ensure_header_creates_or_checks() {
        let schema = Schema::variant(SchemaVariant::Minimal);
        let mut repository = Repository::new(RecordingStore::default(), schema.clone());
        repository.ensure_header().unwrap();
        repository.ensure_header().unwrap();
        assert_eq!(repository.store().calls, vec![Call::Append(schema.names())]);

        let mut repository = Repository::new(MemoryStore::with_header(&["Name", "Email Address"]), schema);
        assert!(matches!(
            repository.ensure_header(),
            Err(RepositoryError::SchemaMismatch(SchemaError::HeaderMismatch { .. }))
        ));
        assert_eq!(repository.store().rows()[0], row(&["Name", "Email Address"]));
    }

    #[test]
    fn rekey_moves_record() {
        let mut repository = repository_with(3);
        repository.rekey("guest0@x.com", "first@x.com").unwrap();

        assert_eq!(repository.find_by_email("guest0@x.com").unwrap(), None);
        let moved = repository.find_by_email("first@x.com").unwrap().unwrap();
        assert_eq!(moved, guest("GuestA", "first@x.com"));
        assert_eq!(
            repository.store().calls,
            vec![
                Call::Append(guest("GuestA", "first@x.com").to_row(repository.schema())),
                Call::DeleteRow(2),
            ]
        );
        assert_eq!(repository.store().inner.row_count(), 4);
    }

    #[test]
    fn rekey_rejections() {
        let mut repository = repository_with(2);
        assert_eq!(
            repository.rekey("guest0@x.com", "guest1@x.com"),
            Err(RepositoryError::DuplicateKey("guest1@x.com".to_string()))
        );
        assert_eq!(
            repository.rekey("nobody@x.com", "new@x.com"),
            Err(RepositoryError::NotFound("nobody@x.com".to_string()))
        );
        assert!(matches!(
            repository.rekey("guest0@x.com", "not-an-email"),
            Err(RepositoryError::ValidationFailed { .. })
        ));
        repository.rekey("guest0@x.com", "guest0@x.com").unwrap();
        assert!(repository.store().calls.is_empty());
    }

    #[test]
    fn works_through_mutable_reference() {
        let mut store = MemoryStore::with_header(&Schema::variant(SchemaVariant::Full).names());
        {
            let mut repository = Repository::new(&mut store, Schema::variant(SchemaVariant::Full));
            repository.add(&guest("Amy", "amy@x.com")).unwrap();
        }
        assert_eq!(store.row_count(), 2);
    }

    #[test]
    fn row_index_offsets_header() {
        assert_eq!(row_index(0), 2);
        assert_eq!(row_index(7), 9);
    }
}
