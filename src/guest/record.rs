use crate::guest::schema::Schema;

/// One guest booking entry: field names mapped to their text values.
///
/// Fields keep the order they were first set in. Two records are equal when
/// they hold the same names with the same values, whatever the order.
#[derive(Clone, Debug, Default)]
pub struct GuestRecord {
    fields: Vec<(String, String)>,
}

impl GuestRecord {
    pub fn new() -> Self {
        GuestRecord { fields: Vec::new() }
    }

    /// Builder form of [`GuestRecord::set`].
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut record = GuestRecord::new();
        for (name, value) in pairs {
            record.set(name.as_ref(), value.as_ref());
        }
        record
    }

    /// Zips a header row with a data row.
    /// Cells missing at the end of a short row read as empty strings.
    pub fn from_row<H: AsRef<str>, C: AsRef<str>>(header: &[H], row: &[C]) -> Self {
        let mut record = GuestRecord::new();
        for (index, name) in header.iter().enumerate() {
            let value = row.get(index).map(|cell| cell.as_ref()).unwrap_or("");
            record.set(name.as_ref(), value);
        }
        record
    }

    /// Values in schema column order, empty where a field is unset.
    pub fn to_row(&self, schema: &Schema) -> Vec<String> {
        schema
            .columns()
            .iter()
            .map(|column| self.get(&column.name).unwrap_or("").to_string())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// The key value under the schema's Email Address column.
    pub fn email(&self, schema: &Schema) -> Option<&str> {
        self.get(&schema.key().name)
    }

    /// Sets a field, replacing the value in place if already present.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, current)) => *current = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for GuestRecord {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, value)| other.get(name) == Some(value.as_str()))
    }
}

impl Eq for GuestRecord {}
