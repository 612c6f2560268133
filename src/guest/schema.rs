use serde::Deserialize;
use std::fmt::Display;
use std::fmt::Formatter;
use thiserror::Error;

/// Errors related to schema construction and header checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown field name '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' appears more than once")]
    DuplicateField(String),

    #[error("Schema has no Email Address column")]
    MissingKey,

    #[error("Header row {found:?} does not match schema {expected:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Store has no header row")]
    MissingHeader,
}

/// Canonical guest booking fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    PhoneNumber,
    Address,
    /// The unique key of every record
    EmailAddress,
    RoomClass,
    RoomNumber,
    AmountPaid,
}

impl Field {
    /// Returns the header text used for this field in the worksheet.
    pub const fn name(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::PhoneNumber => "Phone Number",
            Field::Address => "Address",
            Field::EmailAddress => "Email Address",
            Field::RoomClass => "Room Class",
            Field::RoomNumber => "Room Number",
            Field::AmountPaid => "Amount Paid",
        }
    }

    /// Maps header text back to a field.
    /// Accepts the short forms older worksheets were created with.
    pub fn parse(name: &str) -> Result<Self, SchemaError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "NAME" => Ok(Field::Name),
            "PHONE" | "PHONE NUMBER" => Ok(Field::PhoneNumber),
            "ADDRESS" => Ok(Field::Address),
            "EMAIL" | "EMAIL ADDRESS" => Ok(Field::EmailAddress),
            "ROOM CLASS" => Ok(Field::RoomClass),
            "ROOM NUMBER" => Ok(Field::RoomNumber),
            "AMOUNT PAID" => Ok(Field::AmountPaid),
            _ => Err(SchemaError::UnknownField(name.to_string())),
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which set of columns a booking worksheet carries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// Name, Phone Number, Address, Email Address
    Minimal,
    /// Minimal plus Room Class, Room Number, Amount Paid
    #[default]
    Full,
}

impl SchemaVariant {
    pub const fn fields(&self) -> &'static [Field] {
        match self {
            SchemaVariant::Minimal => &[
                Field::Name,
                Field::PhoneNumber,
                Field::Address,
                Field::EmailAddress,
            ],
            SchemaVariant::Full => &[
                Field::Name,
                Field::PhoneNumber,
                Field::Address,
                Field::EmailAddress,
                Field::RoomClass,
                Field::RoomNumber,
                Field::AmountPaid,
            ],
        }
    }
}

/// A named column of the worksheet and the field it holds.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Header text, exactly as it appears in row 1
    pub name: String,
    pub field: Field,
}

/// Ordered list of columns defining the header row and the record shape.
///
/// Column positions are never cached here: [`Schema::column_index`] is always
/// asked against the header row read by the current operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
    key: usize,
}

impl Schema {
    /// Builds the schema for one of the canonical variants.
    pub fn variant(variant: SchemaVariant) -> Self {
        let columns: Vec<Column> = variant
            .fields()
            .iter()
            .map(|field| Column {
                name: field.name().to_string(),
                field: *field,
            })
            .collect();
        let key = columns
            .iter()
            .position(|column| column.field == Field::EmailAddress)
            .unwrap_or_default();
        Schema { columns, key }
    }

    /// Builds a schema from the header names of an existing worksheet.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, SchemaError> {
        let mut columns = Vec::<Column>::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let field = Field::parse(name)?;
            if columns.iter().any(|column| column.field == field) {
                Err(SchemaError::DuplicateField(name.to_string()))?;
            }
            columns.push(Column {
                name: name.to_string(),
                field,
            });
        }
        let key = columns
            .iter()
            .position(|column| column.field == Field::EmailAddress)
            .ok_or(SchemaError::MissingKey)?;
        Ok(Schema { columns, key })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Header names in column order.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.to_owned()).collect()
    }

    /// The Email Address column.
    pub fn key(&self) -> &Column {
        &self.columns[self.key]
    }

    /// Finds the schema column with the given header name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Returns `1 + position` of `name` within `header`, or None if absent.
    pub fn column_index<S: AsRef<str>>(header: &[S], name: &str) -> Option<usize> {
        header
            .iter()
            .position(|cell| cell.as_ref() == name)
            .map(|position| position + 1)
    }

    /// Verifies that a header row lists exactly the schema names in order.
    pub fn check_header<S: AsRef<str>>(&self, header: &[S]) -> Result<(), SchemaError> {
        let matches = header.len() == self.columns.len()
            && header
                .iter()
                .zip(&self.columns)
                .all(|(cell, column)| cell.as_ref() == column.name);
        if matches {
            Ok(())
        } else {
            Err(SchemaError::HeaderMismatch {
                expected: self.names(),
                found: header.iter().map(|cell| cell.as_ref().to_string()).collect(),
            })
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::variant(SchemaVariant::default())
    }
}
