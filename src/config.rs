//! Settings for a guest sheet deployment, read from TOML.
use crate::guest::schema::Schema;
use crate::guest::schema::SchemaVariant;
use crate::guest::validate::Validator;
use crate::guest::validate::DEFAULT_ROOM_CLASSES;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors related to loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Read settings file failed: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid settings: room_classes must not be empty")]
    NoRoomClasses,
}

/// Which spreadsheet and worksheet hold the bookings, and how they are shaped.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Spreadsheet (workbook) name
    pub spreadsheet: String,
    /// Worksheet (tab) holding the booking records
    pub worksheet: String,
    pub schema: SchemaVariant,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Accepted values for the Room Class field
    pub room_classes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            spreadsheet: "hotel-app".to_string(),
            worksheet: "booking-record".to_string(),
            schema: SchemaVariant::default(),
            log_filter: "guest_sheet=info".to_string(),
            room_classes: DEFAULT_ROOM_CLASSES.iter().map(|class| class.to_string()).collect(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        if settings.room_classes.is_empty() {
            return Err(ConfigError::NoRoomClasses);
        }
        Ok(settings)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Settings::from_toml_str(&text)
    }

    pub fn schema(&self) -> Schema {
        Schema::variant(self.schema)
    }

    pub fn validator(&self) -> Validator {
        Validator::with_room_classes(self.room_classes.iter().cloned())
    }
}
