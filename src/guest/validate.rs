//! Field validators for guest booking input.
//!
//! Every `is_valid_*` function is a pure predicate over the raw text a user
//! typed. [`Validator`] wraps them with a user-facing reason per field and is
//! what the repository consults before it writes anything.
use crate::guest::schema::Field;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{1,14}$").expect("Hardcode regex pattern"));

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$").expect("Hardcode regex pattern")
});

/// Room classes accepted when no other list is configured.
pub const DEFAULT_ROOM_CLASSES: [&str; 3] = ["Single", "Double", "Suite"];

/// A field value rejected by validation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

/// Name: non-empty, each whitespace-separated part made of letters or hyphens.
pub fn is_valid_name(value: &str) -> bool {
    !value.trim().is_empty()
        && value
            .split_whitespace()
            .all(|part| part.chars().all(|char| char.is_alphabetic() || char == '-'))
}

/// Phone: optional `+`, a leading digit 1-9, then 1 to 14 more digits.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

/// Address: anything but blank.
pub fn is_valid_address(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Room class: case-insensitive member of [`DEFAULT_ROOM_CLASSES`].
pub fn is_valid_room_class(value: &str) -> bool {
    contains_room_class(&DEFAULT_ROOM_CLASSES, value)
}

/// Room number: digits only, strictly greater than zero.
pub fn is_valid_room_number(value: &str) -> bool {
    // Checked on the digits themselves so long numbers cannot overflow
    !value.is_empty()
        && value.chars().all(|char| char.is_ascii_digit())
        && value.chars().any(|char| char != '0')
}

/// Amount paid: a finite number, zero or more.
pub fn is_valid_amount_paid(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .map(|amount| amount.is_finite() && amount >= 0.0)
        .unwrap_or(false)
}

fn contains_room_class<S: AsRef<str>>(classes: &[S], value: &str) -> bool {
    let value = value.to_lowercase();
    classes
        .iter()
        .any(|class| class.as_ref().to_lowercase() == value)
}

/// Checks field values and explains rejections.
#[derive(Clone, Debug)]
pub struct Validator {
    room_classes: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_room_classes(DEFAULT_ROOM_CLASSES)
    }

    /// Creates a validator accepting a different set of room classes.
    pub fn with_room_classes<I, S>(room_classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator {
            room_classes: room_classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn room_classes(&self) -> &[String] {
        &self.room_classes
    }

    /// Returns true if `value` is acceptable for `field`.
    pub fn accepts(&self, field: Field, value: &str) -> bool {
        match field {
            Field::Name => is_valid_name(value),
            Field::PhoneNumber => is_valid_phone(value),
            Field::Address => is_valid_address(value),
            Field::EmailAddress => is_valid_email(value),
            Field::RoomClass => contains_room_class(&self.room_classes, value),
            Field::RoomNumber => is_valid_room_number(value),
            Field::AmountPaid => is_valid_amount_paid(value),
        }
    }

    /// Validates `value` for `field`, giving a reason the caller can show when re-prompting.
    pub fn check(&self, field: Field, value: &str) -> Result<(), ValidationError> {
        if self.accepts(field, value) {
            return Ok(());
        }
        let reason = if value.trim().is_empty() {
            "a value is required".to_string()
        } else {
            match field {
                Field::Name => "use letters, hyphens and spaces only".to_string(),
                Field::PhoneNumber => {
                    "expected 2 to 15 digits, optionally prefixed by '+', not starting with 0".to_string()
                }
                Field::Address => "a value is required".to_string(),
                Field::EmailAddress => "expected an address like name@example.com".to_string(),
                Field::RoomClass => format!("expected one of {}", self.room_classes.join(", ")),
                Field::RoomNumber => "expected a whole number greater than zero".to_string(),
                Field::AmountPaid => "expected a number of zero or more".to_string(),
            }
        };
        Err(ValidationError { field, reason })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Validator::new()
    }
}
