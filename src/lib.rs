//! # Guest Sheet
//!
//! A record store for hotel guest bookings kept in a single spreadsheet
//! worksheet: one header row naming the fields, one row per booking, with the
//! guest's email address as the key.
//!
//! ## Features
//!
//! - **Field validation**: name, phone, address, email, room class, room
//!   number and amount paid are checked before anything is written
//! - **Two worksheet layouts**: the minimal four-column sheet and the full
//!   seven-column booking sheet
//! - **Key-based operations**: add, find, update, delete and rekey by email,
//!   translated to 1-based row and column positions on every call
//! - **Pluggable storage**: anything implementing [`TabularStore`]; an
//!   in-memory worksheet is included and can be seeded from an `.xlsx` export
//!
//! ## Example
//!
//! ```
//! use guest_sheet::{GuestRecord, MemoryStore, Repository, Schema, SchemaVariant};
//!
//! let mut repository = Repository::new(MemoryStore::new(), Schema::variant(SchemaVariant::Minimal));
//! repository.ensure_header().unwrap();
//! repository
//!     .add(
//!         &GuestRecord::new()
//!             .with("Name", "Amy")
//!             .with("Phone Number", "+447000000000")
//!             .with("Address", "Leeds")
//!             .with("Email Address", "amy@x.com"),
//!     )
//!     .unwrap();
//! repository
//!     .update_by_email("amy@x.com", &GuestRecord::new().with("Address", "Bolton"))
//!     .unwrap();
//! let amy = repository.find_by_email("amy@x.com").unwrap().unwrap();
//! assert_eq!(amy.get("Address"), Some("Bolton"));
//! ```
pub mod config;
pub mod error;
pub mod guest;
pub mod logging;
pub mod spreadsheet;
pub mod store;

mod helpers;

pub use config::Settings;
pub use error::GuestSheetError;
pub use guest::Field;
pub use guest::GuestRecord;
pub use guest::Repository;
pub use guest::RepositoryError;
pub use guest::Schema;
pub use guest::SchemaVariant;
pub use guest::Validator;
pub use store::MemoryStore;
pub use store::StoreError;
pub use store::TabularStore;
