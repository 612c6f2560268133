//! # Guest Records
//!
//! What a valid booking looks like ([`validate`], [`schema`]), how it maps to
//! a worksheet row ([`record`]) and the key-based operations over a store
//! ([`repository`]).
pub mod record;
pub mod repository;
pub mod schema;
pub mod validate;

pub use record::GuestRecord;
pub use repository::Repository;
pub use repository::RepositoryError;
pub use schema::Field;
pub use schema::Schema;
pub use schema::SchemaError;
pub use schema::SchemaVariant;
pub use validate::ValidationError;
pub use validate::Validator;
