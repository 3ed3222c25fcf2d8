//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and the `Deserialize` DTO used for inserts.

pub mod history;
pub mod user;
