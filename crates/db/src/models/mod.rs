//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity is editable

pub mod family;
pub mod payment;
pub mod principal;
pub mod short_url;
pub mod table;
pub mod template;
pub mod theme;
pub mod tracking;
pub mod wedding;
