//! SQL construction for the record store
//!
//! Builders turn sparse caller input into parameterized fragments; nothing
//! here touches the database.

pub mod filter;
pub mod fragment;
pub mod sanitize;
pub mod update;

pub use filter::{FilterKind, FilterRequest, FilterRule, FilterSpec, sql_where_from_filters};
pub use fragment::SqlFragment;
pub use sanitize::{POSTGRES_RESERVED_WORDS, quote_identifier, validate_identifier};
pub use update::{FieldNameMap, UpdateRequest, sql_for_partial_update};
