//! # jobly-store
//!
//! Job and company records on PostgreSQL, built around two parameterized SQL
//! builders:
//!
//! - **Partial updates**: [`sql_for_partial_update`] turns a sparse set of
//!   field/value pairs into a `SET` list with `$1..$n` placeholders.
//! - **Filtered reads**: [`sql_where_from_filters`] turns caller-supplied
//!   filter parameters into a `WHERE` clause, binding every compared value.
//!
//! [`RecordStore`] composes them with fixed `INSERT`/`SELECT`/`UPDATE`/`DELETE`
//! templates and maps empty results to `NotFound` and natural-key duplicates
//! to `Conflict`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobly_store::{FilterRequest, NewJob, RecordStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::builder("postgres://localhost/jobly").build();
//!     let store = RecordStore::connect(config).await?;
//!
//!     store
//!         .jobs()
//!         .create(NewJob::new("Engineer", "c2").salary(75000))
//!         .await?;
//!
//!     let jobs = store
//!         .jobs()
//!         .find(&FilterRequest::new().filter("title", "eng").filter("minSalary", 50000))
//!         .await?;
//!
//!     store
//!         .jobs()
//!         .update("Engineer", &serde_json::json!({"salary": 80000}))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Building Fragments Directly
//!
//! ```rust
//! use jobly_store::{FieldNameMap, UpdateRequest, sql_for_partial_update};
//!
//! let update = UpdateRequest::new().set("salary", 60000).set("companyHandle", "c1");
//! let names = FieldNameMap::new().map("companyHandle", "company_handle");
//!
//! let fragment = sql_for_partial_update(&update, &names).unwrap();
//! assert_eq!(fragment.clause(), "\"salary\"=$1, \"company_handle\"=$2");
//! assert_eq!(fragment.params().len(), 2);
//! ```

pub mod company;
pub mod config;
pub mod error;
pub mod job;
pub mod sql;
pub mod store;
pub mod table;
pub mod types;

pub use company::{Companies, Company, CompanyDetail, NewCompany};
pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{Result, StoreError};
pub use job::{Job, Jobs, NewJob};
pub use sql::{
    FieldNameMap, FilterKind, FilterRequest, FilterRule, FilterSpec, SqlFragment, UpdateRequest,
    quote_identifier, sql_for_partial_update, sql_where_from_filters, validate_identifier,
};
pub use store::{Record, RecordStore};
pub use table::TableDefinition;
pub use types::{ColumnDefinition, ColumnType, SqlValue};
