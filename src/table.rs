//! Table definitions for the record types
//!
//! A [`TableDefinition`] carries everything the generic record operations
//! need to know about one table: its typed columns, the natural key checked
//! on create, the lookup key used by get/update/delete, the listing order,
//! and the filters it accepts.

use crate::config::StoreConfig;
use crate::sql::filter::FilterSpec;
use crate::sql::update::FieldNameMap;
use crate::types::{ColumnDefinition, ColumnType};

#[derive(Debug, Clone)]
pub struct TableDefinition {
    /// Physical table name
    pub table_name: String,
    /// Singular name used in error messages ("job", "company")
    entity: &'static str,
    pub columns: Vec<ColumnDefinition>,
    /// Columns that together identify a record; duplicates are conflicts
    pub natural_key: Vec<String>,
    /// Column used to address a single record
    pub lookup_key: String,
    /// Column listings are ordered by
    pub order_by: String,
    pub filters: FilterSpec,
}

impl TableDefinition {
    /// Jobs: `title` + `company_handle` identify a job; updates and deletes
    /// address jobs by title.
    pub fn jobs(config: &StoreConfig) -> Self {
        Self {
            table_name: config.jobs_table.clone(),
            entity: "job",
            columns: vec![
                ColumnDefinition::new("title", ColumnType::Text)
                    .not_null()
                    .immutable(),
                ColumnDefinition::new("salary", ColumnType::Integer),
                ColumnDefinition::new("equity", ColumnType::Decimal),
                ColumnDefinition::new("company_handle", ColumnType::Text)
                    .field("companyHandle")
                    .not_null(),
            ],
            natural_key: vec!["title".to_string(), "company_handle".to_string()],
            lookup_key: "title".to_string(),
            order_by: "id".to_string(),
            filters: FilterSpec::new()
                .contains("title", "title")
                .min("minSalary", "salary", ColumnType::Integer)
                .max("maxSalary", "salary", ColumnType::Integer)
                .positive("hasEquity", "equity"),
        }
    }

    pub fn companies(config: &StoreConfig) -> Self {
        Self {
            table_name: config.companies_table.clone(),
            entity: "company",
            columns: vec![
                ColumnDefinition::new("handle", ColumnType::Text)
                    .not_null()
                    .immutable(),
                ColumnDefinition::new("name", ColumnType::Text).not_null(),
                ColumnDefinition::new("description", ColumnType::Text),
                ColumnDefinition::new("num_employees", ColumnType::Integer).field("numEmployees"),
                ColumnDefinition::new("logo_url", ColumnType::Text).field("logoUrl"),
            ],
            natural_key: vec!["handle".to_string()],
            lookup_key: "handle".to_string(),
            order_by: "name".to_string(),
            filters: FilterSpec::new()
                .contains("name", "name")
                .min("minEmployees", "num_employees", ColumnType::Integer)
                .max("maxEmployees", "num_employees", ColumnType::Integer),
        }
    }

    pub fn entity_name(&self) -> &'static str {
        self.entity
    }

    /// Column exposed under the logical name `field`
    pub fn column_by_field(&self, field: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Translations for every column whose logical and physical names differ
    pub fn field_names(&self) -> FieldNameMap {
        self.columns
            .iter()
            .filter(|c| c.field != c.name)
            .fold(FieldNameMap::new(), |names, c| names.map(&c.field, &c.name))
    }
}
