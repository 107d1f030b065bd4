//! Configuration for RecordStore
//!
//! Provides a builder pattern for configuring the record store.

use crate::error::{Result, StoreError};

/// Default name of the jobs table
pub const DEFAULT_JOBS_TABLE: &str = "jobs";

/// Default name of the companies table
pub const DEFAULT_COMPANIES_TABLE: &str = "companies";

/// Configuration for the record store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL database URL
    pub database_url: String,
    /// Name of the jobs table (default: "jobs")
    pub jobs_table: String,
    /// Name of the companies table (default: "companies")
    pub companies_table: String,
}

impl StoreConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(database_url)
    }

    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL` is required. `JOBLY_JOBS_TABLE` and
    /// `JOBLY_COMPANIES_TABLE` override the table names.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::validation("DATABASE_URL is not set"))?;

        let mut builder = StoreConfigBuilder::new(database_url);
        if let Ok(name) = std::env::var("JOBLY_JOBS_TABLE") {
            builder = builder.jobs_table(name);
        }
        if let Ok(name) = std::env::var("JOBLY_COMPANIES_TABLE") {
            builder = builder.companies_table(name);
        }
        Ok(builder.build())
    }
}

/// Builder for StoreConfig
#[derive(Debug)]
pub struct StoreConfigBuilder {
    database_url: String,
    jobs_table: String,
    companies_table: String,
}

impl StoreConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jobs_table: DEFAULT_JOBS_TABLE.to_string(),
            companies_table: DEFAULT_COMPANIES_TABLE.to_string(),
        }
    }

    /// Set the jobs table name (default: "jobs")
    pub fn jobs_table(mut self, name: impl Into<String>) -> Self {
        self.jobs_table = name.into();
        self
    }

    /// Set the companies table name (default: "companies")
    pub fn companies_table(mut self, name: impl Into<String>) -> Self {
        self.companies_table = name.into();
        self
    }

    pub fn build(self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url,
            jobs_table: self.jobs_table,
            companies_table: self.companies_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::builder("postgres://localhost/jobly").build();

        assert_eq!(config.database_url, "postgres://localhost/jobly");
        assert_eq!(config.jobs_table, "jobs");
        assert_eq!(config.companies_table, "companies");
    }

    #[test]
    fn test_custom_table_names() {
        let config = StoreConfig::builder("postgres://localhost/jobly")
            .jobs_table("t1_jobs")
            .companies_table(String::from("t1_companies"))
            .build();

        assert_eq!(config.jobs_table, "t1_jobs");
        assert_eq!(config.companies_table, "t1_companies");
    }

    #[test]
    fn test_builder_order_independence() {
        let a = StoreConfig::builder("postgres://localhost/jobly")
            .jobs_table("j")
            .companies_table("c")
            .build();
        let b = StoreConfig::builder("postgres://localhost/jobly")
            .companies_table("c")
            .jobs_table("j")
            .build();

        assert_eq!(a.jobs_table, b.jobs_table);
        assert_eq!(a.companies_table, b.companies_table);
    }

    #[test]
    fn test_builder_debug() {
        let builder = StoreConfig::builder("postgres://localhost/jobly");
        assert!(format!("{:?}", builder).contains("StoreConfigBuilder"));
    }
}
