//! RecordStore - table-driven record access on PostgreSQL
//!
//! Composes the SQL builders with fixed statement templates and executes
//! them. Records are JSON objects keyed by logical field names; the typed
//! [`Jobs`](crate::job::Jobs) and [`Companies`](crate::company::Companies)
//! managers sit on top of these generic operations.

use serde::de::DeserializeOwned;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{PgPool, Postgres, Row};

use crate::company::Companies;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::job::Jobs;
use crate::sql::filter::{FilterRequest, sql_where_from_filters};
use crate::sql::sanitize::{quote_identifier, validate_identifier};
use crate::sql::update::{UpdateRequest, sql_for_partial_update};
use crate::table::TableDefinition;
use crate::types::{ColumnType, SqlValue};

/// A stored record keyed by logical field name
pub type Record = serde_json::Map<String, serde_json::Value>;

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Record store over the jobs and companies tables
pub struct RecordStore {
    pool: PgPool,
    config: StoreConfig,
    jobs: TableDefinition,
    companies: TableDefinition,
}

impl RecordStore {
    /// Connect to the database named in the configuration
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        let pool = PgPool::connect(&config.database_url).await.map_err(|e| {
            StoreError::Connection(format!("Database connection failed: {}", e))
        })?;

        Self::from_pool(pool, config)
    }

    /// Create a RecordStore from an existing pool.
    ///
    /// The tables are expected to exist already; this crate never creates
    /// or migrates them.
    pub fn from_pool(pool: PgPool, config: StoreConfig) -> Result<Self> {
        for name in [&config.jobs_table, &config.companies_table] {
            validate_identifier(name).map_err(StoreError::validation)?;
        }

        let jobs = TableDefinition::jobs(&config);
        let companies = TableDefinition::companies(&config);

        Ok(Self {
            pool,
            config,
            jobs,
            companies,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn job_table(&self) -> &TableDefinition {
        &self.jobs
    }

    pub fn company_table(&self) -> &TableDefinition {
        &self.companies
    }

    pub fn jobs(&self) -> Jobs<'_> {
        Jobs::new(self)
    }

    pub fn companies(&self) -> Companies<'_> {
        Companies::new(self)
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Insert a record, failing with `Conflict` if its natural key is taken.
    ///
    /// The pre-check catches the common case; a concurrent insert that slips
    /// past it is caught by the unique index and reported the same way.
    pub async fn insert(
        &self,
        table: &TableDefinition,
        properties: &serde_json::Value,
    ) -> Result<Record> {
        let properties_obj = properties
            .as_object()
            .ok_or_else(|| StoreError::validation("Record data must be a JSON object"))?;

        if let Some(field) = properties_obj
            .keys()
            .find(|field| table.column_by_field(field).is_none())
        {
            return Err(StoreError::validation(format!(
                "Unknown field '{}' for {}",
                field,
                table.entity_name()
            )));
        }

        let mut column_names = Vec::with_capacity(table.columns.len());
        let mut placeholders = Vec::with_capacity(table.columns.len());
        let mut values = Vec::with_capacity(table.columns.len());

        for col in &table.columns {
            let value = properties_obj
                .get(&col.field)
                .unwrap_or(&serde_json::Value::Null);

            if !col.nullable && value.is_null() {
                return Err(StoreError::validation(format!(
                    "Required field '{}' is missing",
                    col.field
                )));
            }

            let sql_value = col.column_type.to_sql_value(value).map_err(|e| {
                StoreError::validation(format!("Invalid value for field '{}': {}", col.field, e))
            })?;

            column_names.push(quote_identifier(&col.name));
            placeholders.push(format!("${}", values.len() + 1));
            values.push(sql_value);
        }

        let key_values = natural_key_values(table, &values);
        let duplicate = format!(
            "Duplicate {}: {}",
            table.entity_name(),
            key_values
                .iter()
                .map(|v| match v {
                    SqlValue::Text(Some(s)) => s.clone(),
                    other => format!("{:?}", other),
                })
                .collect::<Vec<_>>()
                .join(" at ")
        );

        if self.natural_key_exists(table, &key_values).await? {
            return Err(StoreError::conflict(duplicate));
        }

        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quote_identifier(&table.table_name),
            column_names.join(", "),
            placeholders.join(", "),
            select_list(table)
        );

        tracing::debug!(table = %table.table_name, params = values.len(), "inserting record");

        let row = bind_all(sqlx::query(&insert_sql), &values)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = StoreError::from_insert_error(e, duplicate.clone());
                if err.is_conflict() {
                    tracing::warn!(
                        table = %table.table_name,
                        "concurrent insert hit the unique index"
                    );
                }
                err
            })?;

        let record = row_to_record(&row, table)?;
        tracing::info!(table = %table.table_name, "created {}", table.entity_name());

        Ok(record)
    }

    /// List records matching `filters`.
    ///
    /// An empty result is `NotFound`, even with no filters at all.
    pub async fn find(
        &self,
        table: &TableDefinition,
        filters: &FilterRequest,
    ) -> Result<Vec<Record>> {
        let where_fragment = sql_where_from_filters(filters, &table.filters)?;

        let mut select_sql = format!(
            "SELECT {} FROM {}",
            select_list(table),
            quote_identifier(&table.table_name)
        );
        if !where_fragment.is_empty() {
            select_sql.push(' ');
            select_sql.push_str(where_fragment.clause());
        }
        select_sql.push_str(&format!(" ORDER BY {}", quote_identifier(&table.order_by)));

        tracing::debug!(
            table = %table.table_name,
            params = where_fragment.params().len(),
            "listing records"
        );

        let rows = bind_all(sqlx::query(&select_sql), where_fragment.params())
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(StoreError::not_found(format!(
                "No {} records match the given filters",
                table.entity_name()
            )));
        }

        rows.iter().map(|row| row_to_record(row, table)).collect()
    }

    /// Fetch the record addressed by `key`.
    ///
    /// When several records share the key (jobs with the same title at
    /// different companies), the first in listing order is returned.
    pub async fn get(&self, table: &TableDefinition, key: &str) -> Result<Record> {
        let select_sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY {} LIMIT 1",
            select_list(table),
            quote_identifier(&table.table_name),
            quote_identifier(&table.lookup_key),
            quote_identifier(&table.order_by)
        );

        tracing::debug!(table = %table.table_name, "fetching record");

        let row = sqlx::query(&select_sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(table, key))?;

        row_to_record(&row, table)
    }

    /// All records whose `column` equals `value`; may be empty.
    pub async fn find_by(
        &self,
        table: &TableDefinition,
        column: &str,
        value: &str,
    ) -> Result<Vec<Record>> {
        let select_sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY {}",
            select_list(table),
            quote_identifier(&table.table_name),
            quote_identifier(column),
            quote_identifier(&table.order_by)
        );

        tracing::debug!(table = %table.table_name, column, "listing related records");

        let rows = sqlx::query(&select_sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| row_to_record(row, table)).collect()
    }

    /// Apply a partial update to the record addressed by `key`.
    ///
    /// The key is bound after the SET values, at placeholder N + 1. An
    /// empty update fails with `Usage` before any statement is issued.
    ///
    /// Every record sharing the key is updated; the first of them in listing
    /// order is returned.
    pub async fn update(
        &self,
        table: &TableDefinition,
        key: &str,
        update: &UpdateRequest,
    ) -> Result<Record> {
        let set_fragment = sql_for_partial_update(update, &table.field_names())?;

        let update_sql = format!(
            "WITH updated AS (UPDATE {} SET {} WHERE {} = ${} RETURNING {}) \
             SELECT {} FROM updated ORDER BY {} LIMIT 1",
            quote_identifier(&table.table_name),
            set_fragment.clause(),
            quote_identifier(&table.lookup_key),
            set_fragment.next_placeholder(),
            returning_list(table),
            select_list(table),
            quote_identifier(&table.order_by)
        );

        tracing::debug!(
            table = %table.table_name,
            params = set_fragment.params().len() + 1,
            "updating record"
        );

        let row = bind_all(sqlx::query(&update_sql), set_fragment.params())
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(table, key))?;

        row_to_record(&row, table)
    }

    /// Delete the record addressed by `key`
    pub async fn remove(&self, table: &TableDefinition, key: &str) -> Result<()> {
        let delete_sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            quote_identifier(&table.table_name),
            quote_identifier(&table.lookup_key)
        );

        tracing::debug!(table = %table.table_name, "deleting record");

        let result = sqlx::query(&delete_sql)
            .bind(key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(table, key));
        }

        tracing::info!(table = %table.table_name, "removed {}", table.entity_name());
        Ok(())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    async fn natural_key_exists(
        &self,
        table: &TableDefinition,
        key_values: &[SqlValue],
    ) -> Result<bool> {
        let conditions: Vec<String> = table
            .natural_key
            .iter()
            .enumerate()
            .map(|(idx, col)| format!("{} = ${}", quote_identifier(col), idx + 1))
            .collect();

        let check_sql = format!(
            "SELECT 1 FROM {} WHERE {}",
            quote_identifier(&table.table_name),
            conditions.join(" AND ")
        );

        tracing::debug!(table = %table.table_name, "checking natural key");

        let existing = bind_all(sqlx::query(&check_sql), key_values)
            .fetch_optional(&self.pool)
            .await?;

        Ok(existing.is_some())
    }
}

/// Values of the natural key columns, picked out of a full column-ordered row
fn natural_key_values(table: &TableDefinition, values: &[SqlValue]) -> Vec<SqlValue> {
    table
        .natural_key
        .iter()
        .filter_map(|key| table.columns.iter().position(|c| c.name == *key))
        .filter_map(|idx| values.get(idx).cloned())
        .collect()
}

fn not_found(table: &TableDefinition, key: &str) -> StoreError {
    StoreError::not_found(format!("No {}: {}", table.entity_name(), key))
}

fn select_list(table: &TableDefinition) -> String {
    table
        .columns
        .iter()
        .map(|c| quote_identifier(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Select list plus the ordering column when it is not already selected
fn returning_list(table: &TableDefinition) -> String {
    let mut list = select_list(table);
    if table.columns.iter().all(|c| c.name != table.order_by) {
        list.push_str(", ");
        list.push_str(&quote_identifier(&table.order_by));
    }
    list
}

fn bind_value<'q>(query: PgQuery<'q>, value: &SqlValue) -> PgQuery<'q> {
    match value {
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Integer(v) => query.bind(*v),
        SqlValue::Decimal(v) => query.bind(*v),
    }
}

fn bind_all<'q>(query: PgQuery<'q>, values: &[SqlValue]) -> PgQuery<'q> {
    values.iter().fold(query, bind_value)
}

fn row_to_record(row: &PgRow, table: &TableDefinition) -> Result<Record> {
    let mut record = Record::new();

    for col in &table.columns {
        let name = col.name.as_str();
        let value = match col.column_type {
            ColumnType::Text => row
                .try_get::<Option<String>, _>(name)?
                .map(serde_json::Value::String),
            ColumnType::Integer => row
                .try_get::<Option<i32>, _>(name)?
                .map(serde_json::Value::from),
            // NUMERIC is returned as its decimal string
            ColumnType::Decimal => row
                .try_get::<Option<rust_decimal::Decimal>, _>(name)?
                .map(|d| serde_json::Value::String(d.to_string())),
        };
        record.insert(col.field.clone(), value.unwrap_or(serde_json::Value::Null));
    }

    Ok(record)
}

/// Deserialize a stored record into one of the typed record structs
pub(crate) fn into_typed<T: DeserializeOwned>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(record))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StoreConfig {
        StoreConfig::builder("postgres://localhost/jobly").build()
    }

    #[test]
    fn test_select_list_uses_physical_names() {
        let table = TableDefinition::jobs(&test_config());
        assert_eq!(
            select_list(&table),
            "\"title\", \"salary\", \"equity\", \"company_handle\""
        );
    }

    #[test]
    fn test_returning_list_adds_ordering_column_once() {
        let jobs = TableDefinition::jobs(&test_config());
        assert_eq!(
            returning_list(&jobs),
            "\"title\", \"salary\", \"equity\", \"company_handle\", \"id\""
        );

        let companies = TableDefinition::companies(&test_config());
        assert_eq!(returning_list(&companies), select_list(&companies));
    }

    #[test]
    fn test_not_found_message() {
        let table = TableDefinition::jobs(&test_config());
        let err = not_found(&table, "Farmer");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: No job: Farmer");
    }

    #[test]
    fn test_into_typed_maps_decimal_string() {
        let mut record = Record::new();
        record.insert("title".into(), "Farmer".into());
        record.insert("salary".into(), serde_json::Value::Null);
        record.insert("equity".into(), "0.5".into());
        record.insert("companyHandle".into(), "c1".into());

        let job: crate::job::Job = into_typed(record).unwrap();
        assert_eq!(job.title, "Farmer");
        assert_eq!(job.salary, None);
        assert_eq!(job.equity, Some(rust_decimal::Decimal::new(5, 1)));
        assert_eq!(job.company_handle, "c1");
    }
}
