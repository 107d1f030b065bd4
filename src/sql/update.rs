//! Partial-update SET clause construction

use std::collections::HashMap;

use crate::error::{Result, StoreError};
use crate::sql::fragment::SqlFragment;
use crate::sql::sanitize::quote_identifier;
use crate::table::TableDefinition;
use crate::types::SqlValue;

/// Logical field name to physical column name translation.
///
/// Only fields whose names differ need an entry; anything else resolves
/// to itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldNameMap {
    names: HashMap<String, String>,
}

impl FieldNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation from `field` to `column`
    pub fn map(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.names.insert(field.into(), column.into());
        self
    }

    /// Physical column for a logical field
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.names.get(field).map(String::as_str).unwrap_or(field)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Fields to change, in the order their placeholders are assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRequest {
    fields: Vec<(String, SqlValue)>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Setting the same field twice keeps its original
    /// position and replaces the value.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    /// Build an update from a JSON object payload, checking every field
    /// against the table's columns.
    pub fn from_json(payload: &serde_json::Value, table: &TableDefinition) -> Result<Self> {
        let object = payload
            .as_object()
            .ok_or_else(|| StoreError::validation("Update data must be a JSON object"))?;

        let mut update = Self::new();
        for (field, value) in object {
            let column = table.column_by_field(field).ok_or_else(|| {
                StoreError::validation(format!(
                    "Unknown field '{}' for {}",
                    field,
                    table.entity_name()
                ))
            })?;

            if !column.updatable {
                return Err(StoreError::validation(format!(
                    "Field '{}' cannot be updated",
                    field
                )));
            }
            if !column.nullable && value.is_null() {
                return Err(StoreError::validation(format!(
                    "Field '{}' does not allow NULL values",
                    field
                )));
            }

            let sql_value = column.column_type.to_sql_value(value).map_err(|e| {
                StoreError::validation(format!("Invalid value for field '{}': {}", field, e))
            })?;
            update = update.set(field.clone(), sql_value);
        }

        Ok(update)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Build the SET list for a partial update.
///
/// `{salary: 1000, companyHandle: "c1"}` with `companyHandle ->
/// company_handle` gives `"salary"=$1, "company_handle"=$2` and the two
/// values in that order. An empty request is a usage error: an empty SET
/// list must never reach the database.
pub fn sql_for_partial_update(update: &UpdateRequest, names: &FieldNameMap) -> Result<SqlFragment> {
    if update.is_empty() {
        return Err(StoreError::usage("No data supplied for update"));
    }

    let mut columns = Vec::with_capacity(update.len());
    let mut params = Vec::with_capacity(update.len());

    for (idx, (field, value)) in update.fields().enumerate() {
        columns.push(format!(
            "{}=${}",
            quote_identifier(names.resolve(field)),
            idx + 1
        ));
        params.push(value.clone());
    }

    Ok(SqlFragment::new(columns.join(", "), params))
}
