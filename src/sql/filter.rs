//! WHERE clause construction from caller-supplied filters
//!
//! Each table declares the filter parameters it understands in a
//! [`FilterSpec`]. Rules are checked in declaration order, so the same
//! filter set always yields the same clause text and placeholder numbering.
//! Parameters no rule names are ignored.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::sql::fragment::SqlFragment;
use crate::sql::sanitize::quote_identifier;
use crate::types::{ColumnType, SqlValue};

/// How a filter parameter constrains its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring match
    Contains,
    /// Inclusive lower bound, value coerced to the column type
    Min(ColumnType),
    /// Inclusive upper bound, value coerced to the column type
    Max(ColumnType),
    /// When the flag is true, only rows where the column is greater than zero
    Positive,
}

/// A recognised filter parameter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    /// Name of the parameter in the request
    pub param: String,
    /// Physical column it constrains
    pub column: String,
    pub kind: FilterKind,
}

/// The ordered set of filter parameters a table understands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    rules: Vec<FilterRule>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(
        mut self,
        param: impl Into<String>,
        column: impl Into<String>,
        kind: FilterKind,
    ) -> Self {
        self.rules.push(FilterRule {
            param: param.into(),
            column: column.into(),
            kind,
        });
        self
    }

    pub fn contains(self, param: impl Into<String>, column: impl Into<String>) -> Self {
        self.rule(param, column, FilterKind::Contains)
    }

    pub fn min(
        self,
        param: impl Into<String>,
        column: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        self.rule(param, column, FilterKind::Min(column_type))
    }

    pub fn max(
        self,
        param: impl Into<String>,
        column: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        self.rule(param, column, FilterKind::Max(column_type))
    }

    pub fn positive(self, param: impl Into<String>, column: impl Into<String>) -> Self {
        self.rule(param, column, FilterKind::Positive)
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }
}

/// Caller-supplied filter parameters, typically deserialized query
/// parameters. Values may be JSON scalars or their string forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterRequest {
    params: serde_json::Map<String, serde_json::Value>,
}

impl FilterRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter parameter
    pub fn filter(mut self, param: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(param.into(), value.into());
        self
    }

    /// Build a request from raw query-string pairs
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), serde_json::Value::String(v.into())))
            .collect();
        Self { params }
    }

    pub fn get(&self, param: &str) -> Option<&serde_json::Value> {
        self.params.get(param)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for FilterRequest {
    fn from(params: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { params }
    }
}

/// Build a WHERE clause for `filters` under `spec`.
///
/// Returns an empty fragment when no recognised parameter applies,
/// otherwise `WHERE <clause> AND <clause> ...` with every compared value
/// bound to a placeholder.
pub fn sql_where_from_filters(filters: &FilterRequest, spec: &FilterSpec) -> Result<SqlFragment> {
    let mut clauses = Vec::new();
    let mut params = Vec::new();
    let mut bounds: Vec<(&FilterRule, SqlValue)> = Vec::new();

    for rule in spec.rules() {
        let Some(value) = filters.get(&rule.param) else {
            continue;
        };
        if value.is_null() {
            continue;
        }

        let column = quote_identifier(&rule.column);

        match rule.kind {
            FilterKind::Contains => {
                let text = filter_text(rule, value)?;
                params.push(SqlValue::Text(Some(format!("%{}%", escape_like(&text)))));
                clauses.push(format!("{} ILIKE ${}", column, params.len()));
            }
            FilterKind::Min(column_type) | FilterKind::Max(column_type) => {
                let bound = column_type.to_sql_value(value).map_err(|e| {
                    StoreError::validation(format!("Invalid value for '{}': {}", rule.param, e))
                })?;
                let operator = if matches!(rule.kind, FilterKind::Min(_)) {
                    ">="
                } else {
                    "<="
                };
                bounds.push((rule, bound.clone()));
                params.push(bound);
                clauses.push(format!("{} {} ${}", column, operator, params.len()));
            }
            FilterKind::Positive => {
                if filter_flag(rule, value)? {
                    clauses.push(format!("{} > 0", column));
                }
            }
        }
    }

    check_bounds(&bounds)?;

    if clauses.is_empty() {
        return Ok(SqlFragment::empty());
    }

    Ok(SqlFragment::new(
        format!("WHERE {}", clauses.join(" AND ")),
        params,
    ))
}

fn filter_text(rule: &FilterRule, value: &serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(StoreError::validation(format!(
            "Invalid value for '{}': expected text",
            rule.param
        ))),
    }
}

fn filter_flag(rule: &FilterRule, value: &serde_json::Value) -> Result<bool> {
    let flag = match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    flag.ok_or_else(|| {
        StoreError::validation(format!(
            "Invalid value for '{}': expected true or false",
            rule.param
        ))
    })
}

/// Escape LIKE wildcards so the caller's text matches literally
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A lower bound above the upper bound on the same column can never match.
fn check_bounds(bounds: &[(&FilterRule, SqlValue)]) -> Result<()> {
    for (min_rule, min) in bounds.iter().filter(|(r, _)| matches!(r.kind, FilterKind::Min(_))) {
        for (max_rule, max) in bounds.iter().filter(|(r, _)| matches!(r.kind, FilterKind::Max(_))) {
            if min_rule.column == max_rule.column && min.exceeds(max) {
                return Err(StoreError::validation(format!(
                    "'{}' cannot be greater than '{}'",
                    min_rule.param, max_rule.param
                )));
            }
        }
    }
    Ok(())
}
