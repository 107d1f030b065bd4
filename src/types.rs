//! Core type definitions for the record store
//!
//! Includes column types, typed bound values, and column definitions.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Column Types
// ============================================================================

/// SQL type of a record column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Text field (maps to TEXT)
    Text,
    /// Integer field (maps to INTEGER)
    Integer,
    /// Fixed-point field (maps to NUMERIC), rendered as a decimal string
    Decimal,
}

impl ColumnType {
    /// A NULL of this column's type
    pub fn null(&self) -> SqlValue {
        match self {
            ColumnType::Text => SqlValue::Text(None),
            ColumnType::Integer => SqlValue::Integer(None),
            ColumnType::Decimal => SqlValue::Decimal(None),
        }
    }

    /// Convert a JSON value into a bound value of this type.
    ///
    /// Numbers are also accepted as strings, since query-string parameters
    /// always arrive as text.
    pub fn to_sql_value(&self, value: &serde_json::Value) -> Result<SqlValue, String> {
        if value.is_null() {
            return Ok(self.null());
        }

        match (self, value) {
            (ColumnType::Text, serde_json::Value::String(s)) => Ok(SqlValue::Text(Some(s.clone()))),
            (ColumnType::Integer, serde_json::Value::Number(n)) => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(|v| SqlValue::Integer(Some(v)))
                .ok_or_else(|| format!("Cannot convert {} to integer", n)),
            (ColumnType::Integer, serde_json::Value::String(s)) => s
                .trim()
                .parse::<i32>()
                .map(|v| SqlValue::Integer(Some(v)))
                .map_err(|_| format!("Cannot convert '{}' to integer", s)),
            (ColumnType::Decimal, serde_json::Value::Number(n)) => parse_decimal(&n.to_string())
                .map(|v| SqlValue::Decimal(Some(v)))
                .ok_or_else(|| format!("Cannot convert {} to decimal", n)),
            (ColumnType::Decimal, serde_json::Value::String(s)) => parse_decimal(s.trim())
                .map(|v| SqlValue::Decimal(Some(v)))
                .ok_or_else(|| format!("Cannot convert '{}' to decimal", s)),
            _ => Err(format!("Type mismatch: expected {:?}, got {}", self, value)),
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

// ============================================================================
// Bound Values
// ============================================================================

/// A value bound to a positional placeholder.
///
/// Every variant carries its SQL type, so a NULL is still sent with the
/// type of the column it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Integer(Option<i32>),
    Decimal(Option<Decimal>),
}

impl SqlValue {
    /// Compare two non-null values of the same type
    pub(crate) fn exceeds(&self, other: &SqlValue) -> bool {
        match (self, other) {
            (SqlValue::Integer(Some(a)), SqlValue::Integer(Some(b))) => a > b,
            (SqlValue::Decimal(Some(a)), SqlValue::Decimal(Some(b))) => a > b,
            (SqlValue::Text(Some(a)), SqlValue::Text(Some(b))) => a > b,
            _ => false,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(Some(value.to_string()))
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(Some(value))
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(Some(value))
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        SqlValue::Decimal(Some(value))
    }
}

// ============================================================================
// Column Definitions
// ============================================================================

/// Column of a record table.
///
/// `field` is the caller-facing name used in JSON payloads; `name` is the
/// physical column. They differ for fields like `companyHandle`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Physical column name
    pub name: String,
    /// Logical field name
    pub field: String,
    pub column_type: ColumnType,
    /// Whether the column allows NULL values (default: true)
    pub nullable: bool,
    /// Whether partial updates may change this column (default: true)
    pub updatable: bool,
}

impl ColumnDefinition {
    /// Create a column whose logical and physical names match
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        Self {
            field: name.clone(),
            name,
            column_type,
            nullable: true,
            updatable: true,
        }
    }

    /// Expose the column under a different logical name
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Exclude the column from partial updates
    pub fn immutable(mut self) -> Self {
        self.updatable = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // ColumnType Conversion Tests
    // =========================================================================

    #[test]
    fn test_text_conversion() {
        assert_eq!(
            ColumnType::Text.to_sql_value(&json!("Farmer")).unwrap(),
            SqlValue::Text(Some("Farmer".to_string()))
        );
        assert!(ColumnType::Text.to_sql_value(&json!(42)).is_err());
    }

    #[test]
    fn test_integer_conversion_accepts_numeric_strings() {
        assert_eq!(
            ColumnType::Integer.to_sql_value(&json!(50000)).unwrap(),
            SqlValue::Integer(Some(50000))
        );
        assert_eq!(
            ColumnType::Integer.to_sql_value(&json!("50000")).unwrap(),
            SqlValue::Integer(Some(50000))
        );
    }

    #[test]
    fn test_integer_conversion_rejects_garbage() {
        assert!(ColumnType::Integer.to_sql_value(&json!("abc")).is_err());
        assert!(ColumnType::Integer.to_sql_value(&json!(1.5)).is_err());
        assert!(ColumnType::Integer.to_sql_value(&json!(true)).is_err());
        // Out of INTEGER range
        assert!(ColumnType::Integer.to_sql_value(&json!(5_000_000_000i64)).is_err());
    }

    #[test]
    fn test_decimal_conversion() {
        assert_eq!(
            ColumnType::Decimal.to_sql_value(&json!(0.5)).unwrap(),
            SqlValue::Decimal(Some(Decimal::new(5, 1)))
        );
        assert_eq!(
            ColumnType::Decimal.to_sql_value(&json!("0.25")).unwrap(),
            SqlValue::Decimal(Some(Decimal::new(25, 2)))
        );
        assert_eq!(
            ColumnType::Decimal.to_sql_value(&json!(0)).unwrap(),
            SqlValue::Decimal(Some(Decimal::ZERO))
        );
        assert!(ColumnType::Decimal.to_sql_value(&json!("lots")).is_err());
    }

    #[test]
    fn test_null_keeps_column_type() {
        let value = ColumnType::Integer.to_sql_value(&json!(null)).unwrap();
        assert_eq!(value, SqlValue::Integer(None));
        assert_eq!(ColumnType::Decimal.null(), SqlValue::Decimal(None));
    }

    // =========================================================================
    // SqlValue Tests
    // =========================================================================

    #[test]
    fn test_exceeds_same_type_only() {
        assert!(SqlValue::from(10).exceeds(&SqlValue::from(5)));
        assert!(!SqlValue::from(5).exceeds(&SqlValue::from(10)));
        assert!(!SqlValue::from(10).exceeds(&SqlValue::Decimal(Some(Decimal::ONE))));
        assert!(!SqlValue::Integer(None).exceeds(&SqlValue::from(1)));
    }

    // =========================================================================
    // ColumnDefinition Tests
    // =========================================================================

    #[test]
    fn test_column_definition_builders() {
        let col = ColumnDefinition::new("company_handle", ColumnType::Text)
            .field("companyHandle")
            .not_null();

        assert_eq!(col.name, "company_handle");
        assert_eq!(col.field, "companyHandle");
        assert!(!col.nullable);
        assert!(col.updatable);

        let key = ColumnDefinition::new("title", ColumnType::Text).immutable();
        assert_eq!(key.field, "title");
        assert!(!key.updatable);
    }
}
