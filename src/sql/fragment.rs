//! Parameterized SQL fragments

use crate::types::SqlValue;

/// Clause text with `$1..$n` placeholders and the values bound to them, in
/// placeholder order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlFragment {
    clause: String,
    params: Vec<SqlValue>,
}

impl SqlFragment {
    pub(crate) fn new(clause: String, params: Vec<SqlValue>) -> Self {
        Self { clause, params }
    }

    /// A fragment with no text and no values
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// Placeholder number the next appended parameter must use
    pub fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fragment() {
        let fragment = SqlFragment::empty();
        assert!(fragment.is_empty());
        assert_eq!(fragment.clause(), "");
        assert!(fragment.params().is_empty());
        assert_eq!(fragment.next_placeholder(), 1);
    }

    #[test]
    fn test_next_placeholder_follows_params() {
        let fragment = SqlFragment::new(
            "\"salary\"=$1, \"equity\"=$2".to_string(),
            vec![SqlValue::from(100), SqlValue::Decimal(None)],
        );
        assert_eq!(fragment.next_placeholder(), 3);
        assert_eq!(fragment.clause(), "\"salary\"=$1, \"equity\"=$2");
        assert_eq!(fragment.params().len(), 2);
    }
}
