use std::collections::BTreeMap;

use bitvec::prelude::*;

use crate::table::Row;
use crate::value::Value;

/// A conjunction of `column = value` clauses.
///
/// Clauses are kept ordered by column name, so two conditions built from the same
/// clauses in a different order compare (and hash) equal. The read cache relies
/// on this to normalize its keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Condition {
    clauses: BTreeMap<String, Value>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a single-clause condition, the shape the command parser produces.
    pub fn single(column: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut condition = Self::new();
        condition.and(column, value);
        condition
    }

    /// Adds a clause. A second clause on the same column replaces the first.
    pub fn and(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.clauses.insert(column.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Iterates clauses in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.clauses.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Returns `true` if every clause holds for `row`.
    ///
    /// Equality is strict on kind: a row holding `Int(1)` never matches a
    /// `Bool(true)` clause. A clause naming a column the row lacks never matches.
    /// An empty condition matches every row.
    pub fn matches(&self, row: &Row) -> bool {
        self.clauses
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }

    /// Evaluates the condition against every row, returning a bitmap where a
    /// `true` bit marks a matching row at the same index.
    pub fn match_mask(&self, rows: &[Row]) -> BitVec {
        rows.iter().map(|row| self.matches(row)).collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Condition {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut condition = Self::new();
        for (column, value) in iter {
            condition.and(column, value);
        }
        condition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, age: i64) -> Row {
        Row::from_iter([
            ("ID", Value::Int(id)),
            ("name", Value::from(name)),
            ("age", Value::Int(age)),
        ])
    }

    #[test]
    fn test_empty_condition_matches_everything() {
        let condition = Condition::new();
        assert!(condition.matches(&row(1, "Alice", 30)));
        assert!(condition.matches(&Row::default()));
    }

    #[test]
    fn test_single_clause() {
        let condition = Condition::single("age", Value::Int(30));
        assert!(condition.matches(&row(1, "Alice", 30)));
        assert!(!condition.matches(&row(2, "Bob", 25)));
    }

    #[test]
    fn test_all_clauses_must_hold() {
        let condition = Condition::from_iter([("age", Value::Int(30)), ("name", "Bob".into())]);
        assert!(!condition.matches(&row(1, "Alice", 30)));
        assert!(condition.matches(&row(3, "Bob", 30)));
    }

    #[test]
    fn test_no_coercion_across_kinds() {
        assert!(!Condition::single("age", "30").matches(&row(1, "Alice", 30)));
        assert!(!Condition::single("ID", true).matches(&row(1, "Alice", 30)));
    }

    #[test]
    fn test_unknown_column_never_matches() {
        assert!(!Condition::single("email", "a@b").matches(&row(1, "Alice", 30)));
    }

    #[test]
    fn test_clause_order_is_normalized() {
        let a = Condition::from_iter([("b", Value::Int(1)), ("a", Value::Int(2))]);
        let b = Condition::from_iter([("a", Value::Int(2)), ("b", Value::Int(1))]);
        assert_eq!(a, b);
        let columns: Vec<&str> = a.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["a", "b"]);
    }

    #[test]
    fn test_match_mask() {
        let rows = vec![row(1, "Alice", 30), row(2, "Bob", 25), row(3, "Carol", 30)];
        let mask = Condition::single("age", Value::Int(30)).match_mask(&rows);
        assert_eq!(mask, bitvec![1, 0, 1]);
        assert_eq!(mask.count_ones(), 2);
    }
}
