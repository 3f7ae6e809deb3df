use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::condition::Condition;
use crate::data_type::DataType;
use crate::error::{DbError, Result};
use crate::value::Value;

/// Name of the mandatory first column of every table.
pub const ID_COLUMN: &str = "ID";

/// Column definition in the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.data_type)
    }
}

/// Ordered column definitions of one table, always headed by `ID:int`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns the user supplies values for, in schema order.
    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.name != ID_COLUMN)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// One stored record: column values in schema order, `ID` first.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<(String, Value)>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Replaces the value of an existing column in place, or appends a new one.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((column, value)),
        }
    }

    /// The row's `ID`, if present and an integer.
    pub fn id(&self) -> Option<i64> {
        self.get(ID_COLUMN).and_then(Value::as_int)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::default();
        for (column, value) in iter {
            row.set(column, value.into());
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in &self.values {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of column names to values")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Row, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut row = Row::default();
                while let Some((column, value)) = access.next_entry::<String, Value>()? {
                    row.set(column, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Summary produced by `info <table>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub row_count: usize,
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self.columns.iter().map(ToString::to_string).collect();
        writeln!(f, "Table: {}", self.name)?;
        writeln!(f, "Columns: {}", columns.join(", "))?;
        write!(f, "Rows: {}", self.row_count)
    }
}

/// A table's schema together with its rows, as loaded for one operation.
///
/// Every mutating method validates its arguments against the schema; the caller
/// persists `rows` afterwards. Row order is insertion order and is never changed
/// by an update.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            schema,
            rows,
        }
    }

    /// `1 + max(existing IDs)`, or `1` for an empty table. IDs freed by a
    /// delete are never handed out again as long as a higher ID survives.
    pub fn next_id(&self) -> i64 {
        self.rows
            .iter()
            .filter_map(Row::id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Inserts a row from positional values (one per non-`ID` column) and
    /// returns the assigned ID. On error the table is unchanged.
    pub fn insert(&mut self, values: Vec<Value>) -> Result<i64> {
        let expected = self.schema.data_columns().count();
        if values.len() != expected {
            return Err(DbError::ArityMismatch {
                expected,
                found: values.len(),
            });
        }

        let id = self.next_id();
        let mut row = Row::default();
        row.set(ID_COLUMN, Value::Int(id));
        for (column, value) in self.schema.data_columns().zip(values) {
            check_type(column, &value)?;
            row.set(column.name.clone(), value);
        }

        self.rows.push(row);
        debug!(table = %self.name, id, "row inserted");
        Ok(id)
    }

    /// Returns the rows matching `condition`, in table order. `None` or an empty
    /// condition returns every row.
    pub fn select(&self, condition: Option<&Condition>) -> Vec<Row> {
        match condition {
            Some(condition) if !condition.is_empty() => self
                .rows
                .iter()
                .filter(|row| condition.matches(row))
                .cloned()
                .collect(),
            _ => self.rows.clone(),
        }
    }

    /// Applies the `set` assignments to every row matching `filter` and returns
    /// the IDs of the matched rows, whether or not their values changed.
    ///
    /// Unknown set columns are rejected before any row is touched. A type
    /// mismatch is detected per row and aborts the call: rows updated before the
    /// failing one keep their new values in `self.rows`.
    pub fn update(&mut self, set: &Condition, filter: &Condition) -> Result<Vec<i64>> {
        if filter.is_empty() {
            return Err(DbError::MissingCondition("update"));
        }
        let mut targets = Vec::with_capacity(set.len());
        for (name, value) in set.iter() {
            let column = self
                .schema
                .column(name)
                .ok_or_else(|| DbError::UnknownColumn(name.to_string()))?;
            targets.push((column, value));
        }

        let mut updated = Vec::new();
        for row in self.rows.iter_mut().filter(|row| filter.matches(row)) {
            for (column, value) in &targets {
                check_type(column, value)?;
                row.set(column.name.clone(), (*value).clone());
            }
            updated.extend(row.id());
        }

        debug!(table = %self.name, count = updated.len(), "rows updated");
        Ok(updated)
    }

    /// Removes every row matching `filter` and returns their IDs in table order.
    pub fn delete(&mut self, filter: &Condition) -> Result<Vec<i64>> {
        if filter.is_empty() {
            return Err(DbError::MissingCondition("delete"));
        }
        let mask = filter.match_mask(&self.rows);

        let mut removed = Vec::with_capacity(mask.count_ones());
        let mut kept = Vec::with_capacity(mask.count_zeros());
        for (row, matched) in std::mem::take(&mut self.rows).into_iter().zip(mask) {
            if matched {
                removed.extend(row.id());
            } else {
                kept.push(row);
            }
        }
        self.rows = kept;

        debug!(table = %self.name, count = removed.len(), "rows deleted");
        Ok(removed)
    }

    pub fn describe(&self) -> TableInfo {
        TableInfo {
            name: self.name.clone(),
            columns: self.schema.columns.clone(),
            row_count: self.rows.len(),
        }
    }
}

fn check_type(column: &ColumnDef, value: &Value) -> Result<()> {
    if value.data_type() != column.data_type {
        return Err(DbError::TypeMismatch {
            column: column.name.clone(),
            expected: column.data_type,
            value: value.clone(),
        });
    }
    Ok(())
}
