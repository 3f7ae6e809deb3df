use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::ColumnSpec;
use crate::data_type::DataType;
use crate::error::{DbError, Result};
use crate::table::{ColumnDef, ID_COLUMN, Schema};

/// All table definitions known to the database, keyed by table name.
///
/// Serializes as the metadata document:
/// `{"users": {"columns": [{"name": "ID", "type": "int"}, ...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    tables: BTreeMap<String, Schema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new table.
    ///
    /// User columns named `id` in any case are dropped, and `ID:int` is put
    /// first. Column types are given as raw text so an unsupported type is
    /// reported with the column it came from.
    ///
    /// # Errors
    /// - [DbError::InvalidTableName] if `name` is empty or has characters other
    ///   than ASCII letters, digits, `_` and `-`.
    /// - [DbError::DuplicateTable] if `name` is already registered.
    /// - [DbError::InvalidColumnType] if a type is not `int`, `str` or `bool`.
    ///
    /// The catalog is left unchanged on error.
    pub fn create_table(&mut self, name: &str, columns: &[ColumnSpec]) -> Result<&Schema> {
        validate_table_name(name)?;
        if self.tables.contains_key(name) {
            return Err(DbError::DuplicateTable(name.to_string()));
        }

        let mut schema = Schema {
            columns: vec![ColumnDef::new(ID_COLUMN, DataType::Int)],
        };
        for spec in columns {
            if spec.name.eq_ignore_ascii_case(ID_COLUMN) {
                continue;
            }
            let data_type = spec
                .ty
                .parse::<DataType>()
                .map_err(|_| DbError::InvalidColumnType {
                    column: spec.name.clone(),
                    ty: spec.ty.clone(),
                })?;
            schema.columns.push(ColumnDef::new(spec.name.clone(), data_type));
        }

        Ok(self.tables.entry(name.to_string()).or_insert(schema))
    }

    /// Removes a table definition and returns it.
    ///
    /// # Errors
    /// Returns [DbError::UnknownTable] if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> Result<Schema> {
        self.tables
            .remove(name)
            .ok_or_else(|| DbError::UnknownTable(name.to_string()))
    }

    /// Looks up a table's schema. Every row operation starts here.
    pub fn schema(&self, name: &str) -> Result<&Schema> {
        self.tables
            .get(name)
            .ok_or_else(|| DbError::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in sorted order.
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Table names double as file names, so they are limited to a portable set.
fn validate_table_name(name: &str) -> Result<()> {
    let portable = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if name.is_empty() || !portable {
        return Err(DbError::InvalidTableName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(specs: &[(&str, &str)]) -> Vec<ColumnSpec> {
        specs
            .iter()
            .map(|(name, ty)| ColumnSpec {
                name: name.to_string(),
                ty: ty.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_create_table_prepends_id() {
        let mut catalog = Catalog::new();
        catalog
            .create_table("Users", &cols(&[("name", "str"), ("age", "int")]))
            .unwrap();

        let schema = catalog.schema("Users").unwrap();
        assert_eq!(
            schema.columns,
            vec![
                ColumnDef::new("ID", DataType::Int),
                ColumnDef::new("name", DataType::Str),
                ColumnDef::new("age", DataType::Int),
            ]
        );
    }

    #[test]
    fn test_user_id_columns_are_dropped() {
        let mut catalog = Catalog::new();
        catalog
            .create_table(
                "t",
                &cols(&[("id", "str"), ("Id", "bool"), ("ID", "int"), ("flag", "bool")]),
            )
            .unwrap();

        let names: Vec<&str> = catalog.schema("t").unwrap().column_names().collect();
        assert_eq!(names, vec!["ID", "flag"]);
    }

    #[test]
    fn test_id_column_with_bad_type_is_ignored() {
        let mut catalog = Catalog::new();
        assert!(catalog.create_table("t", &cols(&[("id", "float")])).is_ok());
    }

    #[test]
    fn test_duplicate_table() {
        let mut catalog = Catalog::new();
        catalog.create_table("Users", &cols(&[("name", "str")])).unwrap();
        let before = catalog.clone();

        let err = catalog
            .create_table("Users", &cols(&[("age", "int")]))
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateTable(ref t) if t == "Users"));
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_invalid_column_type_leaves_catalog_unchanged() {
        let mut catalog = Catalog::new();
        let err = catalog
            .create_table("t", &cols(&[("name", "str"), ("price", "float")]))
            .unwrap_err();
        assert!(
            matches!(err, DbError::InvalidColumnType { ref column, ref ty } if column == "price" && ty == "float")
        );
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_table_names_must_be_portable() {
        let mut catalog = Catalog::new();
        for name in ["../escaped", "a/b", r"a\b", "..", ".hidden", "with space", "", "café"] {
            let err = catalog.create_table(name, &[]).unwrap_err();
            assert!(
                matches!(err, DbError::InvalidTableName(ref t) if t == name),
                "{name:?}"
            );
        }
        assert!(catalog.is_empty());

        catalog.create_table("user_log-2", &[]).unwrap();
        assert_eq!(catalog.list_tables(), vec!["user_log-2"]);
    }

    #[test]
    fn test_drop_table() {
        let mut catalog = Catalog::new();
        catalog.create_table("Users", &[]).unwrap();
        assert!(catalog.contains("Users"));

        catalog.drop_table("Users").unwrap();
        assert!(!catalog.contains("Users"));
        assert!(matches!(
            catalog.drop_table("Users"),
            Err(DbError::UnknownTable(_))
        ));
        assert!(matches!(catalog.schema("Users"), Err(DbError::UnknownTable(_))));
    }

    #[test]
    fn test_table_names_are_case_sensitive() {
        let mut catalog = Catalog::new();
        catalog.create_table("users", &[]).unwrap();
        catalog.create_table("Users", &[]).unwrap();
        assert_eq!(catalog.list_tables(), vec!["Users", "users"]);
    }

    #[test]
    fn test_metadata_document_shape() {
        let mut catalog = Catalog::new();
        catalog.create_table("t", &cols(&[("ok", "bool")])).unwrap();
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "t": {"columns": [
                    {"name": "ID", "type": "int"},
                    {"name": "ok", "type": "bool"}
                ]}
            })
        );
        let back: Catalog = serde_json::from_value(json).unwrap();
        assert_eq!(back, catalog);
    }
}
