//! Persistence of the catalog and of per-table rows.
//!
//! The database loads what it needs before every command and saves what changed
//! after it. Nothing here is cached between calls.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::{DbError, Result};
use crate::table::Row;

/// Load/save operations keyed by table name.
pub trait Storage {
    fn load_catalog(&self) -> Result<Catalog>;

    fn save_catalog(&mut self, catalog: &Catalog) -> Result<()>;

    /// Returns an empty collection when the table has no stored rows yet.
    fn load_rows(&self, table: &str) -> Result<Vec<Row>>;

    fn save_rows(&mut self, table: &str, rows: &[Row]) -> Result<()>;

    /// Forgets a table's rows. Removing rows that were never saved is not an error.
    fn remove_rows(&mut self, table: &str) -> Result<()>;

    /// Rejects table names the backend cannot store next to its own documents.
    fn check_table_name(&self, _table: &str) -> Result<()> {
        Ok(())
    }
}

/// Stores the catalog in one JSON metadata document and each table's rows in
/// `<dir>/<table>.json`.
///
/// A missing or unreadable document loads as empty: it means "no data yet",
/// not a failure. Writes go to a temporary sibling that is renamed over the
/// target, so a crash mid-write leaves the previous document in place.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
    meta_file: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>, meta_file: impl AsRef<Path>) -> Self {
        let dir = dir.into();
        let meta_file = dir.join(meta_file);
        Self { dir, meta_file }
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_file
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.json"))
    }

    fn read_document<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no document yet");
                return Ok(T::default());
            }
            Err(e) => return Err(DbError::StorageUnavailable(format!("{}: {e}", path.display()))),
        };

        match serde_json::from_str(&content) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt document, treating as empty");
                Ok(T::default())
            }
        }
    }

    fn write_document<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(value)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "document saved");
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn load_catalog(&self) -> Result<Catalog> {
        self.read_document(&self.meta_file)
    }

    fn save_catalog(&mut self, catalog: &Catalog) -> Result<()> {
        self.write_document(&self.meta_file, catalog)
    }

    fn load_rows(&self, table: &str) -> Result<Vec<Row>> {
        self.read_document(&self.table_path(table))
    }

    fn save_rows(&mut self, table: &str, rows: &[Row]) -> Result<()> {
        self.write_document(&self.table_path(table), rows)
    }

    fn remove_rows(&mut self, table: &str) -> Result<()> {
        match fs::remove_file(self.table_path(table)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// A table whose document would land on the metadata document is refused.
    /// File names are compared ignoring ASCII case for case-insensitive file systems.
    fn check_table_name(&self, table: &str) -> Result<()> {
        let document = format!("{table}.json");
        let clashes = self
            .meta_file
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|meta| meta.eq_ignore_ascii_case(&document));
        if clashes {
            return Err(DbError::ReservedTableName(table.to_string()));
        }
        Ok(())
    }
}

/// Keeps everything in process memory. Used by tests and benches.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    catalog: Catalog,
    rows: HashMap<String, Vec<Row>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load_catalog(&self) -> Result<Catalog> {
        Ok(self.catalog.clone())
    }

    fn save_catalog(&mut self, catalog: &Catalog) -> Result<()> {
        self.catalog = catalog.clone();
        Ok(())
    }

    fn load_rows(&self, table: &str) -> Result<Vec<Row>> {
        Ok(self.rows.get(table).cloned().unwrap_or_default())
    }

    fn save_rows(&mut self, table: &str, rows: &[Row]) -> Result<()> {
        self.rows.insert(table.to_string(), rows.to_vec());
        Ok(())
    }

    fn remove_rows(&mut self, table: &str) -> Result<()> {
        self.rows.remove(table);
        Ok(())
    }
}
