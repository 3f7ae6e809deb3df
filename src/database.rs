use tracing::{debug, info};

use crate::ast::{ColumnSpec, Command};
use crate::cache::{CacheKey, ReadCache};
use crate::catalog::Catalog;
use crate::condition::Condition;
use crate::error::Result;
use crate::parser::Parser;
use crate::storage::Storage;
use crate::table::{Row, Schema, Table, TableInfo};
use crate::value::Value;

/// The entry point of the engine.
///
/// Every operation reloads the catalog (and the table's rows when needed) from
/// the [Storage], applies the change in memory and saves what changed. Nothing
/// is persisted when an operation fails. Selects go through the [ReadCache].
pub struct Database<S: Storage> {
    storage: S,
    cache: ReadCache,
}

/// Represents the result of a successful `select`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub table: String,
    /// Column names in schema order, `ID` first.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// What a command produced, for the shell to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    TableCreated(Schema),
    TableDropped,
    Tables(Vec<String>),
    Inserted(i64),
    Rows(QueryResult),
    Updated(Vec<i64>),
    Deleted(Vec<i64>),
    Info(TableInfo),
    Help,
    Exit,
}

impl<S: Storage> Database<S> {
    pub fn new(storage: S, cache: ReadCache) -> Self {
        Self { storage, cache }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn cache(&self) -> &ReadCache {
        &self.cache
    }

    /// Parses and runs one command line.
    ///
    /// # Example
    /// ```
    /// use flatdb::database::{Database, Outcome};
    /// use flatdb::storage::MemoryStorage;
    /// use flatdb::cache::ReadCache;
    ///
    /// let mut db = Database::new(MemoryStorage::new(), ReadCache::default());
    /// db.execute("create_table Users name:str age:int").unwrap();
    /// let outcome = db.execute(r#"insert into Users values ("Alice", 30)"#).unwrap();
    /// assert_eq!(outcome, Outcome::Inserted(1));
    /// ```
    pub fn execute(&mut self, line: &str) -> Result<Outcome> {
        let command = Parser::new(line).parse()?;
        self.run(command)
    }

    /// Runs an already parsed command.
    pub fn run(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::CreateTable(create) => {
                let catalog = self.create_table(&create.name, &create.columns)?;
                Ok(Outcome::TableCreated(catalog.schema(&create.name)?.clone()))
            }
            Command::ListTables => Ok(Outcome::Tables(self.list_tables()?)),
            Command::DropTable(name) => {
                self.drop_table(&name)?;
                Ok(Outcome::TableDropped)
            }
            Command::InsertInto(insert) => self
                .insert_row(&insert.table, insert.values)
                .map(Outcome::Inserted),
            Command::Select(select) => self
                .select_rows(&select.table, select.condition.as_ref())
                .map(Outcome::Rows),
            Command::Update(update) => self
                .update_rows(&update.table, &update.set, &update.filter)
                .map(Outcome::Updated),
            Command::Delete(delete) => self
                .delete_rows(&delete.table, &delete.filter)
                .map(Outcome::Deleted),
            Command::Info(name) => self.describe_table(&name).map(Outcome::Info),
            Command::Help => Ok(Outcome::Help),
            Command::Exit => Ok(Outcome::Exit),
        }
    }

    /// Creates a new table and returns the updated catalog.
    ///
    /// # Errors
    /// Returns an error if a table with the same name already exists, if the
    /// name cannot be stored or if a column type is not supported.
    pub fn create_table(&mut self, name: &str, columns: &[ColumnSpec]) -> Result<Catalog> {
        let mut catalog = self.storage.load_catalog()?;
        catalog.create_table(name, columns)?;
        self.storage.check_table_name(name)?;
        self.storage.save_catalog(&catalog)?;
        self.cache.table_written(name);

        info!(table = name, "table created");
        Ok(catalog)
    }

    /// Removes a table and its rows, returning the updated catalog.
    ///
    /// # Errors
    /// Returns an error if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> Result<Catalog> {
        let mut catalog = self.storage.load_catalog()?;
        catalog.drop_table(name)?;
        self.storage.save_catalog(&catalog)?;
        self.storage.remove_rows(name)?;
        self.cache.table_written(name);

        info!(table = name, "table dropped");
        Ok(catalog)
    }

    /// Returns all table names in sorted order.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let catalog = self.storage.load_catalog()?;
        Ok(catalog.list_tables().into_iter().map(String::from).collect())
    }

    /// Inserts a row and returns its new ID.
    pub fn insert_row(&mut self, table: &str, values: Vec<Value>) -> Result<i64> {
        let mut loaded = self.load_table(table)?;
        let id = loaded.insert(values)?;
        self.save_table(&loaded)?;
        Ok(id)
    }

    /// Returns the rows matching `condition`, or every row for `None`.
    ///
    /// The table must exist even when the result could come from the cache.
    pub fn select_rows(&mut self, table: &str, condition: Option<&Condition>) -> Result<QueryResult> {
        let catalog = self.storage.load_catalog()?;
        let schema = catalog.schema(table)?;

        let storage = &self.storage;
        let rows = self
            .cache
            .get_or_compute(CacheKey::new(table, condition), || {
                let loaded = Table::new(table, schema.clone(), storage.load_rows(table)?);
                Ok(loaded.select(condition))
            })?;

        debug!(table, count = rows.len(), "rows selected");
        Ok(QueryResult {
            table: table.to_string(),
            columns: schema.column_names().map(String::from).collect(),
            rows,
        })
    }

    /// Applies `set` to the rows matching `filter` and returns their IDs.
    pub fn update_rows(&mut self, table: &str, set: &Condition, filter: &Condition) -> Result<Vec<i64>> {
        let mut loaded = self.load_table(table)?;
        let ids = loaded.update(set, filter)?;
        self.save_table(&loaded)?;
        Ok(ids)
    }

    /// Removes the rows matching `filter` and returns their IDs.
    pub fn delete_rows(&mut self, table: &str, filter: &Condition) -> Result<Vec<i64>> {
        let mut loaded = self.load_table(table)?;
        let ids = loaded.delete(filter)?;
        self.save_table(&loaded)?;
        Ok(ids)
    }

    pub fn describe_table(&self, table: &str) -> Result<TableInfo> {
        Ok(self.load_table(table)?.describe())
    }

    fn load_table(&self, table: &str) -> Result<Table> {
        let catalog = self.storage.load_catalog()?;
        let schema = catalog.schema(table)?.clone();
        let rows = self.storage.load_rows(table)?;
        Ok(Table::new(table, schema, rows))
    }

    fn save_table(&mut self, table: &Table) -> Result<()> {
        self.storage.save_rows(&table.name, &table.rows)?;
        self.cache.table_written(&table.name);
        Ok(())
    }
}
