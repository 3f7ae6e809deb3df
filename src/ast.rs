use crate::condition::Condition;
use crate::value::Value;

/// One parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable(CreateTable),
    ListTables,
    DropTable(String),
    InsertInto(InsertInto),
    Select(Select),
    Update(Update),
    Delete(Delete),
    Info(String),
    Help,
    Exit,
}

/// A `name:type` token split in two. The type is still raw text; the catalog
/// decides whether it is supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertInto {
    pub table: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    /// `None` selects every row.
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub set: Condition,
    pub filter: Condition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub filter: Condition,
}
