pub mod ast;
pub mod cache;
pub mod catalog;
pub mod condition;
pub mod config;
pub mod data_type;
pub mod database;
pub mod error;
pub mod parser;
pub mod shell;
pub mod storage;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use cache::ReadCache;
pub use catalog::Catalog;
pub use condition::Condition;
pub use config::Config;
pub use data_type::DataType;
pub use database::{Database, Outcome, QueryResult};
pub use error::{DbError, Result};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
pub use table::{ColumnDef, Row, Schema, Table};
pub use value::Value;
