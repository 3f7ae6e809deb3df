use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents the column types a table schema may declare.
/// The textual form (`int`, `str`, `bool`) is what users type in column specs
/// and what the metadata document stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// A 64-bit signed integer.
    Int,
    /// A UTF-8 character string.
    Str,
    /// A boolean value (true or false).
    Bool,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Str => "str",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ();

    /// Type names are matched exactly: `Int` is not a valid type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Self::Int),
            "str" => Ok(Self::Str),
            "bool" => Ok(Self::Bool),
            _ => Err(()),
        }
    }
}
