use crate::ast::*;
use crate::condition::Condition;
use crate::error::{DbError, Result};
use crate::tokenizer::Tokenizer;
use crate::value::Value;

const SELECT_USAGE: &str = "select from <table> [where <column> = <value>]";
const UPDATE_USAGE: &str = "update <table> set <column> = <value> where <column> = <value>";
const DELETE_USAGE: &str = "delete from <table> where <column> = <value>";

/// Turns one line of command text into a [Command].
///
/// Keywords are matched case-insensitively. Table and column names keep their
/// case. Parsing never touches the database; every failure names the offending
/// part of the input.
pub struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.trim(),
        }
    }

    pub fn parse(&self) -> Result<Command> {
        let keyword = self
            .input
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match keyword.as_str() {
            "create_table" => self.parse_create_table(),
            "list_tables" => Ok(Command::ListTables),
            "drop_table" => Ok(Command::DropTable(self.single_argument()?)),
            "insert" => self.parse_insert().map(Command::InsertInto),
            "select" => self.parse_select().map(Command::Select),
            "update" => self.parse_update().map(Command::Update),
            "delete" => self.parse_delete().map(Command::Delete),
            "info" => Ok(Command::Info(self.single_argument()?)),
            "help" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            _ => Err(DbError::UnknownCommand(keyword)),
        }
    }

    //helpers
    fn words(&self) -> Result<Vec<String>> {
        Tokenizer::new(self.input).tokenize()
    }

    fn single_argument(&self) -> Result<String> {
        self.words()?
            .into_iter()
            .nth(1)
            .ok_or_else(|| DbError::MissingTableName(self.input.to_string()))
    }

    fn parse_create_table(&self) -> Result<Command> {
        let words = self.words()?;
        let name = words
            .get(1)
            .cloned()
            .ok_or_else(|| DbError::MissingTableName(self.input.to_string()))?;
        let columns = parse_columns(&words[2..])?;
        Ok(Command::CreateTable(CreateTable { name, columns }))
    }

    /// `insert into <table> values (<lit>, ...)`
    fn parse_insert(&self) -> Result<InsertInto> {
        let (before, after) = split_keyword(self.input, "values").ok_or(DbError::MissingValues)?;

        let table = before
            .split_whitespace()
            .nth(2)
            .ok_or_else(|| DbError::MalformedInsert(self.input.to_string()))?;

        Ok(InsertInto {
            table: table.to_string(),
            values: parse_values(after)?,
        })
    }

    /// `select from <table> [where <column> = <value>]`
    fn parse_select(&self) -> Result<Select> {
        let malformed = || DbError::MalformedCommand {
            command: "select",
            usage: SELECT_USAGE,
        };
        if find_keyword(self.input, " from ").is_none() {
            return Err(malformed());
        }

        let (prefix, condition) = match split_keyword(self.input, " where ") {
            Some((before, where_part)) => (before, Some(parse_condition(where_part)?)),
            None => (self.input, None),
        };
        let table = prefix.split_whitespace().nth(2).ok_or_else(malformed)?;

        Ok(Select {
            table: table.to_string(),
            condition,
        })
    }

    /// `update <table> set <column> = <value> where <column> = <value>`
    fn parse_update(&self) -> Result<Update> {
        let malformed = || DbError::MalformedCommand {
            command: "update",
            usage: UPDATE_USAGE,
        };
        if find_keyword(self.input, " set ").is_none()
            || find_keyword(self.input, " where ").is_none()
        {
            return Err(malformed());
        }

        let (_, after_update) = self.input.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let (table_part, rest) = split_keyword(after_update, " set ").ok_or_else(malformed)?;
        let (set_part, where_part) = split_keyword(rest, " where ").ok_or_else(malformed)?;

        let table = table_part
            .split_whitespace()
            .next()
            .ok_or_else(|| DbError::MissingTableName(self.input.to_string()))?;

        Ok(Update {
            table: table.to_string(),
            set: parse_condition(set_part)?,
            filter: parse_condition(where_part)?,
        })
    }

    /// `delete from <table> where <column> = <value>`
    fn parse_delete(&self) -> Result<Delete> {
        const PREFIX: &str = "delete from";
        if !self.input.to_ascii_lowercase().starts_with(PREFIX) {
            return Err(DbError::MalformedCommand {
                command: "delete",
                usage: DELETE_USAGE,
            });
        }

        let after_from = &self.input[PREFIX.len()..];
        let (table_part, where_part) =
            split_keyword(after_from, " where ").unwrap_or((after_from, ""));

        let table = table_part.trim();
        if table.is_empty() {
            return Err(DbError::MissingTableName(self.input.to_string()));
        }

        Ok(Delete {
            table: table.to_string(),
            filter: parse_condition(where_part)?,
        })
    }
}

/// Converts one literal token into a typed [Value].
///
/// Rules are tried in order:
/// 1. `"..."` (at least two characters) is a string, quotes stripped, no escapes.
/// 2. `true` / `false` in any case is a boolean.
/// 3. A run of ASCII digits is an integer.
///
/// Anything else, including a negative number or a digit run that overflows
/// `i64`, is a [DbError::InvalidLiteral].
pub fn convert_literal(raw: &str) -> Result<Value> {
    let raw = raw.trim();

    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Ok(Value::from(&raw[1..raw.len() - 1]));
    }

    if raw.eq_ignore_ascii_case("true") {
        return Ok(Value::Bool(true));
    }
    if raw.eq_ignore_ascii_case("false") {
        return Ok(Value::Bool(false));
    }

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| DbError::InvalidLiteral(raw.to_string()));
    }

    Err(DbError::InvalidLiteral(raw.to_string()))
}

/// Parses `name:type` tokens. Only the shape is checked here.
pub fn parse_columns(tokens: &[String]) -> Result<Vec<ColumnSpec>> {
    tokens
        .iter()
        .map(|token| {
            let (name, ty) = token
                .split_once(':')
                .ok_or_else(|| DbError::InvalidColumnSpec(token.clone()))?;
            let (name, ty) = (name.trim(), ty.trim());
            if name.is_empty() || ty.is_empty() {
                return Err(DbError::InvalidColumnSpec(token.clone()));
            }
            Ok(ColumnSpec {
                name: name.to_string(),
                ty: ty.to_string(),
            })
        })
        .collect()
}

/// Parses the part after `values`: an optionally parenthesized, comma-separated
/// literal list. Empty items (a trailing comma) are skipped.
pub fn parse_values(part: &str) -> Result<Vec<Value>> {
    let mut text = part.trim();
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        text = inner;
    }

    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(convert_literal)
        .collect()
}

/// Parses a single `column = value` clause.
pub fn parse_condition(text: &str) -> Result<Condition> {
    let malformed = || DbError::MalformedCondition(text.trim().to_string());

    let (column, raw_value) = text.split_once('=').ok_or_else(malformed)?;
    let (column, raw_value) = (column.trim(), raw_value.trim());
    if column.is_empty() || raw_value.is_empty() {
        return Err(malformed());
    }

    Ok(Condition::single(column, convert_literal(raw_value)?))
}

/// Byte offset of the first case-insensitive occurrence of `keyword`.
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets valid for slicing `text`.
    text.to_ascii_lowercase().find(keyword)
}

/// Splits `text` around the first case-insensitive occurrence of `keyword`.
fn split_keyword<'t>(text: &'t str, keyword: &str) -> Option<(&'t str, &'t str)> {
    let start = find_keyword(text, keyword)?;
    Some((&text[..start], &text[start + keyword.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Command> {
        Parser::new(input).parse()
    }

    #[test]
    fn test_convert_literal() {
        assert_eq!(convert_literal(r#""Alice""#).unwrap(), Value::from("Alice"));
        assert_eq!(convert_literal(r#""""#).unwrap(), Value::from(""));
        assert_eq!(convert_literal(r#""a, b""#).unwrap(), Value::from("a, b"));
        assert_eq!(convert_literal("TRUE").unwrap(), Value::Bool(true));
        assert_eq!(convert_literal("false").unwrap(), Value::Bool(false));
        assert_eq!(convert_literal("42").unwrap(), Value::Int(42));
        assert_eq!(convert_literal(" 007 ").unwrap(), Value::Int(7));
    }

    #[test]
    fn test_convert_literal_rejects() {
        for raw in ["thirty", "-1", "1.5", "\"", "'Bob'", "", "99999999999999999999"] {
            assert!(
                matches!(convert_literal(raw), Err(DbError::InvalidLiteral(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_create_table() {
        let command = parse("create_table Users name:str age:int").unwrap();
        assert_eq!(
            command,
            Command::CreateTable(CreateTable {
                name: "Users".into(),
                columns: vec![
                    ColumnSpec {
                        name: "name".into(),
                        ty: "str".into()
                    },
                    ColumnSpec {
                        name: "age".into(),
                        ty: "int".into()
                    },
                ],
            })
        );
    }

    #[test]
    fn test_parse_create_table_bad_specs() {
        assert!(matches!(
            parse("create_table t name"),
            Err(DbError::InvalidColumnSpec(ref t)) if t == "name"
        ));
        assert!(matches!(
            parse("create_table t :int"),
            Err(DbError::InvalidColumnSpec(_))
        ));
        assert!(matches!(
            parse("create_table t name:"),
            Err(DbError::InvalidColumnSpec(_))
        ));
        assert!(matches!(
            parse("create_table"),
            Err(DbError::MissingTableName(_))
        ));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("list_tables").unwrap(), Command::ListTables);
        assert_eq!(parse("HELP").unwrap(), Command::Help);
        assert_eq!(parse("exit").unwrap(), Command::Exit);
        assert_eq!(parse("Quit").unwrap(), Command::Exit);
        assert_eq!(parse("drop_table Users").unwrap(), Command::DropTable("Users".into()));
        assert_eq!(parse("info Users").unwrap(), Command::Info("Users".into()));
        assert!(matches!(parse("drop_table"), Err(DbError::MissingTableName(_))));
        assert!(matches!(parse("frobnicate x"), Err(DbError::UnknownCommand(ref c)) if c == "frobnicate"));
    }

    #[test]
    fn test_parse_insert() {
        let command = parse(r#"insert into Users values ("Alice", 30, true)"#).unwrap();
        assert_eq!(
            command,
            Command::InsertInto(InsertInto {
                table: "Users".into(),
                values: vec![Value::from("Alice"), Value::Int(30), Value::Bool(true)],
            })
        );
    }

    #[test]
    fn test_parse_insert_keywords_any_case() {
        let command = parse(r#"INSERT INTO Users VALUES ("Bob", 25,)"#).unwrap();
        assert_eq!(
            command,
            Command::InsertInto(InsertInto {
                table: "Users".into(),
                values: vec![Value::from("Bob"), Value::Int(25)],
            })
        );
    }

    #[test]
    fn test_parse_insert_errors() {
        assert!(matches!(
            parse("insert into Users (1, 2)"),
            Err(DbError::MissingValues)
        ));
        assert!(matches!(
            parse("insert Users values (1)"),
            Err(DbError::MalformedInsert(_))
        ));
        assert!(matches!(
            parse("insert into Users values (Alice)"),
            Err(DbError::InvalidLiteral(ref t)) if t == "Alice"
        ));
    }

    #[test]
    fn test_parse_select() {
        assert_eq!(
            parse("select from Users").unwrap(),
            Command::Select(Select {
                table: "Users".into(),
                condition: None,
            })
        );
        assert_eq!(
            parse("SELECT FROM Users WHERE age = 30").unwrap(),
            Command::Select(Select {
                table: "Users".into(),
                condition: Some(Condition::single("age", Value::Int(30))),
            })
        );
    }

    #[test]
    fn test_parse_select_errors() {
        assert!(matches!(
            parse("select from Users where age = thirty"),
            Err(DbError::InvalidLiteral(ref t)) if t == "thirty"
        ));
        assert!(matches!(
            parse("select Users"),
            Err(DbError::MalformedCommand { command: "select", .. })
        ));
        assert!(matches!(
            parse("select from Users where age"),
            Err(DbError::MalformedCondition(_))
        ));
    }

    #[test]
    fn test_parse_update() {
        assert_eq!(
            parse(r#"update Users set age = 26 where name = "Bob""#).unwrap(),
            Command::Update(Update {
                table: "Users".into(),
                set: Condition::single("age", Value::Int(26)),
                filter: Condition::single("name", "Bob"),
            })
        );
    }

    #[test]
    fn test_parse_update_errors() {
        assert!(matches!(
            parse("update Users set age = 26"),
            Err(DbError::MalformedCommand { command: "update", .. })
        ));
        assert!(matches!(
            parse("update Users set age where ID = 1"),
            Err(DbError::MalformedCondition(_))
        ));
        assert!(matches!(
            parse("update Users set age = 1 where = 1"),
            Err(DbError::MalformedCondition(_))
        ));
    }

    #[test]
    fn test_parse_delete() {
        assert_eq!(
            parse("delete from Users where ID = 1").unwrap(),
            Command::Delete(Delete {
                table: "Users".into(),
                filter: Condition::single("ID", Value::Int(1)),
            })
        );
        assert_eq!(
            parse("DELETE FROM Users WHERE active = false").unwrap(),
            Command::Delete(Delete {
                table: "Users".into(),
                filter: Condition::single("active", false),
            })
        );
    }

    #[test]
    fn test_parse_delete_errors() {
        assert!(matches!(
            parse("delete from"),
            Err(DbError::MissingTableName(_))
        ));
        assert!(matches!(
            parse("delete from where ID = 1"),
            Err(DbError::MissingTableName(_))
        ));
        assert!(matches!(
            parse("delete Users where ID = 1"),
            Err(DbError::MalformedCommand { command: "delete", .. })
        ));
        assert!(matches!(
            parse("delete from Users"),
            Err(DbError::MalformedCondition(_))
        ));
    }

    #[test]
    fn test_parse_values_without_parens() {
        assert_eq!(
            parse_values(" 1, \"x\" ").unwrap(),
            vec![Value::Int(1), Value::from("x")]
        );
        assert!(parse_values("()").unwrap().is_empty());
    }
}
