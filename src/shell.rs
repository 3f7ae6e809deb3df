//! Command loop plumbing: confirmation, timing, rendering and error reporting.
//!
//! The interactive terminal lives in `main.rs`; everything here writes to a
//! generic [Write] so it can be driven from tests.

use std::io::Write;
use std::ops::ControlFlow;
use std::time::Instant;

use comfy_table::{Cell, ContentArrangement, Table};
use tracing::error;

use crate::ast::Command;
use crate::config::{Config, OutputFormat};
use crate::database::{Database, Outcome, QueryResult};
use crate::error::{DbError, Result};
use crate::parser::Parser;
use crate::storage::Storage;

const HELP: &str = "\
Commands:
  create_table <name> <column:type> ...                 create a table (types: int, str, bool)
  list_tables                                           list all tables
  drop_table <name>                                     drop a table
  insert into <name> values (<value>, ...)              add a record
  select from <name> [where <column> = <value>]         read records
  update <name> set <column> = <value> where <column> = <value>
                                                        change records
  delete from <name> where <column> = <value>           remove records
  info <name>                                           describe a table
  help                                                  show this help
  exit | quit                                           leave the program

Values: \"text\", 42, true, false";

/// Asks the user a yes/no question.
pub trait Confirm {
    /// Returns `true` only for an explicit yes.
    fn confirm(&mut self, question: &str) -> bool;
}

/// Runs commands against a [Database] and writes what a user should see.
pub struct Shell<S: Storage, W: Write> {
    db: Database<S>,
    out: W,
    confirm_destructive: bool,
    timing: bool,
    output: OutputFormat,
}

impl<S: Storage, W: Write> Shell<S, W> {
    pub fn new(db: Database<S>, config: &Config, out: W) -> Self {
        Self {
            db,
            out,
            confirm_destructive: config.confirm_destructive,
            timing: config.timing,
            output: config.output,
        }
    }

    pub fn database(&self) -> &Database<S> {
        &self.db
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Handles one input line. Failures are printed, never returned; only an
    /// `exit` command breaks the loop.
    pub fn handle_line(&mut self, line: &str, confirm: &mut impl Confirm) -> ControlFlow<()> {
        let line = line.trim();
        if line.is_empty() {
            return ControlFlow::Continue(());
        }

        let result = self.dispatch(line, confirm);
        let flow = if matches!(result, Ok(Some(Outcome::Exit))) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        };
        let written = match result {
            Ok(Some(Outcome::Exit)) => writeln!(self.out, "Bye."),
            Ok(Some(outcome)) => self.render(&outcome),
            Ok(None) => writeln!(self.out, "Operation cancelled."),
            Err(e) => {
                let message = describe_error(&e);
                writeln!(self.out, "{message}")
            }
        };
        if let Err(e) = written {
            error!(error = %e, "failed to write output");
        }
        flow
    }

    /// Parse, confirm, then run (timed where enabled). `Ok(None)` means the
    /// user declined the confirmation.
    fn dispatch(&mut self, line: &str, confirm: &mut impl Confirm) -> Result<Option<Outcome>> {
        let command = Parser::new(line).parse()?;

        if self.confirm_destructive {
            if let Some(action) = destructive_action(&command) {
                let question = format!("Are you sure you want to perform \"{action}\"? [y/n]: ");
                if !confirm.confirm(&question) {
                    return Ok(None);
                }
            }
        }

        let timed = match &command {
            Command::InsertInto(_) => Some("insert"),
            Command::Select(_) => Some("select"),
            _ => None,
        };

        let start = Instant::now();
        let outcome = self.db.run(command)?;
        if let Some(name) = timed.filter(|_| self.timing) {
            writeln!(
                self.out,
                "Function {name} took {:.3} seconds.",
                start.elapsed().as_secs_f64()
            )?;
        }
        Ok(Some(outcome))
    }

    fn render(&mut self, outcome: &Outcome) -> std::io::Result<()> {
        match outcome {
            Outcome::TableCreated(schema) => {
                let columns: Vec<String> = schema.columns.iter().map(ToString::to_string).collect();
                writeln!(self.out, "Table created with columns: {}", columns.join(", "))
            }
            Outcome::TableDropped => writeln!(self.out, "Table dropped."),
            Outcome::Tables(names) if names.is_empty() => writeln!(self.out, "No tables."),
            Outcome::Tables(names) => {
                for name in names {
                    writeln!(self.out, "- {name}")?;
                }
                Ok(())
            }
            Outcome::Inserted(id) => writeln!(self.out, "Record with ID={id} added."),
            Outcome::Rows(result) => {
                let rendered = match self.output {
                    OutputFormat::Table => format_table(result),
                    OutputFormat::Json => format_json(result),
                };
                writeln!(self.out, "{rendered}")
            }
            Outcome::Updated(ids) if ids.is_empty() => writeln!(self.out, "No records matched."),
            Outcome::Updated(ids) => {
                for id in ids {
                    writeln!(self.out, "Record with ID={id} updated.")?;
                }
                Ok(())
            }
            Outcome::Deleted(ids) if ids.is_empty() => writeln!(self.out, "No records matched."),
            Outcome::Deleted(ids) => {
                for id in ids {
                    writeln!(self.out, "Record with ID={id} deleted.")?;
                }
                Ok(())
            }
            Outcome::Info(info) => writeln!(self.out, "{info}"),
            Outcome::Help => writeln!(self.out, "{HELP}"),
            Outcome::Exit => Ok(()),
        }
    }
}

fn destructive_action(command: &Command) -> Option<&'static str> {
    match command {
        Command::DropTable(_) => Some("drop table"),
        Command::Delete(_) => Some("delete records"),
        _ => None,
    }
}

/// The message shown for a failed command.
pub fn describe_error(e: &DbError) -> String {
    match e {
        DbError::UnknownCommand(name) => {
            format!("Unknown command \"{name}\". Type help for the list of commands.")
        }
        DbError::DuplicateTable(_)
        | DbError::UnknownTable(_)
        | DbError::InvalidTableName(_)
        | DbError::ReservedTableName(_)
        | DbError::InvalidColumnType { .. }
        | DbError::ArityMismatch { .. }
        | DbError::TypeMismatch { .. }
        | DbError::UnknownColumn(_)
        | DbError::MissingCondition(_) => format!("Error: {e}."),
        DbError::InvalidColumnSpec(_)
        | DbError::InvalidLiteral(_)
        | DbError::MalformedCondition(_)
        | DbError::MissingValues
        | DbError::MalformedInsert(_)
        | DbError::MissingTableName(_)
        | DbError::MalformedCommand { .. }
        | DbError::UnterminatedQuote(_) => format!("Invalid command: {e}. Please try again."),
        DbError::StorageUnavailable(_) | DbError::Io(_) | DbError::Json(_) => {
            error!(error = %e, "storage failure");
            format!("Storage error: {e}. The data directory may not be initialized.")
        }
        DbError::Config(_) => format!("Configuration error: {e}."),
    }
}

/// Formats rows as a table with schema-ordered headers.
pub fn format_table(result: &QueryResult) -> String {
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::ASCII_FULL);

    table.set_header(result.columns.iter().map(Cell::new));

    for row in &result.rows {
        let cells: Vec<Cell> = result
            .columns
            .iter()
            .map(|column| {
                Cell::new(
                    row.get(column)
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                )
            })
            .collect();
        table.add_row(cells);
    }

    table.to_string()
}

/// Formats rows as a pretty-printed JSON array.
pub fn format_json(result: &QueryResult) -> String {
    serde_json::to_string_pretty(&result.rows).unwrap_or_else(|_| "[]".to_string())
}
