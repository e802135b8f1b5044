//! Schema provisioning.
//!
//! The record tables are created and torn down from a schema script of
//! `;`-terminated statements (see `assets/tables.sql`): `--` comment lines
//! are stripped, the `{prefix}` placeholder is substituted with the store's
//! configured table-name prefix, and teardown runs only the statements
//! containing `DROP`. Everything executes through the raw passthrough -
//! provisioning never goes through the command translator.

use std::path::Path;

use tracing::{error, info};

use crate::{Error, Result, Store};

/// Placeholder substituted with the configured table-name prefix.
const PREFIX_PLACEHOLDER: &str = "{prefix}";

/// Load a schema script from disk and split it into statements.
pub fn load_script(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::Script {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(parse_script(&text))
}

/// Split script text into statements: `--` comment lines and blank lines
/// are stripped, the rest joins into one stream split on `;`.
pub fn parse_script(text: &str) -> Vec<String> {
    let mut joined = String::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("--") {
            continue;
        }
        joined.push_str(line);
        joined.push(' ');
    }
    joined
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Provisioning driver bound to one store.
pub struct Provisioner<'a> {
    store: &'a mut Store,
    prefix: String,
}

impl<'a> Provisioner<'a> {
    /// Bind to a store; the `{prefix}` substitution uses the store's
    /// configured table-name prefix.
    pub fn new(store: &'a mut Store) -> Self {
        let prefix = store.table_prefix().to_string();
        Self { store, prefix }
    }

    /// Execute every statement of the script. The first failure aborts and
    /// names the offending statement.
    pub fn create_tables(&mut self, statements: &[String]) -> Result<()> {
        for statement in statements {
            self.run(statement)?;
        }
        info!(count = statements.len(), "record tables created");
        Ok(())
    }

    /// Tear down: execute only the statements containing `DROP`
    /// (case-insensitive).
    pub fn drop_tables(&mut self, statements: &[String]) -> Result<()> {
        let mut dropped = 0usize;
        for statement in statements {
            if !statement.to_ascii_uppercase().contains("DROP") {
                continue;
            }
            self.run(statement)?;
            dropped += 1;
        }
        info!(count = dropped, "record tables dropped");
        Ok(())
    }

    fn run(&mut self, statement: &str) -> Result<()> {
        let statement = statement.replace(PREFIX_PLACEHOLDER, &self.prefix);
        if self.store.run_raw(&statement).is_none() {
            error!(statement = %statement, "schema statement failed");
            return Err(Error::Provisioning { statement });
        }
        Ok(())
    }
}
