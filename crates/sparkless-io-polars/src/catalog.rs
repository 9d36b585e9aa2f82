//! In-process table catalog standing in for a JDBC database.
//!
//! Tables are grouped by connection `url` and looked up by name
//! (case-insensitively). `query` runs through Polars SQL over every table
//! registered under the same url. Schema-qualified tables (`salesLT.Product`)
//! are also visible to SQL by their last segment (`product`) unless that name
//! is taken or ambiguous.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use polars::prelude::{DataFrame as PlDataFrame, IntoLazy};
use polars::sql::SQLContext;

use sparkless_io_core::EngineError;

type Tables = HashMap<String, HashMap<String, PlDataFrame>>;

fn table_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Named tables per connection url.
#[derive(Default)]
pub struct TableCatalog {
    tables: RwLock<Tables>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_guard(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, EngineError> {
        self.tables
            .read()
            .map_err(|_| EngineError::Internal("table catalog lock poisoned".into()))
    }

    /// Create or replace `table` under `url`.
    pub fn register(&self, url: &str, table: &str, df: PlDataFrame) -> Result<(), EngineError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| EngineError::Internal("table catalog lock poisoned".into()))?;
        tables
            .entry(url.to_string())
            .or_default()
            .insert(table_key(table), df);
        Ok(())
    }

    pub fn get(&self, url: &str, table: &str) -> Result<PlDataFrame, EngineError> {
        self.read_guard()?
            .get(url)
            .and_then(|t| t.get(&table_key(table)))
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("table '{table}' at '{url}'")))
    }

    /// Table names registered under `url`, sorted.
    pub fn table_names(&self, url: &str) -> Result<Vec<String>, EngineError> {
        let mut names: Vec<String> = self
            .read_guard()?
            .get(url)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        Ok(names)
    }

    /// Run `sql` against the tables registered under `url`.
    pub fn query(&self, url: &str, sql: &str) -> Result<PlDataFrame, EngineError> {
        let mut ctx = SQLContext::new();
        {
            let tables = self.read_guard()?;
            if let Some(tables) = tables.get(url) {
                for (name, df) in tables {
                    ctx.register(name, df.clone().lazy());
                }
                for (alias, name) in unqualified_aliases(tables.keys()) {
                    ctx.register(&alias, tables[name].clone().lazy());
                }
            }
        }
        ctx.execute(sql)
            .and_then(|lf| lf.collect())
            .map_err(|e| EngineError::Sql(e.to_string()))
    }
}

/// `schema.table` keys whose bare `table` is neither registered nor shared
/// with another qualified key.
fn unqualified_aliases<'a>(
    names: impl Iterator<Item = &'a String> + Clone,
) -> Vec<(String, &'a String)> {
    let taken: HashSet<&str> = names.clone().map(String::as_str).collect();
    let mut seen: HashMap<&str, Option<&'a String>> = HashMap::new();
    for name in names {
        if let Some((_, bare)) = name.rsplit_once('.') {
            if bare.is_empty() || taken.contains(bare) {
                continue;
            }
            seen.entry(bare)
                .and_modify(|slot| *slot = None)
                .or_insert(Some(name));
        }
    }
    let mut aliases: Vec<(String, &String)> = seen
        .into_iter()
        .filter_map(|(bare, name)| name.map(|n| (bare.to_string(), n)))
        .collect();
    aliases.sort();
    aliases
}
