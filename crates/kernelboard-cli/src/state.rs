//! Process-wide dashboard state: the plan catalog and loaded tables.
//!
//! Tables are loaded on first use and kept until an explicit reload.
//! The chosen plan file and the selections never live here; they travel in
//! each request's query string.

use kernelboard_core::{Coverage, Table};
use kernelboard_yaml::{load_file, Catalog, FileSummary};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outcome of loading one plan file. Errors are kept as their message so
/// pages can show them.
pub(crate) type Loaded = Result<Arc<Table>, String>;

pub(crate) struct AppState {
    title: String,
    catalog: Catalog,
    tables: BTreeMap<String, Loaded>,
}

impl AppState {
    /// State for `catalog`, with its default file loaded.
    pub(crate) fn new(title: impl Into<String>, catalog: Catalog) -> Self {
        let mut state = Self {
            title: title.into(),
            catalog,
            tables: BTreeMap::new(),
        };
        let default = state.default_file().to_string();
        let _ = state.table(&default);
        state
    }

    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    pub(crate) const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// First file of the catalog, shown when a request names none.
    pub(crate) fn default_file(&self) -> &str {
        self.catalog.first().map_or("", |f| f.name.as_str())
    }

    /// The plan file a request asked for, or the default file when it named
    /// none or one the catalog does not have.
    pub(crate) fn resolve(&self, requested: Option<&str>) -> String {
        requested
            .filter(|name| self.catalog.find(name).is_some())
            .unwrap_or_else(|| self.default_file())
            .to_string()
    }

    /// Table of `name`, or the message of its load error.
    pub(crate) fn table(&mut self, name: &str) -> Loaded {
        self.ensure_loaded(name)
    }

    /// Re-read `name` from disk.
    pub(crate) fn reload(&mut self, name: &str) -> Loaded {
        self.tables.remove(name);
        log::info!("reloading {name}");
        self.ensure_loaded(name)
    }

    /// Every catalog file that loads, in catalog order.
    pub(crate) fn all_tables(&mut self) -> Vec<(String, Arc<Table>)> {
        let names: Vec<String> = self.catalog.files().iter().map(|f| f.name.clone()).collect();
        names
            .into_iter()
            .filter_map(|name| {
                let table = self.ensure_loaded(&name).ok()?;
                Some((name, table))
            })
            .collect()
    }

    pub(crate) fn coverage(&mut self) -> Coverage {
        let tables = self.all_tables();
        Coverage::build(tables.iter().map(|(name, table)| (name.as_str(), table.as_ref())))
    }

    pub(crate) fn summaries(&mut self) -> Vec<FileSummary> {
        self.all_tables()
            .iter()
            .map(|(name, table)| FileSummary::from_table(name, table))
            .collect()
    }

    fn ensure_loaded(&mut self, name: &str) -> Loaded {
        if let Some(loaded) = self.tables.get(name) {
            return loaded.clone();
        }
        let loaded = match self.catalog.find(name) {
            Some(file) => load_file(&file.path).map(Arc::new).map_err(|e| {
                log::error!("failed to load {name}: {e}");
                e.to_string()
            }),
            None => Err(format!("No plan file named '{name}'")),
        };
        self.tables.insert(name.to_string(), loaded.clone());
        loaded
    }
}
