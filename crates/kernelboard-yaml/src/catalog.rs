//! A directory of plan files and per-file summaries.

use crate::error::LoadError;
use crate::loader::load_file;
use kernelboard_core::{Field, Table};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One plan file known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanFile {
    /// File name shown in the file selector
    pub name: String,
    /// Full path
    pub path: PathBuf,
}

/// Plan files available to the dashboard, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    files: Vec<PlanFile>,
}

impl Catalog {
    /// List `*.yml` and `*.yaml` files directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the directory cannot be read.
    pub fn scan(dir: &Path) -> Result<Self, LoadError> {
        let io_err = |source: std::io::Error| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_yaml = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yml" | "yaml")
            );
            if path.is_file() && is_yaml {
                files.push(PlanFile {
                    name: file_name(&path),
                    path,
                });
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        log::info!("found {} plan files in {}", files.len(), dir.display());
        Ok(Self { files })
    }

    /// Catalog holding a single file.
    #[must_use]
    pub fn single(path: &Path) -> Self {
        Self {
            files: vec![PlanFile {
                name: file_name(path),
                path: path.to_path_buf(),
            }],
        }
    }

    #[must_use]
    pub fn files(&self) -> &[PlanFile] {
        &self.files
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&PlanFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// First file, used when nothing is selected.
    #[must_use]
    pub fn first(&self) -> Option<&PlanFile> {
        self.files.first()
    }

    /// Load every file, skipping (and logging) the ones that fail.
    #[must_use]
    pub fn load_all(&self) -> Vec<(String, Table)> {
        self.files
            .iter()
            .filter_map(|f| match load_file(&f.path) {
                Ok(table) => Some((f.name.clone(), table)),
                Err(e) => {
                    log::warn!("skipping {}: {e}", f.name);
                    None
                }
            })
            .collect()
    }

    /// Summary of every file that loads.
    #[must_use]
    pub fn summaries(&self) -> Vec<FileSummary> {
        self.load_all()
            .iter()
            .map(|(name, table)| FileSummary::from_table(name, table))
            .collect()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Device and test spread of one plan file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub file: String,
    pub device_count: usize,
    pub test_count: usize,
    pub devices: Vec<String>,
    pub tests: Vec<String>,
}

impl FileSummary {
    #[must_use]
    pub fn from_table(file: &str, table: &Table) -> Self {
        let owned = |values: Vec<&str>| values.into_iter().map(str::to_string).collect::<Vec<_>>();
        let devices = owned(table.distinct_sorted(Field::Device));
        let tests = owned(table.distinct_sorted(Field::TestName));
        Self {
            file: file.to_string(),
            device_count: devices.len(),
            test_count: tests.len(),
            devices,
            tests,
        }
    }

    /// Whether any test name contains `term`, ignoring case.
    #[must_use]
    pub fn mentions_test(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.tests.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

/// Statistics over a set of file summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub files: usize,
    pub average_tests: f64,
    pub max_tests: usize,
}

impl CatalogStats {
    #[must_use]
    pub fn from_summaries(summaries: &[FileSummary]) -> Self {
        if summaries.is_empty() {
            return Self::default();
        }
        let total: usize = summaries.iter().map(|s| s.test_count).sum();
        Self {
            files: summaries.len(),
            average_tests: total as f64 / summaries.len() as f64,
            max_tests: summaries.iter().map(|s| s.test_count).max().unwrap_or(0),
        }
    }
}
