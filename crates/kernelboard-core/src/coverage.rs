//! Device/test coverage across several plan files.
//!
//! Unlike the record table, coverage de-duplicates: a device running the
//! same test twice in one file is one mapping.

use crate::aggregate::{AggregateView, CountRow};
use crate::record::{Field, Table, UNKNOWN};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A device running a test, as declared by one plan file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Mapping {
    pub device: String,
    pub test: String,
    pub file: String,
}

/// Headline numbers of a coverage analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageMetrics {
    pub total_devices: usize,
    pub total_tests: usize,
    pub total_files: usize,
    pub total_mappings: usize,
}

/// De-duplicated device/test/file mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    mappings: BTreeSet<Mapping>,
}

impl Coverage {
    /// Collect mappings from labelled tables. Records without a known device
    /// carry no coverage information and are skipped.
    pub fn build<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Table)>,
    {
        let mut mappings = BTreeSet::new();
        for (file, table) in sources {
            for record in table {
                if record.device_name() == UNKNOWN {
                    continue;
                }
                mappings.insert(Mapping {
                    device: record.device_name().to_string(),
                    test: record.test_name().to_string(),
                    file: file.to_string(),
                });
            }
        }
        log::debug!("coverage built with {} mappings", mappings.len());
        Self { mappings }
    }

    /// All mappings, sorted by device, test, file.
    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Devices, sorted.
    #[must_use]
    pub fn devices(&self) -> Vec<&str> {
        self.distinct(|m| &m.device)
    }

    /// Tests, sorted.
    #[must_use]
    pub fn tests(&self) -> Vec<&str> {
        self.distinct(|m| &m.test)
    }

    /// Files, sorted.
    #[must_use]
    pub fn files(&self) -> Vec<&str> {
        self.distinct(|m| &m.file)
    }

    fn distinct<'a>(&'a self, key: impl Fn(&'a Mapping) -> &'a String) -> Vec<&'a str> {
        self.mappings
            .iter()
            .map(|m| key(m).as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    #[must_use]
    pub fn metrics(&self) -> CoverageMetrics {
        CoverageMetrics {
            total_devices: self.devices().len(),
            total_tests: self.tests().len(),
            total_files: self.files().len(),
            total_mappings: self.mappings.len(),
        }
    }

    /// `(test, file)` pairs for each device, sorted.
    #[must_use]
    pub fn by_device(&self) -> BTreeMap<&str, Vec<(&str, &str)>> {
        let mut out: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for m in &self.mappings {
            out.entry(m.device.as_str())
                .or_default()
                .push((m.test.as_str(), m.file.as_str()));
        }
        for rows in out.values_mut() {
            rows.sort_unstable();
        }
        out
    }

    /// `(device, file)` pairs for each test, sorted.
    #[must_use]
    pub fn by_test(&self) -> BTreeMap<&str, Vec<(&str, &str)>> {
        let mut out: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for m in &self.mappings {
            out.entry(m.test.as_str())
                .or_default()
                .push((m.device.as_str(), m.file.as_str()));
        }
        for rows in out.values_mut() {
            rows.sort_unstable();
        }
        out
    }

    /// Distinct tests per device.
    #[must_use]
    pub fn device_test_counts(&self) -> AggregateView {
        let rows = self
            .by_device()
            .into_iter()
            .map(|(device, rows)| {
                let tests: BTreeSet<&str> = rows.iter().map(|(t, _)| *t).collect();
                CountRow::new(device, tests.len())
            })
            .collect();
        AggregateView::from_rows(Field::Device, rows)
    }

    /// Distinct devices per test.
    #[must_use]
    pub fn test_device_counts(&self) -> AggregateView {
        let rows = self
            .by_test()
            .into_iter()
            .map(|(test, rows)| {
                let devices: BTreeSet<&str> = rows.iter().map(|(d, _)| *d).collect();
                CountRow::new(test, devices.len())
            })
            .collect();
        AggregateView::from_rows(Field::TestName, rows)
    }

    /// Keep mappings whose device and test are in the given sets. An empty
    /// set does not restrict.
    #[must_use]
    pub fn restrict(&self, devices: &BTreeSet<String>, tests: &BTreeSet<String>) -> Self {
        let mappings = self
            .mappings
            .iter()
            .filter(|m| devices.is_empty() || devices.contains(&m.device))
            .filter(|m| tests.is_empty() || tests.contains(&m.test))
            .cloned()
            .collect();
        Self { mappings }
    }

    /// Keep mappings where any column contains `term`, ignoring case.
    #[must_use]
    pub fn search(&self, term: &str) -> Self {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }
        let mappings = self
            .mappings
            .iter()
            .filter(|m| {
                [&m.device, &m.test, &m.file]
                    .iter()
                    .any(|s| s.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Self { mappings }
    }
}
