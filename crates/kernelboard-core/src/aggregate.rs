//! Aggregations feeding each chart family.
//!
//! Every view is rebuilt from a table on demand. Rows are ordered by
//! descending count, then ascending label, so identical input always yields
//! identical output.

use crate::record::{Field, Table};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// One category and its tally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountRow {
    /// Category label
    pub label: String,
    /// Number of records in the category
    pub count: usize,
}

impl CountRow {
    #[must_use]
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Counts grouped by a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateView {
    field: Field,
    rows: Vec<CountRow>,
}

impl AggregateView {
    /// Build a view from unordered rows.
    #[must_use]
    pub fn from_rows(field: Field, mut rows: Vec<CountRow>) -> Self {
        rows.sort_by(order_rows);
        Self { field, rows }
    }

    /// Grouping field.
    #[must_use]
    pub const fn field(&self) -> Field {
        self.field
    }

    /// Rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[CountRow] {
        &self.rows
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count for `label`, zero when absent.
    #[must_use]
    pub fn get(&self, label: &str) -> usize {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map_or(0, |r| r.count)
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Largest single count.
    #[must_use]
    pub fn max(&self) -> usize {
        self.rows.iter().map(|r| r.count).max().unwrap_or(0)
    }

    /// Add zero rows for every label in `domain` the view does not contain.
    #[must_use]
    pub fn with_domain<I, S>(self, domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rows = self.rows;
        let present: BTreeSet<String> = rows.iter().map(|r| r.label.clone()).collect();
        let missing: BTreeSet<String> = domain
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .filter(|label| !present.contains(label))
            .collect();
        rows.extend(missing.into_iter().map(|label| CountRow::new(label, 0)));
        Self::from_rows(self.field, rows)
    }
}

fn order_rows(a: &CountRow, b: &CountRow) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label))
}

/// Count records per distinct value of `field`.
#[must_use]
pub fn distribution(table: &Table, field: Field) -> AggregateView {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in table {
        *counts.entry(record.get(field)).or_default() += 1;
    }
    let rows = counts
        .into_iter()
        .map(|(label, count)| CountRow::new(label, count))
        .collect();
    AggregateView::from_rows(field, rows)
}

/// Records per architecture.
#[must_use]
pub fn architecture_distribution(table: &Table) -> AggregateView {
    distribution(table, Field::Architecture)
}

/// Records per toolchain.
#[must_use]
pub fn toolchain_distribution(table: &Table) -> AggregateView {
    distribution(table, Field::Toolchain)
}

/// Records per device.
#[must_use]
pub fn device_distribution(table: &Table) -> AggregateView {
    distribution(table, Field::Device)
}

/// Tests (records) per job.
#[must_use]
pub fn tests_per_job(table: &Table) -> AggregateView {
    distribution(table, Field::JobName)
}

/// A (toolchain, job, architecture) cell of the cross tabulation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossTabRow {
    pub toolchain: String,
    pub job_name: String,
    pub architecture: String,
    pub count: usize,
}

impl CrossTabRow {
    /// Row label used on the heatmap's vertical axis.
    #[must_use]
    pub fn job_arch(&self) -> String {
        format!("{} ({})", self.job_name, self.architecture)
    }
}

/// Record counts per (toolchain, job, architecture) triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTab {
    rows: Vec<CrossTabRow>,
}

impl CrossTab {
    /// Non-zero cells ordered by descending count, then labels.
    #[must_use]
    pub fn rows(&self) -> &[CrossTabRow] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all cells.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Distinct toolchains, sorted.
    #[must_use]
    pub fn toolchains(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.toolchain.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct `"job (arch)"` labels, sorted.
    #[must_use]
    pub fn job_arch_labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(CrossTabRow::job_arch)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Count for a cell, zero when absent.
    #[must_use]
    pub fn get(&self, toolchain: &str, job_name: &str, architecture: &str) -> usize {
        self.rows
            .iter()
            .find(|r| {
                r.toolchain == toolchain && r.job_name == job_name && r.architecture == architecture
            })
            .map_or(0, |r| r.count)
    }
}

/// Cross tabulate toolchain × job × architecture.
#[must_use]
pub fn cross_tab(table: &Table) -> CrossTab {
    let mut counts: BTreeMap<(&str, &str, &str), usize> = BTreeMap::new();
    for r in table {
        *counts
            .entry((r.toolchain_name(), r.job_name(), r.arch()))
            .or_default() += 1;
    }
    let mut rows: Vec<CrossTabRow> = counts
        .into_iter()
        .map(|((toolchain, job_name, architecture), count)| CrossTabRow {
            toolchain: toolchain.to_string(),
            job_name: job_name.to_string(),
            architecture: architecture.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.toolchain.cmp(&b.toolchain))
            .then_with(|| a.job_name.cmp(&b.job_name))
            .then_with(|| a.architecture.cmp(&b.architecture))
    });
    CrossTab { rows }
}

/// Build instances and test count for one build name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildTestPair {
    pub build_name: String,
    /// Distinct (job, build) instances carrying this build name
    pub distinct_builds: usize,
    /// Records under this build name
    pub tests: usize,
}

/// Pair each build name with its build instance count and test count.
#[must_use]
pub fn builds_vs_tests(table: &Table) -> Vec<BuildTestPair> {
    let mut groups: BTreeMap<&str, (BTreeSet<&str>, usize)> = BTreeMap::new();
    for r in table {
        let entry = groups.entry(r.build_name()).or_default();
        entry.0.insert(r.job_name());
        entry.1 += 1;
    }
    let mut pairs: Vec<BuildTestPair> = groups
        .into_iter()
        .map(|(build_name, (jobs, tests))| BuildTestPair {
            build_name: build_name.to_string(),
            distinct_builds: jobs.len(),
            tests,
        })
        .collect();
    pairs.sort_by(|a, b| {
        b.tests
            .cmp(&a.tests)
            .then_with(|| a.build_name.cmp(&b.build_name))
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply, FilterSelection};
    use crate::record::Record;

    fn two_jobs() -> Table {
        Table::new(vec![
            Record::new("job-a", "defconfig", "ltp")
                .architecture("arm64")
                .toolchain("gcc"),
            Record::new("job-a", "defconfig", "kunit")
                .architecture("arm64")
                .toolchain("gcc"),
            Record::new("job-b", "defconfig", "ltp")
                .architecture("x86")
                .toolchain("gcc"),
            Record::new("job-b", "defconfig", "kunit")
                .architecture("x86")
                .toolchain("gcc"),
        ])
    }

    #[test]
    fn test_architecture_distribution() {
        let view = architecture_distribution(&two_jobs());
        assert_eq!(view.get("arm64"), 2);
        assert_eq!(view.get("x86"), 2);
        assert_eq!(view.total(), 4);
        assert_eq!(view.field(), Field::Architecture);
    }

    #[test]
    fn test_filtered_tests_per_job() {
        let sel = FilterSelection::new().with(Field::Architecture, ["arm64"]);
        let filtered = apply(&two_jobs(), &sel);
        assert_eq!(filtered.len(), 2);
        let view = tests_per_job(&filtered);
        assert_eq!(view.rows(), &[CountRow::new("job-a", 2)]);
    }

    #[test]
    fn test_order_count_desc_then_label() {
        let table = Table::new(vec![
            Record::new("j", "b", "t").toolchain("clang"),
            Record::new("j", "b", "t").toolchain("gcc"),
            Record::new("j", "b", "t").toolchain("gcc"),
            Record::new("j", "b", "t").toolchain("armcc"),
        ]);
        let labels: Vec<_> = toolchain_distribution(&table)
            .rows()
            .iter()
            .map(|r| r.label.clone())
            .collect();
        assert_eq!(labels, vec!["gcc", "armcc", "clang"]);
    }

    #[test]
    fn test_unknown_device_category() {
        let table = Table::new(vec![
            Record::new("j", "b", "t").device("juno"),
            Record::new("j", "b", "t2"),
        ]);
        let view = device_distribution(&table);
        assert_eq!(view.get("unknown"), 1);
        assert_eq!(view.get("juno"), 1);
    }

    #[test]
    fn test_empty_table_gives_zero_views() {
        let empty = Table::default();
        assert!(architecture_distribution(&empty).is_empty());
        assert_eq!(tests_per_job(&empty).total(), 0);
        assert!(cross_tab(&empty).is_empty());
        assert!(builds_vs_tests(&empty).is_empty());
    }

    #[test]
    fn test_with_domain_fills_zeros() {
        let view = architecture_distribution(&Table::default()).with_domain(["x86", "arm64"]);
        assert_eq!(view.len(), 2);
        assert!(view.rows().iter().all(|r| r.count == 0));
        assert_eq!(view.rows()[0].label, "arm64");
    }

    #[test]
    fn test_with_domain_keeps_existing_counts() {
        let view = architecture_distribution(&two_jobs()).with_domain(["riscv", "x86"]);
        assert_eq!(view.get("x86"), 2);
        assert_eq!(view.get("riscv"), 0);
        assert_eq!(view.rows().last().map(|r| r.label.as_str()), Some("riscv"));
    }

    #[test]
    fn test_cross_tab_counts() {
        let tab = cross_tab(&two_jobs());
        assert_eq!(tab.get("gcc", "job-a", "arm64"), 2);
        assert_eq!(tab.get("gcc", "job-b", "x86"), 2);
        assert_eq!(tab.get("clang", "job-a", "arm64"), 0);
        assert_eq!(tab.total(), 4);
        assert_eq!(tab.toolchains(), vec!["gcc"]);
        assert_eq!(tab.job_arch_labels(), vec!["job-a (arm64)", "job-b (x86)"]);
    }

    #[test]
    fn test_builds_vs_tests() {
        let mut records = two_jobs().records().to_vec();
        records.push(Record::new("job-a", "allmodconfig", "build"));
        let pairs = builds_vs_tests(&Table::new(records));
        assert_eq!(
            pairs[0],
            BuildTestPair {
                build_name: "defconfig".into(),
                distinct_builds: 2,
                tests: 4
            }
        );
        assert_eq!(pairs[1].build_name, "allmodconfig");
        assert_eq!(pairs[1].distinct_builds, 1);
    }

    #[test]
    fn test_views_are_deterministic() {
        let a = serde_json::to_string(&cross_tab(&two_jobs())).unwrap();
        let b = serde_json::to_string(&cross_tab(&two_jobs())).unwrap();
        assert_eq!(a, b);
    }
}
