//! Normalized build/test records and the table that holds them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// Placeholder for any field the source plan left out.
pub const UNKNOWN: &str = "unknown";

/// A record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Job the record belongs to
    JobName,
    /// Build within the job
    BuildName,
    /// Test name
    TestName,
    /// Target architecture of the build
    Architecture,
    /// Compiler toolchain of the build
    Toolchain,
    /// Device the test runs on
    Device,
}

impl Field {
    /// All fields in schema (CSV column) order.
    pub const ALL: [Self; 6] = [
        Self::JobName,
        Self::BuildName,
        Self::TestName,
        Self::Architecture,
        Self::Toolchain,
        Self::Device,
    ];

    /// Filterable fields in sidebar order.
    pub const SIDEBAR: [Self; 5] = [
        Self::BuildName,
        Self::TestName,
        Self::JobName,
        Self::Architecture,
        Self::Device,
    ];

    /// Stable key used in query strings and CSV headers.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::JobName => "job_name",
            Self::BuildName => "build_name",
            Self::TestName => "test_name",
            Self::Architecture => "architecture",
            Self::Toolchain => "toolchain",
            Self::Device => "device",
        }
    }

    /// Human readable column heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::JobName => "Job Name",
            Self::BuildName => "Build Name",
            Self::TestName => "Test Name",
            Self::Architecture => "Architecture",
            Self::Toolchain => "Toolchain",
            Self::Device => "Device",
        }
    }

    /// Plural heading for sidebar widgets.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::JobName => "Job Names",
            Self::BuildName => "Build Names",
            Self::TestName => "Test Names",
            Self::Architecture => "Architectures",
            Self::Toolchain => "Toolchains",
            Self::Device => "Devices",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when a string names no known field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field '{}'", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_name" | "job" => Ok(Self::JobName),
            "build_name" | "build" => Ok(Self::BuildName),
            "test_name" | "test" => Ok(Self::TestName),
            "architecture" | "target_arch" | "arch" => Ok(Self::Architecture),
            "toolchain" => Ok(Self::Toolchain),
            "device" => Ok(Self::Device),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

/// One build/test observation.
///
/// Every field is always present; values the plan omitted hold [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    job_name: String,
    build_name: String,
    test_name: String,
    architecture: String,
    toolchain: String,
    device: String,
}

impl Record {
    /// Create a record with unknown architecture, toolchain and device.
    #[must_use]
    pub fn new(
        job_name: impl Into<String>,
        build_name: impl Into<String>,
        test_name: impl Into<String>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            build_name: build_name.into(),
            test_name: test_name.into(),
            architecture: UNKNOWN.to_string(),
            toolchain: UNKNOWN.to_string(),
            device: UNKNOWN.to_string(),
        }
    }

    /// Set the architecture. Empty values become [`UNKNOWN`].
    #[must_use]
    pub fn architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = or_unknown(architecture.into());
        self
    }

    /// Set the toolchain. Empty values become [`UNKNOWN`].
    #[must_use]
    pub fn toolchain(mut self, toolchain: impl Into<String>) -> Self {
        self.toolchain = or_unknown(toolchain.into());
        self
    }

    /// Set the device. Empty values become [`UNKNOWN`].
    #[must_use]
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = or_unknown(device.into());
        self
    }

    /// Value of `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::JobName => &self.job_name,
            Field::BuildName => &self.build_name,
            Field::TestName => &self.test_name,
            Field::Architecture => &self.architecture,
            Field::Toolchain => &self.toolchain,
            Field::Device => &self.device,
        }
    }

    #[must_use]
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    #[must_use]
    pub fn build_name(&self) -> &str {
        &self.build_name
    }

    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    #[must_use]
    pub fn arch(&self) -> &str {
        &self.architecture
    }

    #[must_use]
    pub fn toolchain_name(&self) -> &str {
        &self.toolchain
    }

    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.device
    }
}

fn or_unknown(value: String) -> String {
    if value.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        value
    }
}

/// Ordered, immutable sequence of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    /// Create a table from records, keeping their order.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Iterate records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// All records as a slice.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct values of `field` in first-appearance order.
    #[must_use]
    pub fn distinct(&self, field: Field) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.get(field))
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Distinct values of `field`, sorted.
    #[must_use]
    pub fn distinct_sorted(&self, field: Field) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.get(field))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of distinct values of `field`.
    #[must_use]
    pub fn count_distinct(&self, field: Field) -> usize {
        self.records
            .iter()
            .map(|r| r.get(field))
            .collect::<HashSet<_>>()
            .len()
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
