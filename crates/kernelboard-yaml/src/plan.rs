//! Raw YAML plan types, as published by test-plan producers.
//!
//! Leaf values stay as YAML values here. The loader validates them into
//! the strict record schema.

use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

/// A test plan file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Jobs in document order
    #[serde(default)]
    pub jobs: Option<Vec<Job>>,
}

/// A job: a set of builds, each running the job's test groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    /// Job name (required)
    #[serde(default)]
    pub name: Option<Value>,
    /// Builds
    #[serde(default)]
    pub builds: Option<Vec<Build>>,
    /// Test groups run against every build
    #[serde(default)]
    pub tests: Option<Vec<TestGroup>>,
}

/// One kernel build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Build {
    /// Build name
    #[serde(default)]
    pub build_name: Option<Value>,
    /// Target architecture
    #[serde(default, alias = "architecture")]
    pub target_arch: Option<Value>,
    /// Compiler toolchain
    #[serde(default)]
    pub toolchain: Option<Value>,
    /// Test groups specific to this build
    #[serde(default)]
    pub tests: Option<Vec<TestGroup>>,
}

/// A device and the tests it runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestGroup {
    /// Device name, or a mapping with a `name` key
    #[serde(default)]
    pub device: Option<Value>,
    /// Test names, a list or a single name
    #[serde(default)]
    pub tests: Option<Value>,
}

impl Plan {
    /// Parse a plan from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or a section has the wrong shape.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml_ng::Error> {
        serde_yaml_ng::from_str(yaml)
    }

    /// Serialize the plan back to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_YAML: &str = r#"
jobs:
  - name: lkft-6.12
    builds:
      - build_name: gcc-13-lkftconfig
        target_arch: arm64
        toolchain: gcc-13
      - build_name: clang-17-lkftconfig
        architecture: x86_64
        toolchain: clang-17
    tests:
      - device: rk3399-rock-pi-4b
        tests: [ltp-syscalls, kselftest-net]
"#;

    #[test]
    fn test_parse_plan() {
        let plan = Plan::from_yaml(EXAMPLE_YAML).unwrap();
        let jobs = plan.jobs.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name.as_ref().and_then(Value::as_str), Some("lkft-6.12"));
        assert_eq!(jobs[0].builds.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_architecture_alias() {
        let plan = Plan::from_yaml(EXAMPLE_YAML).unwrap();
        let builds = plan.jobs.unwrap().remove(0).builds.unwrap();
        assert_eq!(builds[1].target_arch.as_ref().and_then(Value::as_str), Some("x86_64"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let plan = Plan::from_yaml("jobs: []\nproject: linux-stable\n").unwrap();
        assert_eq!(plan.jobs.map(|j| j.len()), Some(0));
    }

    #[test]
    fn test_wrong_shape_is_error() {
        assert!(Plan::from_yaml("jobs: 3").is_err());
        assert!(Plan::from_yaml("jobs:\n  - builds: yes\n").is_err());
    }

    #[test]
    fn test_roundtrip() {
        let plan = Plan::from_yaml(EXAMPLE_YAML).unwrap();
        let yaml = plan.to_yaml().unwrap();
        let again = Plan::from_yaml(&yaml).unwrap();
        assert_eq!(again.jobs.map(|j| j.len()), Some(1));
    }
}
