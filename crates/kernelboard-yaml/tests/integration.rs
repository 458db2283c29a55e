//! Integration tests for kernelboard-yaml.
//!
//! These tests load realistic plans end-to-end and check the resulting table.

use kernelboard_core::{aggregate, apply, Field, FilterSelection};
use kernelboard_yaml::{load_file, load_str, LoadError, Plan};

// =============================================================================
// Plan Loading Integration Tests
// =============================================================================

const LKFT_PLAN: &str = r#"
jobs:
  - name: lkft-arm64
    builds:
      - build_name: gcc-13-lkftconfig
        target_arch: arm64
        toolchain: gcc-13
        kconfig: [defconfig, lkft.config]
      - build_name: clang-17-lkftconfig
        target_arch: arm64
        toolchain: clang-17
    tests:
      - device: rk3399-rock-pi-4b
        tests:
          - ltp-syscalls
          - kselftest-arm64
      - device:
          name: juno-r2
        tests: [kunit]
  - name: lkft-x86
    builds:
      - build_name: gcc-13-lkftconfig
        target_arch: x86_64
        toolchain: gcc-13
        tests:
          - device: x86
            tests: [ltp-syscalls]
    tests:
      - tests: boot
"#;

#[test]
fn test_record_count_matches_leaves() {
    let table = load_str(LKFT_PLAN).expect("valid plan");
    // lkft-arm64: 2 builds x 3 tests, lkft-x86: 1 build x (1 job-level + 1 build-level)
    assert_eq!(table.len(), 8);
}

#[test]
fn test_distributions() {
    let table = load_str(LKFT_PLAN).expect("valid plan");
    let arch = aggregate::architecture_distribution(&table);
    assert_eq!(arch.get("arm64"), 6);
    assert_eq!(arch.get("x86_64"), 2);

    let tc = aggregate::toolchain_distribution(&table);
    assert_eq!(tc.rows()[0].label, "gcc-13");
    assert_eq!(tc.get("gcc-13"), 5);
    assert_eq!(tc.get("clang-17"), 3);

    let devices = aggregate::device_distribution(&table);
    assert_eq!(devices.get("unknown"), 1);
    assert_eq!(devices.get("juno-r2"), 2);
}

#[test]
fn test_filter_then_aggregate() {
    let table = load_str(LKFT_PLAN).expect("valid plan");
    let selection = FilterSelection::new()
        .with(Field::TestName, ["ltp-syscalls"])
        .with(Field::Architecture, ["x86_64"]);
    let filtered = apply(&table, &selection);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.get(0).map(|r| r.device_name()), Some("x86"));

    let pairs = aggregate::builds_vs_tests(&filtered);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].tests, 1);
}

#[test]
fn test_builds_vs_tests_across_jobs() {
    let table = load_str(LKFT_PLAN).expect("valid plan");
    let pairs = aggregate::builds_vs_tests(&table);
    let gcc = pairs
        .iter()
        .find(|p| p.build_name == "gcc-13-lkftconfig")
        .expect("gcc build");
    assert_eq!(gcc.distinct_builds, 2);
    assert_eq!(gcc.tests, 5);
}

#[test]
fn test_load_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("kernelboard-it-{}.yml", std::process::id()));
    std::fs::write(&path, LKFT_PLAN).expect("write plan");
    let table = load_file(&path).expect("load plan");
    assert_eq!(table, load_str(LKFT_PLAN).expect("valid plan"));
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_file() {
    let err = load_file(std::path::Path::new("/nonexistent/plan.yml")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn test_malformed_build_list() {
    let err = load_str("jobs:\n  - name: j\n    builds: {a: 1}\n").unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_plan_reserialize() {
    let plan = Plan::from_yaml(LKFT_PLAN).expect("parse");
    let yaml = plan.to_yaml().expect("serialize");
    let reloaded = load_str(&yaml).expect("reload");
    assert_eq!(reloaded.len(), 8);
}

// =============================================================================
// Generated Plans
// =============================================================================

mod generated {
    use super::load_str;
    use proptest::prelude::*;

    /// Per job: number of builds, and test counts of each job-level group.
    fn plan_shape() -> impl Strategy<Value = Vec<(usize, Vec<usize>)>> {
        prop::collection::vec((0usize..4, prop::collection::vec(0usize..4, 0..3)), 0..4)
    }

    fn render(shape: &[(usize, Vec<usize>)]) -> String {
        if shape.is_empty() {
            return "jobs: []\n".to_string();
        }
        let mut yaml = String::from("jobs:\n");
        for (j, (builds, groups)) in shape.iter().enumerate() {
            yaml.push_str(&format!("  - name: job-{j}\n    builds:\n"));
            for b in 0..*builds {
                yaml.push_str(&format!("      - build_name: build-{b}\n"));
            }
            if *builds == 0 {
                yaml.push_str("      []\n");
            }
            yaml.push_str("    tests:\n");
            for (g, tests) in groups.iter().enumerate() {
                let names: Vec<String> = (0..*tests).map(|t| format!("t{t}")).collect();
                yaml.push_str(&format!(
                    "      - device: dev-{g}\n        tests: [{}]\n",
                    names.join(", ")
                ));
            }
            if groups.is_empty() {
                yaml.push_str("      []\n");
            }
        }
        yaml
    }

    proptest! {
        #[test]
        fn prop_records_equal_leaves(shape in plan_shape()) {
            let expected: usize = shape
                .iter()
                .map(|(builds, groups)| builds * groups.iter().sum::<usize>())
                .sum();
            let table = load_str(&render(&shape)).expect("generated plan loads");
            prop_assert_eq!(table.len(), expected);
        }
    }
}
