//! Property tests for the filter engine and aggregations.

use kernelboard_core::{aggregate, apply, Field, FilterSelection, Record, Table};
use proptest::prelude::*;

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        prop::sample::select(vec!["job-1", "job-2", "job-3"]),
        prop::sample::select(vec!["defconfig", "allmodconfig"]),
        prop::sample::select(vec!["ltp", "kunit", "kselftest", "boot"]),
        prop::sample::select(vec!["arm64", "x86_64", "", "riscv"]),
        prop::sample::select(vec!["gcc-13", "clang-17", ""]),
        prop::sample::select(vec!["juno", "qemu", ""]),
    )
        .prop_map(|(job, build, test, arch, tc, dev)| {
            Record::new(job, build, test)
                .architecture(arch)
                .toolchain(tc)
                .device(dev)
        })
}

fn table_strategy() -> impl Strategy<Value = Table> {
    prop::collection::vec(record_strategy(), 0..40).prop_map(Table::new)
}

fn selection_strategy() -> impl Strategy<Value = FilterSelection> {
    (
        prop::collection::vec(prop::sample::select(vec!["arm64", "x86_64", "unknown", "mips"]), 0..3),
        prop::collection::vec(prop::sample::select(vec!["job-1", "job-3"]), 0..2),
        prop::collection::vec(prop::sample::select(vec!["ltp", "boot", "absent"]), 0..3),
    )
        .prop_map(|(arches, jobs, tests)| {
            FilterSelection::new()
                .with(Field::Architecture, arches)
                .with(Field::JobName, jobs)
                .with(Field::TestName, tests)
        })
}

proptest! {
    #[test]
    fn prop_filter_is_idempotent(table in table_strategy(), sel in selection_strategy()) {
        let once = apply(&table, &sel);
        let twice = apply(&once, &sel);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_filter_never_grows(table in table_strategy(), sel in selection_strategy()) {
        prop_assert!(apply(&table, &sel).len() <= table.len());
    }

    #[test]
    fn prop_filter_output_matches_selection(table in table_strategy(), sel in selection_strategy()) {
        for record in &apply(&table, &sel) {
            prop_assert!(sel.matches(record));
        }
    }

    #[test]
    fn prop_distributions_sum_to_len(table in table_strategy(), sel in selection_strategy()) {
        let filtered = apply(&table, &sel);
        for field in Field::ALL {
            prop_assert_eq!(aggregate::distribution(&filtered, field).total(), filtered.len());
        }
        prop_assert_eq!(aggregate::cross_tab(&filtered).total(), filtered.len());
        let tests: usize = aggregate::builds_vs_tests(&filtered).iter().map(|p| p.tests).sum();
        prop_assert_eq!(tests, filtered.len());
    }

    #[test]
    fn prop_views_are_ordered(table in table_strategy()) {
        let view = aggregate::architecture_distribution(&table);
        for pair in view.rows().windows(2) {
            prop_assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].label < pair[1].label)
            );
        }
    }

    #[test]
    fn prop_query_roundtrip(sel in selection_strategy()) {
        prop_assert_eq!(FilterSelection::from_query(&sel.to_query()), sel);
    }

    #[test]
    fn prop_no_missing_values(table in table_strategy()) {
        for record in &table {
            for field in Field::ALL {
                prop_assert!(!record.get(field).is_empty());
            }
        }
    }
}

#[test]
fn test_two_job_scenario() {
    let table = Table::new(vec![
        Record::new("job-1", "build-1", "t1").architecture("arm64").toolchain("gcc"),
        Record::new("job-1", "build-1", "t2").architecture("arm64").toolchain("gcc"),
        Record::new("job-2", "build-2", "t1").architecture("x86").toolchain("gcc"),
        Record::new("job-2", "build-2", "t2").architecture("x86").toolchain("gcc"),
    ]);
    let arch = aggregate::architecture_distribution(&table);
    assert_eq!((arch.get("arm64"), arch.get("x86")), (2, 2));

    let sel = FilterSelection::new().with(Field::Architecture, ["arm64"]);
    let filtered = apply(&table, &sel);
    assert_eq!(filtered.len(), 2);
    let per_job = aggregate::tests_per_job(&filtered);
    assert_eq!(per_job.get("job-1"), 2);
    assert_eq!(per_job.get("job-2"), 0);
}

#[test]
fn test_excluding_selection_yields_zero_views() {
    let table = Table::new(vec![Record::new("j", "b", "t").architecture("arm64")]);
    let sel = FilterSelection::new().with(Field::Architecture, ["mips"]);
    let filtered = apply(&table, &sel);
    let view = aggregate::architecture_distribution(&filtered)
        .with_domain(table.distinct(Field::Architecture));
    assert_eq!(view.get("arm64"), 0);
    assert_eq!(view.total(), 0);
}
