//! Runs the `kernelboard` binary against plans on disk.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const PLAN: &str = r"
jobs:
  - name: lkft-arm64
    builds:
      - build_name: gcc-13-lkftconfig
        target_arch: arm64
        toolchain: gcc-13
    tests:
      - device: rk3399-rock-pi-4b
        tests: [ltp-syscalls, kselftest-net]
  - name: lkft-x86
    builds:
      - build_name: clang-17-lkftconfig
        target_arch: x86_64
        toolchain: clang-17
    tests:
      - device: x86
        tests: [ltp-syscalls]
";

fn scratch(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kernelboard-cli-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    std::fs::write(dir.join("plan.yml"), PLAN).expect("write plan");
    dir
}

fn kernelboard(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kernelboard"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run kernelboard")
}

#[test]
fn test_check_valid_plan() {
    let dir = scratch("check");
    let out = kernelboard(&dir, &["check", "plan.yml"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Plan valid!"));
    assert!(stdout.contains("Records: 3"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_check_malformed_plan_fails() {
    let dir = scratch("malformed");
    std::fs::write(dir.join("bad.yml"), "project: linux\n").expect("write plan");
    let out = kernelboard(&dir, &["check", "bad.yml"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing 'jobs'"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_export_with_filter() {
    let dir = scratch("export");
    let out = kernelboard(
        &dir,
        &["export", "plan.yml", "-o", "out.csv", "--filter", "test=ltp-syscalls"],
    );
    assert!(out.status.success());
    let csv = std::fs::read_to_string(dir.join("out.csv")).expect("csv written");
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.starts_with("job_name,build_name,test_name,architecture,toolchain,device"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_bad_filter_fails() {
    let dir = scratch("badfilter");
    let out = kernelboard(&dir, &["export", "plan.yml", "--filter", "cpu=arm64"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.join("filtered_data.csv").exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_report_written() {
    let dir = scratch("report");
    let out = kernelboard(&dir, &["report", "plan.yml", "-o", "r.html", "-f", "arch=arm64"]);
    assert!(out.status.success());
    let html = std::fs::read_to_string(dir.join("r.html")).expect("report written");
    assert!(html.contains("Filters: Architecture: arm64"));
    assert!(html.contains("<figure id=\"build-test-scatter\">"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_summary_json() {
    let dir = scratch("summary");
    std::fs::write(dir.join("second.yaml"), PLAN.replace("x86\n", "qemu-x86_64\n")).expect("write plan");
    let out = kernelboard(&dir, &["summary", ".", "--format", "json"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json output");
    assert_eq!(json["stats"]["files"], 2);
    assert_eq!(json["files"][0]["file"], "plan.yml");
    assert_eq!(json["files"][0]["device_count"], 2);
    std::fs::remove_dir_all(&dir).ok();
}
