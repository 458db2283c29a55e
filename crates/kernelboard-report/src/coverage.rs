//! Device/test coverage document.

use crate::error::ExportError;
use crate::html;
use kernelboard_charts::{svg, BarSeries};
use kernelboard_core::Coverage;
use std::io::Write;

/// Title used for the standalone coverage document.
pub const COVERAGE_TITLE: &str = "Device and Test Analysis Report";

/// Metric cards, per-device and per-test bar charts, and the detail tables.
#[must_use]
pub fn coverage_body(coverage: &Coverage) -> String {
    let metrics = coverage.metrics();
    let cards = html::metric_cards(&[
        ("Total Devices", metrics.total_devices.to_string()),
        ("Total Tests", metrics.total_tests.to_string()),
        ("Total Files", metrics.total_files.to_string()),
        ("Device/Test Mappings", metrics.total_mappings.to_string()),
    ]);

    let tests_per_device = svg::bar(
        &BarSeries::from_view(&coverage.device_test_counts()),
        "Tests per Device",
        "Device",
        "Number of Tests",
    );
    let devices_per_test = svg::bar(
        &BarSeries::from_view(&coverage.test_device_counts()),
        "Devices per Test",
        "Test",
        "Number of Devices",
    );

    let by_device = html::table(
        &["Device", "Test", "File"],
        coverage.by_device().into_iter().flat_map(|(device, rows)| {
            rows.into_iter()
                .map(move |(test, file)| [device.to_string(), test.to_string(), file.to_string()])
        }),
    );
    let by_test = html::table(
        &["Test", "Device", "File"],
        coverage.by_test().into_iter().flat_map(|(test, rows)| {
            rows.into_iter()
                .map(move |(device, file)| [test.to_string(), device.to_string(), file.to_string()])
        }),
    );

    format!(
        r#"{cards}
{chart_devices}
{chart_tests}
<h2>Tests by Device</h2>
{by_device}
<h2>Devices by Test</h2>
{by_test}"#,
        chart_devices = html::figure("tests-per-device", &tests_per_device),
        chart_tests = html::figure("devices-per-test", &devices_per_test),
    )
}

/// Write the coverage analysis as a standalone HTML document.
pub fn write_coverage_report<W: Write>(
    coverage: &Coverage,
    title: &str,
    mut writer: W,
) -> Result<(), ExportError> {
    let body = format!(
        r#"<main>
<header><h1>{}</h1></header>
{}
</main>"#,
        html::escape(title),
        coverage_body(coverage)
    );
    writer.write_all(html::document(title, &body).as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernelboard_core::{Record, Table};

    fn coverage() -> Coverage {
        let a = Table::new(vec![
            Record::new("j", "b", "ltp").device("juno"),
            Record::new("j", "b", "ltp").device("juno"),
            Record::new("j", "b", "kunit").device("x15"),
        ]);
        let b = Table::new(vec![Record::new("j", "b", "ltp").device("x15")]);
        Coverage::build([("a.yml", &a), ("b.yml", &b)])
    }

    #[test]
    fn test_report_has_metrics_and_tables() {
        let mut out = Vec::new();
        write_coverage_report(&coverage(), COVERAGE_TITLE, &mut out).unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("<h1>Device and Test Analysis Report</h1>"));
        assert!(html.contains(r#"<div class="value">3</div><div class="label">Device/Test Mappings</div>"#));
        assert!(html.contains("<td>juno</td><td>ltp</td><td>a.yml</td>"));
        assert!(html.contains("<td>ltp</td><td>x15</td><td>b.yml</td>"));
        assert!(html.contains("Tests per Device"));
    }

    #[test]
    fn test_empty_coverage() {
        let body = coverage_body(&Coverage::default());
        assert!(body.contains("No data"));
        assert!(body.contains(r#"<div class="value">0</div>"#));
    }
}
