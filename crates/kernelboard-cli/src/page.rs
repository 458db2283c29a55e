//! HTML pages served by `kernelboard serve`.

use crate::state::Loaded;
use kernelboard_charts::{render_dashboard, svg, LineSeries};
use kernelboard_core::filter::encode_component;
use kernelboard_core::{apply, Coverage, Field, FilterOptions, FilterSelection, Table};
use kernelboard_report::html::{self, escape};
use kernelboard_report::{coverage_body, describe_selection};
use kernelboard_yaml::{CatalogStats, FileSummary, PlanFile};
use std::collections::BTreeSet;

/// Query string carrying the plan file and the selection.
pub(crate) fn query(file: &str, selection: &FilterSelection) -> String {
    let mut parts = Vec::new();
    if !file.is_empty() {
        parts.push(format!("file={}", encode_component(file)));
    }
    let filters = selection.to_query();
    if !filters.is_empty() {
        parts.push(filters);
    }
    parts.join("&")
}

fn nav(file: &str) -> String {
    let q = query(file, &FilterSelection::new());
    format!(
        r#"<nav><a href="/?{q}">Dashboard</a><a href="/coverage?{q}">Device/Test Coverage</a><a href="/files?{q}">Test Files</a><a href="/reload?{q}">Reload</a></nav>"#,
        q = escape(&q)
    )
}

fn hidden_file(file: &str) -> String {
    format!(r#"<input type="hidden" name="file" value="{}">"#, escape(file))
}

fn page(title: &str, heading: &str, nav: &str, body: &str) -> String {
    html::document(
        title,
        &format!(
            "<main>\n<header><h1>{}</h1>{nav}</header>\n{body}\n</main>",
            escape(heading)
        ),
    )
}

fn multi_select(name: &str, label: &str, options: &[String], selected: Option<&BTreeSet<String>>) -> String {
    let items: String = options
        .iter()
        .map(|value| {
            let is_selected = selected.is_some_and(|s| s.contains(value));
            format!(
                r#"<option value="{v}"{sel}>{v}</option>"#,
                v = escape(value),
                sel = if is_selected { " selected" } else { "" }
            )
        })
        .collect();
    let size = options.len().clamp(1, 8);
    format!(
        r#"<label for="{name}">{label}</label><select name="{name}" id="{name}" multiple size="{size}">{items}</select>"#,
        name = escape(name),
        label = escape(label),
    )
}

fn file_picker(files: &[PlanFile], current: &str) -> String {
    if files.len() <= 1 {
        return hidden_file(current);
    }
    let items: String = files
        .iter()
        .map(|f| {
            format!(
                r#"<option value="{v}"{sel}>{v}</option>"#,
                v = escape(&f.name),
                sel = if f.name == current { " selected" } else { "" }
            )
        })
        .collect();
    format!(
        r#"<label for="file">Plan file</label><select name="file" id="file" onchange="this.form.submit()">{items}</select>"#
    )
}

fn sidebar(files: &[PlanFile], current: &str, table: &Table, selection: &FilterSelection) -> String {
    let options = FilterOptions::cascade(table, selection);
    let widgets: String = options
        .iter()
        .map(|(field, values)| multi_select(field.key(), field.plural(), values, selection.allowed(field)))
        .collect();
    let q = query(current, selection);
    format!(
        r#"<aside class="sidebar"><form method="get" action="/">{picker}{widgets}
<p><button type="submit">Apply</button> <a href="/?{clear}">Clear</a></p></form>
<h3>Downloads</h3>
<p><a href="/export.csv?{q}">Filtered data (CSV)</a></p>
<p><a href="/report.html?{q}">Report (HTML)</a></p></aside>"#,
        picker = file_picker(files, current),
        clear = escape(&query(current, &FilterSelection::new())),
        q = escape(&q),
    )
}

/// The main dashboard: sidebar filters, summary and the five charts.
pub(crate) fn dashboard(
    title: &str,
    files: &[PlanFile],
    current: &str,
    selection: &FilterSelection,
    loaded: &Loaded,
) -> String {
    let table = match loaded {
        Ok(table) => table,
        Err(message) => {
            let body = format!(
                r#"<div class="error">Error loading YAML file {}: {}</div>"#,
                escape(current),
                escape(message)
            );
            return page(title, title, &nav(current), &body);
        }
    };

    let filtered = apply(table, selection);
    let warning = if filtered.is_empty() {
        r#"<div class="warning">No data available for the selected filters.</div>"#
    } else {
        ""
    };
    let cards = html::metric_cards(&[
        ("Total Records", filtered.len().to_string()),
        ("Architectures", filtered.count_distinct(Field::Architecture).to_string()),
        ("Toolchains", filtered.count_distinct(Field::Toolchain).to_string()),
        ("Devices", filtered.count_distinct(Field::Device).to_string()),
        ("Build Names", filtered.count_distinct(Field::BuildName).to_string()),
    ]);
    let figures: String = render_dashboard(&filtered)
        .iter()
        .map(|image| html::figure(image.kind.id(), image.as_str()))
        .collect();

    let body = format!(
        r#"<div class="layout">{sidebar}<section class="content">
<p class="meta">{file} &middot; {filters}</p>
{warning}{cards}{figures}</section></div>"#,
        sidebar = sidebar(files, current, table, selection),
        file = escape(current),
        filters = escape(&describe_selection(selection)),
    );
    page(title, title, &nav(current), &body)
}

/// Device/test coverage across every plan file.
pub(crate) fn coverage(
    title: &str,
    current: &str,
    coverage: &Coverage,
    devices: &BTreeSet<String>,
    tests: &BTreeSet<String>,
    search: &str,
) -> String {
    let all_devices: Vec<String> = coverage.devices().into_iter().map(str::to_string).collect();
    let all_tests: Vec<String> = coverage.tests().into_iter().map(str::to_string).collect();
    let shown = coverage.restrict(devices, tests).search(search);

    let file_q = query(current, &FilterSelection::new());
    let mut download: Vec<String> = [file_q.clone()].into_iter().filter(|q| !q.is_empty()).collect();
    download.extend(devices.iter().map(|d| format!("device={}", encode_component(d))));
    download.extend(tests.iter().map(|t| format!("test={}", encode_component(t))));
    if !search.is_empty() {
        download.push(format!("q={}", encode_component(search)));
    }

    let content = if coverage.is_empty() {
        r#"<div class="warning">No device information available in the data.</div>"#.to_string()
    } else {
        coverage_body(&shown)
    };
    let body = format!(
        r#"<div class="layout"><aside class="sidebar"><form method="get" action="/coverage">{file}
{device_select}{test_select}
<label for="q">Search</label><input type="search" name="q" id="q" value="{q}">
<p><button type="submit">Apply</button> <a href="/coverage?{clear}">Clear</a></p></form>
<p><a href="/coverage/report.html?{download}">Coverage report (HTML)</a></p></aside>
<section class="content">{content}</section></div>"#,
        device_select = multi_select("device", "Devices", &all_devices, Some(devices)),
        test_select = multi_select("test", "Tests", &all_tests, Some(tests)),
        file = hidden_file(current),
        clear = escape(&file_q),
        q = escape(search),
        download = escape(&download.join("&")),
    );
    page(title, "Device and Test Analysis", &nav(current), &body)
}

/// Device and test counts per plan file.
pub(crate) fn files(title: &str, current: &str, summaries: &[FileSummary], search: &str) -> String {
    let shown: Vec<&FileSummary> = summaries
        .iter()
        .filter(|s| search.trim().is_empty() || s.mentions_test(search.trim()))
        .collect();
    let owned: Vec<FileSummary> = shown.iter().map(|s| (*s).clone()).collect();
    let stats = CatalogStats::from_summaries(&owned);

    let content = if shown.is_empty() {
        r#"<div class="warning">No test information found.</div>"#.to_string()
    } else {
        let cards = html::metric_cards(&[
            ("Average Tests per File", format!("{:.1}", stats.average_tests)),
            ("Maximum Tests", stats.max_tests.to_string()),
            ("Total Unique Files", stats.files.to_string()),
        ]);
        let tests_line = LineSeries {
            points: shown.iter().map(|s| (s.file.clone(), s.test_count)).collect(),
        };
        let devices_line = LineSeries {
            points: shown.iter().map(|s| (s.file.clone(), s.device_count)).collect(),
        };
        let rows = shown.iter().map(|s| {
            [
                s.file.clone(),
                s.device_count.to_string(),
                s.test_count.to_string(),
                s.tests.join(", "),
            ]
        });
        format!(
            "{cards}{}{}{}",
            html::figure(
                "tests-per-file",
                &svg::line(&tests_line, "Number of Tests per File", "File", "Tests")
            ),
            html::figure(
                "devices-per-file",
                &svg::line(&devices_line, "Number of Devices per File", "File", "Devices")
            ),
            html::table(&["File", "Devices", "Tests", "Test Names"], rows)
        )
    };
    let body = format!(
        r#"<form method="get" action="/files">{file}<label for="q">Search tests</label>
<input type="search" name="q" id="q" value="{q}"> <button type="submit">Search</button></form>
{content}"#,
        file = hidden_file(current),
        q = escape(search)
    );
    page(title, "Test Analysis", &nav(current), &body)
}
