//! The dashboard report: filter summary, count tables and every chart.

use crate::error::ExportError;
use crate::html;
use crate::output::write_atomically;
use kernelboard_charts::{ChartKind, ChartSet};
use kernelboard_core::{aggregate, AggregateView, Field, FilterSelection, Table};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Title used when none is configured.
pub const DEFAULT_TITLE: &str = "Kernel Build and Test Report";

/// Writes the dashboard state as one self-contained HTML document.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    title: String,
    selection: FilterSelection,
    domain: BTreeMap<Field, Vec<String>>,
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl ReportExporter {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            selection: FilterSelection::new(),
            domain: BTreeMap::new(),
        }
    }

    /// Selection the table was filtered with, listed in the report header.
    #[must_use]
    pub fn with_selection(mut self, selection: FilterSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Categories of the unfiltered table. Count tables list every one of
    /// them, with zero counts for those the selection excluded.
    #[must_use]
    pub fn with_domain(mut self, full: &Table) -> Self {
        self.domain = [Field::Architecture, Field::Toolchain, Field::JobName]
            .into_iter()
            .map(|field| {
                let labels = full.distinct(field).into_iter().map(str::to_string).collect();
                (field, labels)
            })
            .collect();
        self
    }

    /// Write the report for `table` with its rendered `charts`.
    ///
    /// Every [`ChartKind`] must be present in `charts`. The check happens
    /// before anything is written.
    pub fn export<W: Write>(
        &self,
        table: &Table,
        charts: &ChartSet,
        mut writer: W,
    ) -> Result<(), ExportError> {
        let missing = ChartKind::ALL
            .into_iter()
            .find(|kind| charts.get(*kind).is_none());
        if let Some(kind) = missing {
            return Err(ExportError::MissingChart(kind));
        }
        let document = html::document(&self.title, &self.render_body(table, charts));
        writer.write_all(document.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Write the report to `path`. A failed export leaves no file behind.
    pub fn export_to_path(
        &self,
        table: &Table,
        charts: &ChartSet,
        path: &Path,
    ) -> Result<(), ExportError> {
        write_atomically(path, |out| self.export(table, charts, out))
    }

    fn render_body(&self, table: &Table, charts: &ChartSet) -> String {
        let figures: String = charts
            .iter()
            .map(|image| html::figure(image.kind.id(), image.as_str()))
            .collect();
        format!(
            r#"<main>
<header><h1>{title}</h1><p class="meta">{filters}</p></header>
<h2>Filter Summary</h2>
{cards}
<h2>Summary</h2>
{architectures}
{toolchains}
{jobs}
<h2>Charts</h2>
{figures}
</main>"#,
            title = html::escape(&self.title),
            filters = html::escape(&describe_selection(&self.selection)),
            cards = summary_cards(table),
            architectures = self.count_table(aggregate::architecture_distribution(table)),
            toolchains = self.count_table(aggregate::toolchain_distribution(table)),
            jobs = self.count_table(aggregate::tests_per_job(table)),
        )
    }

    fn count_table(&self, view: AggregateView) -> String {
        let view = match self.domain.get(&view.field()) {
            Some(labels) => view.with_domain(labels),
            None => view,
        };
        html::table(
            &[view.field().label(), "Count"],
            view.rows()
                .iter()
                .map(|row| [row.label.clone(), row.count.to_string()]),
        )
    }
}

/// One line describing the active filters.
#[must_use]
pub fn describe_selection(selection: &FilterSelection) -> String {
    if selection.is_unrestricted() {
        return "Filters: none (all records)".to_string();
    }
    let parts: Vec<String> = Field::ALL
        .iter()
        .filter_map(|&field| {
            selection.allowed(field).map(|values| {
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                format!("{}: {}", field.label(), values.join(", "))
            })
        })
        .collect();
    format!("Filters: {}", parts.join("; "))
}

fn summary_cards(table: &Table) -> String {
    html::metric_cards(&[
        ("Total Records", table.len().to_string()),
        (
            "Unique Architectures",
            table.count_distinct(Field::Architecture).to_string(),
        ),
        (
            "Unique Toolchains",
            table.count_distinct(Field::Toolchain).to_string(),
        ),
        ("Unique Devices", table.count_distinct(Field::Device).to_string()),
        (
            "Unique Build Names",
            table.count_distinct(Field::BuildName).to_string(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernelboard_charts::render_dashboard;
    use kernelboard_core::Record;

    fn table() -> Table {
        Table::new(vec![
            Record::new("job-1", "gcc-defconfig", "ltp")
                .architecture("arm64")
                .toolchain("gcc")
                .device("juno"),
            Record::new("job-2", "gcc-defconfig", "kunit")
                .architecture("x86")
                .toolchain("gcc"),
        ])
    }

    #[test]
    fn test_export_contains_summary_and_charts() {
        let table = table();
        let charts = render_dashboard(&table);
        let mut out = Vec::new();
        ReportExporter::default()
            .export(&table, &charts, &mut out)
            .unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("<h1>Kernel Build and Test Report</h1>"));
        assert!(html.contains("Filters: none"));
        assert!(html.contains(r#"<div class="value">2</div><div class="label">Total Records</div>"#));
        for kind in ChartKind::ALL {
            assert!(html.contains(&format!(r#"<figure id="{}">"#, kind.id())));
        }
        assert!(html.contains("<td>arm64</td><td>1</td>"));
    }

    #[test]
    fn test_charts_in_dashboard_order() {
        let table = table();
        let mut out = Vec::new();
        ReportExporter::default()
            .export(&table, &render_dashboard(&table), &mut out)
            .unwrap();
        let html = String::from_utf8(out).unwrap();
        let positions: Vec<usize> = ChartKind::ALL
            .iter()
            .filter_map(|k| html.find(&format!("id=\"{}\"", k.id())))
            .collect();
        assert_eq!(positions.len(), 5);
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_chart_is_error_and_writes_nothing() {
        let table = table();
        let mut charts = render_dashboard(&table);
        charts.remove(ChartKind::BuildTestScatter);
        let mut out = Vec::new();
        let err = ReportExporter::default()
            .export(&table, &charts, &mut out)
            .unwrap_err();
        assert!(matches!(err, ExportError::MissingChart(ChartKind::BuildTestScatter)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_selection_is_described() {
        let selection = FilterSelection::new()
            .with(Field::Architecture, ["arm64", "x86"])
            .with(Field::JobName, ["job-1"]);
        assert_eq!(
            describe_selection(&selection),
            "Filters: Job Name: job-1; Architecture: arm64, x86"
        );
    }

    #[test]
    fn test_empty_table_still_exports() {
        let table = Table::default();
        let mut out = Vec::new();
        ReportExporter::new("Empty")
            .export(&table, &render_dashboard(&table), &mut out)
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No data"));
    }

    #[test]
    fn test_excluded_categories_count_zero() {
        let full = table();
        let selection = FilterSelection::new().with(Field::Architecture, ["riscv"]);
        let filtered = kernelboard_core::apply(&full, &selection);
        let mut out = Vec::new();
        ReportExporter::default()
            .with_selection(selection)
            .with_domain(&full)
            .export(&filtered, &render_dashboard(&filtered), &mut out)
            .unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("<td>arm64</td><td>0</td>"));
        assert!(html.contains("<td>x86</td><td>0</td>"));
        assert!(html.contains("<td>gcc</td><td>0</td>"));
        assert!(html.contains("<td>job-2</td><td>0</td>"));
    }

    #[test]
    fn test_domain_keeps_live_counts() {
        let full = table();
        let selection = FilterSelection::new().with(Field::Architecture, ["arm64"]);
        let filtered = kernelboard_core::apply(&full, &selection);
        let mut out = Vec::new();
        ReportExporter::default()
            .with_domain(&full)
            .export(&filtered, &render_dashboard(&filtered), &mut out)
            .unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("<td>arm64</td><td>1</td>"));
        assert!(html.contains("<td>x86</td><td>0</td>"));
    }
}
