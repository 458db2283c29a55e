//! Reshape aggregate views into the input each chart family expects.
//!
//! Adapters hold no business rules; they only reorder and index what the
//! aggregator already counted.

use kernelboard_core::{AggregateView, BuildTestPair, CrossTab};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;

/// Dense matrix of counts: `z[row][col]`, zero filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapMatrix {
    /// `"job (arch)"` labels, sorted
    pub rows: Vec<String>,
    /// Toolchains, sorted
    pub columns: Vec<String>,
    pub z: Vec<Vec<usize>>,
}

impl HeatmapMatrix {
    #[must_use]
    pub fn from_cross_tab(cross_tab: &CrossTab) -> Self {
        let rows = cross_tab.job_arch_labels();
        let columns: Vec<String> = cross_tab
            .toolchains()
            .into_iter()
            .map(str::to_string)
            .collect();
        let row_index: BTreeMap<&str, usize> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.as_str(), i))
            .collect();
        let col_index: BTreeMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut z = vec![vec![0; columns.len()]; rows.len()];
        for cell in cross_tab.rows() {
            let label = cell.job_arch();
            if let (Some(&r), Some(&c)) = (
                row_index.get(label.as_str()),
                col_index.get(cell.toolchain.as_str()),
            ) {
                z[r][c] += cell.count;
            }
        }
        Self { rows, columns, z }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Largest cell value.
    #[must_use]
    pub fn max(&self) -> usize {
        self.z.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// One pie slice; angles in radians, clockwise from the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
    pub fraction: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Pie slices in view order. Zero-valued categories get no slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieSlices {
    pub slices: Vec<PieSlice>,
}

impl PieSlices {
    #[must_use]
    pub fn from_view(view: &AggregateView) -> Self {
        let total = view.total();
        if total == 0 {
            return Self::default();
        }
        let mut angle = 0.0;
        let slices = view
            .rows()
            .iter()
            .filter(|row| row.count > 0)
            .map(|row| {
                let fraction = row.count as f64 / total as f64;
                let start_angle = angle;
                angle = fraction.mul_add(TAU, angle);
                PieSlice {
                    label: row.label.clone(),
                    value: row.count,
                    fraction,
                    start_angle,
                    end_angle: angle,
                }
            })
            .collect();
        Self { slices }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Categorical bars in view order (descending count).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarSeries {
    pub bars: Vec<(String, usize)>,
}

impl BarSeries {
    #[must_use]
    pub fn from_view(view: &AggregateView) -> Self {
        Self {
            bars: view
                .rows()
                .iter()
                .map(|row| (row.label.clone(), row.count))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[must_use]
    pub fn max(&self) -> usize {
        self.bars.iter().map(|(_, v)| *v).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub label: String,
    pub x: usize,
    pub y: usize,
}

/// Build names placed by build instance count (x) and test count (y).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterPoints {
    pub points: Vec<ScatterPoint>,
}

impl ScatterPoints {
    #[must_use]
    pub fn from_pairs(pairs: &[BuildTestPair]) -> Self {
        Self {
            points: pairs
                .iter()
                .map(|p| ScatterPoint {
                    label: p.build_name.clone(),
                    x: p.distinct_builds,
                    y: p.tests,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Line over a categorical x axis, ordered by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSeries {
    pub points: Vec<(String, usize)>,
}

impl LineSeries {
    #[must_use]
    pub fn from_view(view: &AggregateView) -> Self {
        let mut points: Vec<(String, usize)> = view
            .rows()
            .iter()
            .map(|row| (row.label.clone(), row.count))
            .collect();
        points.sort_by(|a, b| a.0.cmp(&b.0));
        Self { points }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn max(&self) -> usize {
        self.points.iter().map(|(_, v)| *v).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernelboard_core::{aggregate, Field, Record, Table};

    fn table() -> Table {
        Table::new(vec![
            Record::new("job-a", "defconfig", "ltp")
                .architecture("arm64")
                .toolchain("gcc"),
            Record::new("job-a", "defconfig", "kunit")
                .architecture("arm64")
                .toolchain("gcc"),
            Record::new("job-b", "defconfig", "ltp")
                .architecture("x86")
                .toolchain("clang"),
        ])
    }

    #[test]
    fn test_heatmap_zero_fill() {
        let m = HeatmapMatrix::from_cross_tab(&aggregate::cross_tab(&table()));
        assert_eq!(m.rows, vec!["job-a (arm64)", "job-b (x86)"]);
        assert_eq!(m.columns, vec!["clang", "gcc"]);
        assert_eq!(m.z, vec![vec![0, 2], vec![1, 0]]);
        assert_eq!(m.max(), 2);
    }

    #[test]
    fn test_heatmap_empty() {
        let m = HeatmapMatrix::from_cross_tab(&aggregate::cross_tab(&Table::default()));
        assert!(m.is_empty());
        assert_eq!(m.max(), 0);
    }

    #[test]
    fn test_pie_angles_cover_circle() {
        let pie = PieSlices::from_view(&aggregate::architecture_distribution(&table()));
        assert_eq!(pie.slices.len(), 2);
        assert_eq!(pie.slices[0].label, "arm64");
        assert!((pie.slices[0].fraction - 2.0 / 3.0).abs() < 1e-9);
        assert!(pie.slices[0].start_angle.abs() < 1e-12);
        assert!((pie.slices[0].end_angle - pie.slices[1].start_angle).abs() < 1e-12);
        assert!((pie.slices[1].end_angle - TAU).abs() < 1e-9);
    }

    #[test]
    fn test_pie_all_zero_has_no_slices() {
        let view = AggregateView::from_rows(Field::Architecture, Vec::new()).with_domain(["arm64"]);
        assert!(PieSlices::from_view(&view).is_empty());
    }

    #[test]
    fn test_bar_keeps_view_order() {
        let bars = BarSeries::from_view(&aggregate::toolchain_distribution(&table()));
        assert_eq!(bars.bars, vec![("gcc".into(), 2), ("clang".into(), 1)]);
        assert_eq!(bars.max(), 2);
    }

    #[test]
    fn test_scatter_from_pairs() {
        let points = ScatterPoints::from_pairs(&aggregate::builds_vs_tests(&table()));
        assert_eq!(
            points.points,
            vec![ScatterPoint {
                label: "defconfig".into(),
                x: 2,
                y: 3
            }]
        );
    }

    #[test]
    fn test_line_sorted_by_label() {
        let t = Table::new(vec![
            Record::new("zeta", "b", "t"),
            Record::new("zeta", "b", "u"),
            Record::new("alpha", "b", "t"),
        ]);
        let line = LineSeries::from_view(&aggregate::tests_per_job(&t));
        assert_eq!(line.points, vec![("alpha".into(), 1), ("zeta".into(), 2)]);
    }
}
