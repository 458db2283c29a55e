//! The five dashboard charts and the set of rendered images.

use crate::adapter::{BarSeries, HeatmapMatrix, LineSeries, PieSlices, ScatterPoints};
use crate::svg;
use kernelboard_core::{aggregate, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A dashboard chart. Declaration order is dashboard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    ToolchainHeatmap,
    ArchitecturePie,
    ToolchainBar,
    BuildTestScatter,
    TestCountLine,
}

impl ChartKind {
    /// All charts in dashboard order.
    pub const ALL: [Self; 5] = [
        Self::ToolchainHeatmap,
        Self::ArchitecturePie,
        Self::ToolchainBar,
        Self::BuildTestScatter,
        Self::TestCountLine,
    ];

    /// Stable identifier, used in URLs and element ids.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::ToolchainHeatmap => "toolchain-heatmap",
            Self::ArchitecturePie => "architecture-pie",
            Self::ToolchainBar => "toolchain-bar",
            Self::BuildTestScatter => "build-test-scatter",
            Self::TestCountLine => "test-count-line",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ToolchainHeatmap => "Toolchain vs Job Name and Architecture Heatmap",
            Self::ArchitecturePie => "Target Architecture Distribution",
            Self::ToolchainBar => "Toolchain Distribution",
            Self::BuildTestScatter => "Builds vs Tests",
            Self::TestCountLine => "Number of Tests per Job",
        }
    }

    /// Aggregate `table` and render this chart.
    #[must_use]
    pub fn render(self, table: &Table) -> ChartImage {
        let title = self.title();
        let svg = match self {
            Self::ToolchainHeatmap => {
                svg::heatmap(&HeatmapMatrix::from_cross_tab(&aggregate::cross_tab(table)), title)
            }
            Self::ArchitecturePie => svg::pie(
                &PieSlices::from_view(&aggregate::architecture_distribution(table)),
                title,
            ),
            Self::ToolchainBar => svg::bar(
                &BarSeries::from_view(&aggregate::toolchain_distribution(table)),
                title,
                "Toolchain",
                "Number of Jobs",
            ),
            Self::BuildTestScatter => svg::scatter(
                &ScatterPoints::from_pairs(&aggregate::builds_vs_tests(table)),
                title,
                "Build instances",
                "Tests",
            ),
            Self::TestCountLine => svg::line(
                &LineSeries::from_view(&aggregate::tests_per_job(table)),
                title,
                "Job Name",
                "Test Count",
            ),
        };
        ChartImage { kind: self, svg }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for an unrecognized chart id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChart(pub String);

impl fmt::Display for UnknownChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown chart '{}'", self.0)
    }
}

impl std::error::Error for UnknownChart {}

impl FromStr for ChartKind {
    type Err = UnknownChart;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| UnknownChart(s.to_string()))
    }
}

/// A rendered chart: a standalone SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub kind: ChartKind,
    pub svg: String,
}

impl ChartImage {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.svg
    }
}

/// Rendered charts keyed by kind, iterated in dashboard order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSet {
    images: BTreeMap<ChartKind, ChartImage>,
}

impl ChartSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: ChartImage) {
        self.images.insert(image.kind, image);
    }

    pub fn remove(&mut self, kind: ChartKind) -> Option<ChartImage> {
        self.images.remove(&kind)
    }

    #[must_use]
    pub fn get(&self, kind: ChartKind) -> Option<&ChartImage> {
        self.images.get(&kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartImage> {
        self.images.values()
    }
}

impl FromIterator<ChartImage> for ChartSet {
    fn from_iter<I: IntoIterator<Item = ChartImage>>(iter: I) -> Self {
        let mut set = Self::new();
        for image in iter {
            set.insert(image);
        }
        set
    }
}

/// Render every dashboard chart for `table`.
#[must_use]
pub fn render_dashboard(table: &Table) -> ChartSet {
    log::debug!("rendering dashboard charts for {} records", table.len());
    ChartKind::ALL
        .into_iter()
        .map(|kind| kind.render(table))
        .collect()
}
