//! Charts for the Kernelboard dashboard.
//!
//! Aggregates from `kernelboard-core` are reshaped by [`adapter`] and drawn
//! by [`svg`] into standalone SVG documents.
//!
//! # Example
//!
//! ```
//! use kernelboard_charts::{render_dashboard, ChartKind};
//! use kernelboard_core::{Record, Table};
//!
//! let table = Table::new(vec![Record::new("job", "defconfig", "ltp").toolchain("gcc-13")]);
//! let charts = render_dashboard(&table);
//! let bar = charts.get(ChartKind::ToolchainBar).unwrap();
//! assert!(bar.as_str().contains("gcc-13"));
//! ```

pub mod adapter;
mod chart;
pub mod color;
pub mod geometry;
pub mod svg;

pub use adapter::{BarSeries, HeatmapMatrix, LineSeries, PieSlice, PieSlices, ScatterPoint, ScatterPoints};
pub use chart::{render_dashboard, ChartImage, ChartKind, ChartSet, UnknownChart};
pub use color::Color;
