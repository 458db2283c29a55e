//! Core data model for Kernelboard.
//!
//! This crate provides the types every other Kernelboard crate builds on:
//! - Records and tables: [`Record`], [`Table`], [`Field`]
//! - The filter engine: [`FilterSelection`], [`apply`], [`FilterOptions`]
//! - Aggregations for charts: [`AggregateView`], [`CrossTab`], [`BuildTestPair`]
//! - Multi-file device/test coverage: [`Coverage`]
//!
//! # Example
//!
//! ```
//! use kernelboard_core::{aggregate, apply, Field, FilterSelection, Record, Table};
//!
//! let table = Table::new(vec![
//!     Record::new("job-a", "defconfig", "ltp").architecture("arm64"),
//!     Record::new("job-b", "defconfig", "ltp").architecture("x86"),
//! ]);
//! let selection = FilterSelection::new().with(Field::Architecture, ["arm64"]);
//! let filtered = apply(&table, &selection);
//! assert_eq!(aggregate::tests_per_job(&filtered).get("job-a"), 1);
//! ```

pub mod aggregate;
pub mod coverage;
pub mod filter;
mod record;

pub use aggregate::{AggregateView, BuildTestPair, CountRow, CrossTab, CrossTabRow};
pub use coverage::{Coverage, CoverageMetrics, Mapping};
pub use filter::{apply, FilterOptions, FilterSelection};
pub use record::{Field, Record, Table, UnknownField, UNKNOWN};
