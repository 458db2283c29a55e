//! Exports for Kernelboard: the HTML report, filtered CSV and the
//! device/test coverage document.
//!
//! File exports go through [`write_atomically`], so a failed export never
//! leaves a partial document on disk.

pub mod coverage;
pub mod csv;
mod error;
mod filename;
pub mod html;
mod output;
mod report;

pub use coverage::{coverage_body, write_coverage_report, COVERAGE_TITLE};
pub use csv::write_csv;
pub use error::ExportError;
pub use filename::download_name;
pub use output::write_atomically;
pub use report::{describe_selection, ReportExporter, DEFAULT_TITLE};
