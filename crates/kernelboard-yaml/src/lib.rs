//! YAML test-plan loader for Kernelboard.
//!
//! Turns a jobs → builds → tests plan into a strict record [`Table`],
//! substituting `"unknown"` for every optional field the plan leaves out.
//!
//! [`Table`]: kernelboard_core::Table

mod catalog;
mod error;
mod loader;
mod plan;

pub use catalog::{Catalog, CatalogStats, FileSummary, PlanFile};
pub use error::LoadError;
pub use loader::{load_file, load_plan, load_str, UNNAMED_BUILD};
pub use plan::{Build, Job, Plan, TestGroup};
