//! Transformation module.
//!
//! This module handles everything done to a parsed table:
//! - Clean: duplicate removal and mean imputation
//! - Project: column selection
//! - Pipeline: ingest, clean, visualize, project and export in one run

pub mod clean;
pub mod pipeline;
pub mod project;

pub use clean::{fill_missing_with_mean, remove_duplicates, FillReport, FilledColumn};
pub use pipeline::*;
pub use project::{ordered_selection, project};
