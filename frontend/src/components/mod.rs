//! UI Components for the Data Sweeper application.
//!
//! This module contains all Leptos components organized by function:
//!
//! # Layout Components
//! - [`Hero`] - Main title and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`UploadSection`] - Multi-file CSV/Excel upload
//! - [`FilePanel`] - Preview, cleaning, chart, column selection and conversion of one file
//! - [`VisualizationView`] - Bar chart or "nothing to plot" warning
//! - [`LogsPanel`] - Real-time processing logs (SSE)

mod hero;
mod upload;
mod file_panel;
mod chart;
mod footer;
mod logs;

pub use hero::*;
pub use upload::*;
pub use file_panel::*;
pub use chart::*;
pub use footer::*;
pub use logs::*;
