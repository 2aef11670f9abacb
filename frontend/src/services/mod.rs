//! Backend services.
//!
//! # Services
//!
//! - [`api`] - REST calls to the Data Sweeper backend (upload, cleaning,
//!   charts, column selection and export)

pub mod api;

pub use api::*;
