//! Application configuration.
//!
//! Centralized configuration for the Data Sweeper frontend.
//! In development, these are hardcoded. In production, they could be
//! loaded from environment or a config file.

/// Backend API base URL.
pub const BACKEND_URL: &str = "http://localhost:3000";

/// Application name, shown in the hero.
pub const APP_NAME: &str = "Data Sweeper";

/// Maximum file size for upload (in bytes).
///
/// 50 MB limit, the backend default.
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Maximum logs to keep in memory.
pub const MAX_LOG_ENTRIES: usize = 100;

/// Extensions accepted by the file picker.
pub const ACCEPTED_EXTENSIONS: &str = ".csv,.xlsx";
