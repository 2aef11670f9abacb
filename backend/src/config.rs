//! Server configuration.
//!
//! Values come from the environment (a `.env` file is loaded first when
//! present). Invalid values fall back to their default with a warning.
//!
//! | Variable                            | Default |
//! |-------------------------------------|---------|
//! | `DATASWEEPER_PORT`                  | 3000    |
//! | `DATASWEEPER_MAX_UPLOAD_MB`         | 50      |
//! | `DATASWEEPER_PREVIEW_ROWS`          | 5       |
//! | `DATASWEEPER_SESSION_TTL_MINUTES`   | 60      |
//! | `DATASWEEPER_STATIC_DIR`            | unset   |

use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

/// HTTP server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Largest accepted request body, in megabytes
    pub max_upload_mb: usize,
    /// Rows returned in file previews
    pub preview_rows: usize,
    /// Idle time before a session is dropped
    pub session_ttl_minutes: i64,
    /// Built frontend to serve, if any
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            port: parse_or("DATASWEEPER_PORT", lookup("DATASWEEPER_PORT"), defaults.port),
            max_upload_mb: parse_or(
                "DATASWEEPER_MAX_UPLOAD_MB",
                lookup("DATASWEEPER_MAX_UPLOAD_MB"),
                defaults.max_upload_mb,
            ),
            preview_rows: parse_or(
                "DATASWEEPER_PREVIEW_ROWS",
                lookup("DATASWEEPER_PREVIEW_ROWS"),
                defaults.preview_rows,
            ),
            session_ttl_minutes: parse_or(
                "DATASWEEPER_SESSION_TTL_MINUTES",
                lookup("DATASWEEPER_SESSION_TTL_MINUTES"),
                defaults.session_ttl_minutes,
            )
            .max(1),
            static_dir: lookup("DATASWEEPER_STATIC_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Body limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}='{}', using {}", key, raw, default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), ServerConfig::default());
        assert_eq!(ServerConfig::default().max_upload_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("DATASWEEPER_PORT", "8080"),
            ("DATASWEEPER_PREVIEW_ROWS", " 10 "),
            ("DATASWEEPER_STATIC_DIR", "dist"),
        ]);
        assert_eq!(c.port, 8080);
        assert_eq!(c.preview_rows, 10);
        assert_eq!(c.static_dir, Some(PathBuf::from("dist")));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let c = config(&[
            ("DATASWEEPER_PORT", "not-a-port"),
            ("DATASWEEPER_MAX_UPLOAD_MB", "-3"),
            ("DATASWEEPER_SESSION_TTL_MINUTES", "0"),
        ]);
        assert_eq!(c.port, DEFAULT_PORT);
        assert_eq!(c.max_upload_mb, DEFAULT_MAX_UPLOAD_MB);
        assert_eq!(c.session_ttl_minutes, 1);
    }
}
