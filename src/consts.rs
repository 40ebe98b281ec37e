//! Project-wide constants.

use std::path::PathBuf;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Environment variable overriding the stored backend URL.
pub const API_URL_ENV: &str = "VERICV_API_URL";

/// Config key holding the backend URL.
pub const API_URL_KEY: &str = "api_url";

pub const SUBMIT_FAILED: &str = "Failed to create CV. Please try again.";
pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile. Please try again.";
pub const SEARCH_FAILED: &str = "Search failed. Please try again.";
pub const NO_MATCHES: &str = "No professionals found";

/// Default database path: `~/.vericv/vericv.db`.
/// Single DB for the stored session and config.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".vericv")
        .join("vericv.db")
}
