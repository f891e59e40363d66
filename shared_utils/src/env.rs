//! Environment-variable access for process start-up.
//!
//! Credentials and endpoints are read once, up front, so that a missing value
//! fails with a named error instead of surfacing deep inside a fetch loop.

use std::path::PathBuf;

use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads a required environment variable.
///
/// Blank values (only whitespace) are treated as missing, since an empty API
/// key is never what the caller meant.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MissingEnvVarError(name.to_string()))
}

/// Loads a `.env` file from the current directory or its parents, if any.
///
/// Variables already present in the process environment win. Returns the path
/// of the file that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}
