mod backend;
mod io;
mod paths;

pub use backend::{ConfigBackend, TomlConfigBackend};
pub use io::atomic_write_str;
pub use paths::{ConfigError, RijksPaths};

use once_cell::sync::Lazy;

// Process-wide paths (RIJKS_BASE_DIR or the platform dirs)
pub static PATHS: Lazy<Result<RijksPaths, String>> =
  Lazy::new(|| RijksPaths::new().map_err(|e| e.to_string()));

/// Process-wide config backend rooted at [`PATHS`].
pub fn config_backend() -> Result<&'static TomlConfigBackend, ConfigError> {
  static BACKEND: Lazy<Result<TomlConfigBackend, String>> =
    Lazy::new(|| PATHS.as_ref().map(|paths| TomlConfigBackend::new(paths.clone())).map_err(Clone::clone));

  BACKEND.as_ref().map_err(|e| ConfigError::Other(e.clone()))
}
