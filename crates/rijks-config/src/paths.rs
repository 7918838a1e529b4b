use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

pub const BASE_DIR_ENV: &str = "RIJKS_BASE_DIR";
const CONFIG_FILE: &str = "rijks.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("toml error: {0}")]
  Toml(#[from] toml::de::Error),
  #[error("directories error: could not determine home directory")]
  Directories,
  #[error("other: {0}")]
  Other(String),
}

/// Where the config file lives.
#[derive(Debug, Clone)]
pub struct RijksPaths {
  pub config_dir: PathBuf,
}

impl RijksPaths {
  /// `$RIJKS_BASE_DIR/config` when the override is set, otherwise the
  /// platform config directory. The directory is created if missing.
  pub fn new() -> Result<Self, ConfigError> {
    let config_dir = match std::env::var(BASE_DIR_ENV) {
      Ok(base) => PathBuf::from(base).join("config"),
      Err(_) => ProjectDirs::from("nl", "rijks", "rijks")
        .ok_or(ConfigError::Directories)?
        .config_dir()
        .to_path_buf(),
    };

    std::fs::create_dir_all(&config_dir)?;
    Ok(Self { config_dir })
  }

  /// Paths rooted at an explicit directory, ignoring the environment.
  pub fn at(base: impl Into<PathBuf>) -> Result<Self, ConfigError> {
    let config_dir = base.into().join("config");
    std::fs::create_dir_all(&config_dir)?;
    Ok(Self { config_dir })
  }

  pub fn config_file(&self) -> PathBuf {
    self.config_dir.join(CONFIG_FILE)
  }
}
