use rijks_config::{ConfigBackend, ConfigError, TomlConfigBackend, config_backend};
use serde::{Deserialize, Serialize};

const SECTION: &str = "images";

/// `[images]` section.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ImageConfig {
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,

  #[serde(default = "default_user_agent")]
  pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_user_agent() -> String {
  concat!("rijks/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for ImageConfig {
  fn default() -> Self {
    ImageConfig { timeout_secs: default_timeout_secs(), user_agent: default_user_agent() }
  }
}

impl ImageConfig {
  pub fn load() -> Result<Self, ConfigError> {
    let backend = config_backend()?;
    let cfg = Self::load_from(backend)?;
    backend.save_section(SECTION, &cfg)?;
    Ok(cfg)
  }

  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    backend.load_section_with_default(SECTION)
  }
}
