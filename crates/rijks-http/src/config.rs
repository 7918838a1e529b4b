use rijks_config::{ConfigBackend, ConfigError, TomlConfigBackend, config_backend};
use serde::{Deserialize, Serialize};

const SECTION: &str = "api";

/// `[api]` section: where the collection endpoint lives.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiConfig {
  /// Base of every route, e.g. `https://www.rijksmuseum.nl/api/`.
  #[serde(default = "default_base_url")]
  pub base_url: String,

  /// Language segment inserted after the base (`nl`, `en`).
  #[serde(default = "default_culture")]
  pub culture: String,

  /// Sent as the `key` query parameter.
  #[serde(default = "default_api_key")]
  pub api_key: String,

  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String {
  "https://www.rijksmuseum.nl/api/".into()
}

fn default_culture() -> String {
  "nl".into()
}

fn default_api_key() -> String {
  "0fiuZFh4".into()
}

fn default_timeout_secs() -> u64 {
  30
}

impl Default for ApiConfig {
  fn default() -> Self {
    ApiConfig {
      base_url: default_base_url(),
      culture: default_culture(),
      api_key: default_api_key(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl ApiConfig {
  /// Loads `[api]` from the process-wide config file, writing defaults back.
  pub fn load() -> Result<Self, ConfigError> {
    let backend = config_backend()?;
    let cfg = Self::load_from(backend)?;
    backend.save_section(SECTION, &cfg)?;
    Ok(cfg)
  }

  /// Same as [`ApiConfig::load`] against an explicit backend, without writing back.
  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    backend.load_section_with_default(SECTION)
  }
}
