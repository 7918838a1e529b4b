use rijks_config::{ConfigBackend, ConfigError, TomlConfigBackend, config_backend};
use rijks_core::services::SearchSettings;
use rijks_http::ApiConfig;
use rijks_images::ImageConfig;

const SEARCH_SECTION: &str = "search";

/// Every section the binary reads from `rijks.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
  pub api: ApiConfig,
  pub images: ImageConfig,
  pub search: SearchSettings,
}

impl AppConfig {
  /// Loads all sections from the process-wide config file. Missing values
  /// are filled in and written back so the file documents itself.
  pub fn load() -> Result<Self, ConfigError> {
    let backend = config_backend()?;
    let search: SearchSettings = backend.load_section_with_default(SEARCH_SECTION)?;
    backend.save_section(SEARCH_SECTION, &search)?;

    Ok(Self { api: ApiConfig::load()?, images: ImageConfig::load()?, search })
  }

  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    Ok(Self {
      api: ApiConfig::load_from(backend)?,
      images: ImageConfig::load_from(backend)?,
      search: backend.load_section_with_default(SEARCH_SECTION)?,
    })
  }
}
