use crate::io::atomic_write_str;
use crate::paths::{ConfigError, RijksPaths};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use tracing::debug;

// toml_edit on the write path keeps user comments intact
use toml_edit::{DocumentMut, Item};

pub trait ConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError>;
  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError>;
}

pub struct TomlConfigBackend {
  paths: RijksPaths,
}

impl TomlConfigBackend {
  pub fn new(paths: RijksPaths) -> Self {
    Self { paths }
  }

  pub fn paths(&self) -> &RijksPaths {
    &self.paths
  }

  /// Like [`ConfigBackend::load_section`], but a missing file or section
  /// yields `T::default()`.
  pub fn load_section_with_default<T>(&self, section: &str) -> Result<T, ConfigError>
  where
    T: DeserializeOwned + Default,
  {
    use std::io::ErrorKind;

    let path = self.paths.config_file();
    let content = match std::fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!(path = %path.display(), section, "no config file, using defaults");
        return Ok(T::default());
      }
      Err(e) => return Err(e.into()),
    };

    let table: toml::Table = toml::from_str(&content)?;

    let Some(value) = table.get(section) else {
      return Ok(T::default());
    };

    decode_section(section, value)
  }
}

impl ConfigBackend for TomlConfigBackend {
  fn load_section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
    let path = self.paths.config_file();
    let content = fs::read_to_string(&path)?;
    let table: toml::Table = toml::from_str(&content)?;

    let value = table
      .get(section)
      .ok_or_else(|| ConfigError::Other(format!("missing section [{section}] in {:?}", path)))?;

    decode_section(section, value)
  }

  fn save_section<T: Serialize>(&self, section: &str, value: &T) -> Result<(), ConfigError> {
    use std::io::ErrorKind;

    let path = self.paths.config_file();

    let mut doc: DocumentMut = match fs::read_to_string(&path) {
      Ok(content) => content
        .parse::<DocumentMut>()
        .map_err(|e| ConfigError::Other(format!("parse toml_edit doc: {e}")))?,
      Err(e) if e.kind() == ErrorKind::NotFound => DocumentMut::new(),
      Err(e) => return Err(e.into()),
    };

    let section_str = toml::to_string(value)
      .map_err(|e| ConfigError::Other(format!("encode section [{section}]: {e}")))?;

    // `section_str` is a bare table body ("foo = 1\nbar = 2\n"); reparse it
    // as a document to get an `Item` we can hang under the header.
    let section_item: Item = section_str
      .parse::<DocumentMut>()
      .map_err(|e| ConfigError::Other(format!("parse section as doc: {e}")))?
      .into_item();

    doc[section] = section_item;

    atomic_write_str(&path, &doc.to_string())?;
    debug!(path = %path.display(), section, "config section saved");

    Ok(())
  }
}

fn decode_section<T: DeserializeOwned>(section: &str, value: &toml::Value) -> Result<T, ConfigError> {
  value
    .clone()
    .try_into()
    .map_err(|e| ConfigError::Other(format!("decode section [{section}]: {e}")))
}
