//! Layered settings: optional file, then `PHONEBOOK_*` environment
//! variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_URL: &str = "http://localhost:8000";
pub const DEFAULT_DATA_DIR: &str = "~/.local/share/phonebook";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Base URL of the phonebook backend (without the `/api` suffix).
  pub url:      String,
  /// Where favorites and the session are stored. May start with `~/`.
  pub data_dir: PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    Self { url: DEFAULT_URL.to_string(), data_dir: PathBuf::from(DEFAULT_DATA_DIR) }
  }
}

impl Settings {
  /// Read `file` (if given) and the environment.
  pub fn load(file: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = file {
      builder = builder.add_source(config::File::from(path).required(true));
    }
    builder
      .add_source(config::Environment::with_prefix("PHONEBOOK"))
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  /// Apply command-line overrides.
  pub fn with_overrides(mut self, url: Option<String>, data_dir: Option<PathBuf>) -> Self {
    if let Some(url) = url {
      self.url = url;
    }
    if let Some(dir) = data_dir {
      self.data_dir = dir;
    }
    self
  }

  pub fn data_dir(&self) -> PathBuf { expand_tilde(&self.data_dir) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  #[test]
  fn file_values_fill_in_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.toml");
    fs::write(&path, "url = \"https://directory.example\"\n").unwrap();

    let settings = Settings::load(Some(&path)).unwrap();
    assert_eq!(settings.url, "https://directory.example");
    assert_eq!(settings.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
  }

  #[test]
  fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
  }

  #[test]
  fn flags_win() {
    let settings = Settings::default()
      .with_overrides(Some("http://other:9000".into()), Some("/tmp/pb".into()));
    assert_eq!(settings.url, "http://other:9000");
    assert_eq!(settings.data_dir(), PathBuf::from("/tmp/pb"));
  }

  #[test]
  fn absolute_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("/var/pb")), PathBuf::from("/var/pb"));
  }
}
