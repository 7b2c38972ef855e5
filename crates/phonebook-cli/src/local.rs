//! Client-side state kept between runs: favorites and the login session.

use std::{
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use phonebook_core::favorites::FavoriteSet;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

const FAVORITES_FILE: &str = "favorites.json";
const SESSION_FILE: &str = "session.json";

/// The bearer token from the last successful `login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub token:    String,
  pub username: String,
}

/// JSON files under the data directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
  dir: PathBuf,
}

impl LocalStore {
  /// Open (creating if needed) the data directory.
  pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
    let dir = dir.into();
    fs::create_dir_all(&dir)
      .with_context(|| format!("creating data directory {}", dir.display()))?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Missing or unreadable files load as `None`; corrupt ones are logged.
  fn read<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
    let path = self.dir.join(name);
    let raw = match fs::read_to_string(&path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == ErrorKind::NotFound => return None,
      Err(error) => {
        warn!(path = %path.display(), %error, "unreadable local state file");
        return None;
      }
    };
    match serde_json::from_str(&raw) {
      Ok(value) => Some(value),
      Err(error) => {
        warn!(path = %path.display(), %error, "ignoring corrupt local state file");
        None
      }
    }
  }

  fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
    let path = self.dir.join(name);
    let json = serde_json::to_string_pretty(value)
      .with_context(|| format!("serialising {name}"))?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "saved local state");
    Ok(())
  }

  fn remove(&self, name: &str) -> Result<()> {
    let path = self.dir.join(name);
    match fs::remove_file(&path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
  }

  // ── Favorites ─────────────────────────────────────────────────────────────

  pub fn load_favorites(&self) -> FavoriteSet {
    self.read(FAVORITES_FILE).unwrap_or_default()
  }

  pub fn save_favorites(&self, favorites: &FavoriteSet) -> Result<()> {
    self.write(FAVORITES_FILE, favorites)
  }

  // ── Session ───────────────────────────────────────────────────────────────

  pub fn load_session(&self) -> Option<Session> { self.read(SESSION_FILE) }

  pub fn save_session(&self, session: &Session) -> Result<()> {
    self.write(SESSION_FILE, session)
  }

  /// Succeeds when there is no session to clear.
  pub fn clear_session(&self) -> Result<()> { self.remove(SESSION_FILE) }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  fn store() -> (TempDir, LocalStore) {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::open(dir.path().join("nested")).unwrap();
    (dir, store)
  }

  #[test]
  fn favorites_survive_a_reopen() {
    let (_dir, store) = store();
    assert!(store.load_favorites().is_empty());

    let favs: FavoriteSet = ["b", "a"].into_iter().collect();
    store.save_favorites(&favs).unwrap();

    let reopened = LocalStore::open(store.dir()).unwrap();
    assert_eq!(reopened.load_favorites(), favs);
  }

  #[test]
  fn corrupt_favorites_load_empty() {
    let (_dir, store) = store();
    fs::write(store.dir().join(FAVORITES_FILE), "{not json").unwrap();
    assert!(store.load_favorites().is_empty());
  }

  #[test]
  fn session_round_trip_and_clear() {
    let (_dir, store) = store();
    assert_eq!(store.load_session(), None);

    let session = Session { token: "jwt".into(), username: "admin".into() };
    store.save_session(&session).unwrap();
    assert_eq!(store.load_session(), Some(session));

    store.clear_session().unwrap();
    assert_eq!(store.load_session(), None);
    store.clear_session().unwrap();
  }
}
