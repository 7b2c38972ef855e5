//! The user's favorite contacts, identified by contact id.

use serde::{Deserialize, Serialize};

/// An insertion-ordered set of contact ids.
///
/// Serialises as a plain JSON array so it can be persisted as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FavoriteSet {
  ids: Vec<String>,
}

impl FavoriteSet {
  pub fn new() -> Self { Self::default() }

  /// Empty ids are never members.
  pub fn contains(&self, id: &str) -> bool {
    !id.is_empty() && self.ids.iter().any(|f| f == id)
  }

  /// Returns `false` if the id was already present or is empty.
  pub fn insert(&mut self, id: impl Into<String>) -> bool {
    let id = id.into();
    if id.is_empty() || self.contains(&id) {
      return false;
    }
    self.ids.push(id);
    true
  }

  /// Returns `true` if the id was present.
  pub fn remove(&mut self, id: &str) -> bool {
    let before = self.ids.len();
    self.ids.retain(|f| f != id);
    self.ids.len() != before
  }

  /// Flip membership and return the new state.
  pub fn toggle(&mut self, id: &str) -> bool {
    if self.remove(id) {
      false
    } else {
      self.insert(id)
    }
  }

  pub fn len(&self) -> usize { self.ids.len() }

  pub fn is_empty(&self) -> bool { self.ids.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.ids.iter().map(String::as_str)
  }
}

impl From<Vec<String>> for FavoriteSet {
  fn from(ids: Vec<String>) -> Self {
    let mut set = Self::new();
    for id in ids {
      set.insert(id);
    }
    set
  }
}

impl From<FavoriteSet> for Vec<String> {
  fn from(set: FavoriteSet) -> Self { set.ids }
}

impl<S: Into<String>> FromIterator<S> for FavoriteSet {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    let mut set = Self::new();
    for id in iter {
      set.insert(id);
    }
    set
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toggle_flips_membership() {
    let mut favs = FavoriteSet::new();
    assert!(favs.toggle("a"));
    assert!(favs.contains("a"));
    assert!(!favs.toggle("a"));
    assert!(!favs.contains("a"));
    assert!(favs.is_empty());
  }

  #[test]
  fn empty_ids_are_never_members() {
    let mut favs = FavoriteSet::new();
    assert!(!favs.insert(""));
    assert!(!favs.toggle(""));
    assert!(!favs.contains(""));
  }

  #[test]
  fn json_is_a_deduplicated_array() {
    let favs: FavoriteSet = serde_json::from_str(r#"["b","a","b"]"#).unwrap();
    assert_eq!(favs.iter().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(serde_json::to_string(&favs).unwrap(), r#"["b","a"]"#);
  }
}
