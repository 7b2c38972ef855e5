//! Error types for `phonebook-core`.

use std::fmt;

use thiserror::Error;

/// A single field-level validation failure on a [`crate::contact::ContactDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: &'static str,
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.field, self.message)
  }
}

/// Every validation failure found on a draft, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// The message recorded for `field`, if it failed.
  pub fn get(&self, field: &str) -> Option<&'static str> {
    self.0.iter().find(|e| e.field == field).map(|e| e.message)
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
    f.write_str(&parts.join("; "))
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid contact: {0}")]
  Validation(ValidationErrors),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
