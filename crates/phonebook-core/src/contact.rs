//! Contact records, the snapshot they arrive in, and the draft used to write
//! them back.
//!
//! Records come from an external backend that is not always tidy: fields may
//! be `null`, missing, or numbers where text is expected. Deserialisation here
//! never fails on a single bad field; it degrades the field to its default so
//! the view engine only ever compares strings.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::warn;

use crate::{
  Error, Result,
  error::{FieldError, ValidationErrors},
};

// ─── Lenient field decoding ──────────────────────────────────────────────────

fn lenient_text<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(scalar_text))
}

fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Backends send flags as booleans, `0`/`1`, or `"true"`/`"false"`.
/// `None` means the value carries no truth (null, other strings, objects).
fn truthy(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => n.as_f64().map(|n| n != 0.0),
    Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
      "true" | "1" => Some(true),
      "false" | "0" => Some(false),
      _ => None,
    },
    _ => None,
  }
}

fn lenient_id<'de, D>(d: D) -> std::result::Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(lenient_text(d)?.unwrap_or_default())
}

fn lenient_list<'de, D>(d: D) -> std::result::Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<Value>::deserialize(d)? {
    Some(Value::Array(items)) => strings_of(&items),
    _ => Vec::new(),
  })
}

fn lenient_flag<'de, D>(d: D) -> std::result::Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(d)?;
  Ok(value.as_ref().and_then(truthy).unwrap_or(false))
}

fn lenient_expose<'de, D>(d: D) -> std::result::Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(d)?;
  Ok(value.as_ref().and_then(truthy).unwrap_or(true))
}

fn default_true() -> bool { true }

fn strings_of(items: &[Value]) -> Vec<String> {
  items
    .iter()
    .filter_map(|v| v.as_str().map(str::to_owned))
    .collect()
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The free-text profile fields of a [`Contact`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ContactField {
  Name,
  Designation,
  Department,
  Company,
  Extension,
  Email,
  Mobile,
  Landline,
  Website,
  Comments,
}

/// Fields matched by the free-text search, in the order they are tried.
pub const SEARCH_FIELDS: [ContactField; 8] = [
  ContactField::Name,
  ContactField::Designation,
  ContactField::Department,
  ContactField::Extension,
  ContactField::Email,
  ContactField::Mobile,
  ContactField::Landline,
  ContactField::Company,
];

/// The four boolean classification flags an admin can toggle.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ContactFlag {
  /// Emergency Response Team member.
  Ert,
  /// Affiliated-hotel contact.
  Ifa,
  /// Visible in the public directory.
  Expose,
  /// External company rather than staff.
  ThirdParty,
}

impl ContactFlag {
  /// Last path segment of the admin toggle endpoint.
  pub fn path_segment(self) -> &'static str {
    match self {
      Self::Ert => "ert",
      Self::Ifa => "ifa",
      Self::Expose => "expose",
      Self::ThirdParty => "third-party",
    }
  }

  /// Query parameter carrying the new value on the toggle endpoint.
  pub fn query_key(self) -> &'static str {
    match self {
      Self::Ert => "is_ert",
      Self::Ifa => "is_ifa",
      Self::Expose => "expose",
      Self::ThirdParty => "is_third_party",
    }
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A directory entry for a person or an external company.
///
/// Backend records may carry their id as `_id`, `id`, or both; decode them
/// with [`Contact::from_value`], which prefers a non-empty `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  #[serde(default, deserialize_with = "lenient_id")]
  pub id:              String,
  #[serde(default, deserialize_with = "lenient_text")]
  pub name:            Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub designation:     Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub department:      Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub company:         Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub extension:       Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub email:           Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub mobile:          Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub landline:        Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub website:         Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub comments:        Option<String>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub languages:       Vec<String>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub tags:            Vec<String>,
  #[serde(default = "default_true", deserialize_with = "lenient_expose")]
  pub expose:          bool,
  #[serde(default, deserialize_with = "lenient_flag")]
  pub is_ert:          bool,
  #[serde(default, deserialize_with = "lenient_flag")]
  pub is_ifa:          bool,
  #[serde(default, deserialize_with = "lenient_flag")]
  pub is_third_party:  bool,
  #[serde(default, deserialize_with = "lenient_text")]
  pub profile_picture: Option<String>,
}

impl Contact {
  /// Decode a backend record, taking the id from `_id` when it is set and
  /// from `id` otherwise.
  pub fn from_value(value: &Value) -> serde_json::Result<Self> {
    let mut contact = Self::deserialize(value)?;
    if let Some(id) = value
      .get("_id")
      .and_then(scalar_text)
      .filter(|id| !id.is_empty())
    {
      contact.id = id;
    }
    Ok(contact)
  }

  /// A contact with only an id and a name; every other field at its default.
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id:              id.into(),
      name:            Some(name.into()),
      designation:     None,
      department:      None,
      company:         None,
      extension:       None,
      email:           None,
      mobile:          None,
      landline:        None,
      website:         None,
      comments:        None,
      languages:       Vec::new(),
      tags:            Vec::new(),
      expose:          true,
      is_ert:          false,
      is_ifa:          false,
      is_third_party:  false,
      profile_picture: None,
    }
  }

  /// The value of a text field, or `""` when absent.
  pub fn text(&self, field: ContactField) -> &str {
    let value = match field {
      ContactField::Name => &self.name,
      ContactField::Designation => &self.designation,
      ContactField::Department => &self.department,
      ContactField::Company => &self.company,
      ContactField::Extension => &self.extension,
      ContactField::Email => &self.email,
      ContactField::Mobile => &self.mobile,
      ContactField::Landline => &self.landline,
      ContactField::Website => &self.website,
      ContactField::Comments => &self.comments,
    };
    value.as_deref().unwrap_or_default()
  }

  /// Display name, falling back to a placeholder for nameless records.
  pub fn display_name(&self) -> &str {
    match self.text(ContactField::Name) {
      "" => "(unnamed)",
      name => name,
    }
  }

  pub fn flag(&self, flag: ContactFlag) -> bool {
    match flag {
      ContactFlag::Ert => self.is_ert,
      ContactFlag::Ifa => self.is_ifa,
      ContactFlag::Expose => self.expose,
      ContactFlag::ThirdParty => self.is_third_party,
    }
  }

  pub fn has_tag(&self, tag: &str) -> bool { self.tags.iter().any(|t| t == tag) }

  pub fn speaks(&self, language: &str) -> bool {
    self.languages.iter().any(|l| l == language)
  }

  /// Whether the lower-cased `needle` occurs in any searchable field.
  ///
  /// `needle` must already be lower-cased; absent fields never match.
  pub fn matches_lowercase(&self, needle: &str) -> bool {
    SEARCH_FIELDS
      .iter()
      .any(|&f| self.text(f).to_lowercase().contains(needle))
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The full contact collection as returned by `GET /api/contacts`.
///
/// Immutable once built. A refresh replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
  contacts: Vec<Contact>,
}

impl Snapshot {
  pub fn new(contacts: Vec<Contact>) -> Self { Self { contacts } }

  /// Build a snapshot from a `{ "contacts": [...] }` response body.
  ///
  /// A missing or non-array `contacts` member yields an empty snapshot.
  /// Elements that are not contact objects are skipped.
  pub fn from_value(value: &Value) -> Self {
    let Some(items) = value.get("contacts").and_then(Value::as_array) else {
      warn!("contacts response has no contacts array; using empty snapshot");
      return Self::default();
    };

    let contacts = items
      .iter()
      .enumerate()
      .filter_map(|(index, item)| match Contact::from_value(item) {
        Ok(contact) => Some(contact),
        Err(error) => {
          warn!(index, %error, "skipping malformed contact record");
          None
        }
      })
      .collect();

    Self { contacts }
  }

  pub fn contacts(&self) -> &[Contact] { &self.contacts }

  pub fn len(&self) -> usize { self.contacts.len() }

  pub fn is_empty(&self) -> bool { self.contacts.is_empty() }

  pub fn find(&self, id: &str) -> Option<&Contact> {
    self.contacts.iter().find(|c| c.id == id)
  }
}

/// Extract a string vocabulary (`{ "tags": [...] }`, `{ "languages": [...] }`)
/// from a response body. Missing or malformed input yields an empty list.
pub fn vocabulary_from_value(value: &Value, key: &str) -> Vec<String> {
  value
    .get(key)
    .and_then(Value::as_array)
    .map(|items| strings_of(items))
    .unwrap_or_default()
}

// ─── Draft ───────────────────────────────────────────────────────────────────

static EMAIL_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static PHONE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[\d\s\-+()]+$").unwrap());

/// Parse a comma-separated list: trimmed, empties dropped, first occurrence
/// of each value kept.
pub fn split_list(raw: &str) -> Vec<String> {
  dedup(raw.split(',').map(str::trim).map(str::to_owned))
}

fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  for item in items {
    if !item.is_empty() && !out.contains(&item) {
      out.push(item);
    }
  }
  out
}

/// Request body for creating or replacing a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
  pub name:            String,
  pub designation:     String,
  pub department:      String,
  pub company:         String,
  pub extension:       String,
  pub email:           String,
  pub mobile:          String,
  pub landline:        String,
  pub website:         String,
  pub comments:        String,
  pub languages:       Vec<String>,
  pub tags:            Vec<String>,
  pub expose:          bool,
  pub is_ert:          bool,
  pub is_ifa:          bool,
  pub is_third_party:  bool,
  pub profile_picture: String,
}

impl Default for ContactDraft {
  fn default() -> Self {
    Self {
      name:            String::new(),
      designation:     String::new(),
      department:      String::new(),
      company:         String::new(),
      extension:       String::new(),
      email:           String::new(),
      mobile:          String::new(),
      landline:        String::new(),
      website:         String::new(),
      comments:        String::new(),
      languages:       Vec::new(),
      tags:            Vec::new(),
      expose:          true,
      is_ert:          false,
      is_ifa:          false,
      is_third_party:  false,
      profile_picture: String::new(),
    }
  }
}

impl ContactDraft {
  /// Pre-fill a draft from an existing record, for editing.
  pub fn from_contact(contact: &Contact) -> Self {
    let text = |f| contact.text(f).to_owned();
    Self {
      name:            text(ContactField::Name),
      designation:     text(ContactField::Designation),
      department:      text(ContactField::Department),
      company:         text(ContactField::Company),
      extension:       text(ContactField::Extension),
      email:           text(ContactField::Email),
      mobile:          text(ContactField::Mobile),
      landline:        text(ContactField::Landline),
      website:         text(ContactField::Website),
      comments:        text(ContactField::Comments),
      languages:       contact.languages.clone(),
      tags:            contact.tags.clone(),
      expose:          contact.expose,
      is_ert:          contact.is_ert,
      is_ifa:          contact.is_ifa,
      is_third_party:  contact.is_third_party,
      profile_picture: contact.profile_picture.clone().unwrap_or_default(),
    }
  }

  /// Mutable access to a text field by name.
  pub fn text_mut(&mut self, field: ContactField) -> &mut String {
    match field {
      ContactField::Name => &mut self.name,
      ContactField::Designation => &mut self.designation,
      ContactField::Department => &mut self.department,
      ContactField::Company => &mut self.company,
      ContactField::Extension => &mut self.extension,
      ContactField::Email => &mut self.email,
      ContactField::Mobile => &mut self.mobile,
      ContactField::Landline => &mut self.landline,
      ContactField::Website => &mut self.website,
      ContactField::Comments => &mut self.comments,
    }
  }

  pub fn set_flag(&mut self, flag: ContactFlag, value: bool) {
    match flag {
      ContactFlag::Ert => self.is_ert = value,
      ContactFlag::Ifa => self.is_ifa = value,
      ContactFlag::Expose => self.expose = value,
      ContactFlag::ThirdParty => self.is_third_party = value,
    }
  }

  /// Trim every text field and re-apply list de-duplication.
  pub fn normalize(&mut self) {
    for field in [
      ContactField::Name,
      ContactField::Designation,
      ContactField::Department,
      ContactField::Company,
      ContactField::Extension,
      ContactField::Email,
      ContactField::Mobile,
      ContactField::Landline,
      ContactField::Website,
      ContactField::Comments,
    ] {
      let value = self.text_mut(field);
      let trimmed = value.trim();
      if trimmed.len() != value.len() {
        *value = trimmed.to_owned();
      }
    }
    self.profile_picture = self.profile_picture.trim().to_owned();
    self.languages = dedup(self.languages.iter().map(|s| s.trim().to_owned()));
    self.tags = dedup(self.tags.iter().map(|s| s.trim().to_owned()));
  }

  /// Collect every field error; `Ok` only if there are none.
  pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if self.name.trim().is_empty() {
      errors.push(FieldError { field: "name", message: "Name is required" });
    }
    if !self.email.is_empty() && !EMAIL_RE.is_match(&self.email) {
      errors.push(FieldError { field: "email", message: "Invalid email format" });
    }
    if !self.mobile.is_empty() && !PHONE_RE.is_match(&self.mobile) {
      errors.push(FieldError {
        field:   "mobile",
        message: "Invalid mobile number format",
      });
    }
    if !self.landline.is_empty() && !PHONE_RE.is_match(&self.landline) {
      errors.push(FieldError {
        field:   "landline",
        message: "Invalid landline number format",
      });
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ValidationErrors(errors))
    }
  }

  /// Normalise then validate, consuming the draft.
  pub fn into_valid(mut self) -> Result<Self> {
    self.normalize();
    self.validate().map_err(Error::Validation)?;
    Ok(self)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
