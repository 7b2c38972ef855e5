//! Listing pipeline for the admin contact table.
//!
//! Unlike the public directory the admin table shows every record, including
//! third-party and hidden ones, sorts on a clickable column in either
//! direction, and uses a smaller page.

use std::{cmp::Ordering, num::NonZeroUsize};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  contact::{Contact, ContactField},
  view::ContactPage,
};

/// Rows per page in the admin table.
pub const ADMIN_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(10).unwrap();

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdminColumn {
  #[default]
  Name,
  Designation,
  Department,
  Extension,
  Ert,
}

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl SortDirection {
  pub fn toggle(self) -> Self {
    match self {
      Self::Asc => Self::Desc,
      Self::Desc => Self::Asc,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminQuery {
  pub search:    String,
  pub column:    AdminColumn,
  pub direction: SortDirection,
  pub page:      usize,
  pub page_size: NonZeroUsize,
}

impl Default for AdminQuery {
  fn default() -> Self {
    Self {
      search:    String::new(),
      column:    AdminColumn::default(),
      direction: SortDirection::default(),
      page:      1,
      page_size: ADMIN_PAGE_SIZE,
    }
  }
}

impl AdminQuery {
  /// Header click: the active column flips direction, any other column
  /// becomes active in ascending order.
  pub fn sort_by(&mut self, column: AdminColumn) {
    if self.column == column {
      self.direction = self.direction.toggle();
    } else {
      self.column = column;
      self.direction = SortDirection::Asc;
    }
  }

  pub fn set_search(&mut self, search: impl Into<String>) {
    self.search = search.into();
    self.page = 1;
  }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
  Flag(bool),
  Text(String),
}

fn sort_value(contact: &Contact, column: AdminColumn) -> SortValue {
  let text = |f| SortValue::Text(contact.text(f).to_lowercase());
  match column {
    AdminColumn::Name => text(ContactField::Name),
    AdminColumn::Designation => text(ContactField::Designation),
    AdminColumn::Department => text(ContactField::Department),
    AdminColumn::Extension => text(ContactField::Extension),
    AdminColumn::Ert => SortValue::Flag(contact.is_ert),
  }
}

/// Filter, sort and paginate the admin table.
pub fn compute<'a>(contacts: &'a [Contact], query: &AdminQuery) -> ContactPage<'a> {
  let needle = query.search.to_lowercase();
  let mut rows: Vec<(SortValue, &Contact)> = contacts
    .iter()
    .filter(|c| needle.is_empty() || c.matches_lowercase(&needle))
    .map(|c| (sort_value(c, query.column), c))
    .collect();

  rows.sort_by(|(a, _), (b, _)| {
    let ord: Ordering = a.cmp(b);
    match query.direction {
      SortDirection::Asc => ord,
      SortDirection::Desc => ord.reverse(),
    }
  });

  let rows = rows.into_iter().map(|(_, c)| c).collect();
  ContactPage::paginate(rows, query.page, query.page_size)
}
