//! The contact view engine.
//!
//! Given an immutable contact snapshot and a [`ViewQuery`], [`compute`]
//! produces the page of contacts to render plus pagination totals. It is a
//! pure function: the same inputs always give the same page, and nothing it
//! borrows is mutated.
//!
//! [`ViewState`] is the mutable holder a front end keeps between renders. It
//! owns the query, resets the page whenever a filter or the sort changes, and
//! keeps the page inside `[1, total_pages]` as result sizes change.

use std::{cmp::Ordering, num::NonZeroUsize};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::trace;

use crate::{
  collate,
  contact::{Contact, ContactField},
  favorites::FavoriteSet,
  pagination,
};

/// Contacts per page in the directory grid.
pub const PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(20).unwrap();

// ─── View ────────────────────────────────────────────────────────────────────

/// The top-level category selector.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum View {
  /// Everyone except third-party companies.
  #[default]
  All,
  /// Emergency Response Team members.
  Emergency,
  Ifa,
  ThirdParty,
  Favorites,
  /// Regular staff only, browsed by language.
  Languages,
  /// Regular staff only, browsed by tag.
  Tags,
}

impl View {
  pub fn title(self) -> &'static str {
    match self {
      Self::All => "All Contacts",
      Self::Emergency => "Emergency Response Team",
      Self::Ifa => "IFA Contacts",
      Self::ThirdParty => "Third Party Companies",
      Self::Favorites => "Favorites",
      Self::Languages => "Languages",
      Self::Tags => "Tags",
    }
  }

  /// Whether `contact` belongs to this category.
  pub fn admits(self, contact: &Contact, favorites: &FavoriteSet) -> bool {
    match self {
      Self::All => !contact.is_third_party,
      Self::Emergency => contact.is_ert,
      Self::Ifa => contact.is_ifa,
      Self::ThirdParty => contact.is_third_party,
      Self::Favorites => favorites.contains(&contact.id),
      Self::Languages | Self::Tags => !contact.is_ifa && !contact.is_third_party,
    }
  }
}

// ─── Sort ────────────────────────────────────────────────────────────────────

/// The field the directory is ordered by.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
  #[default]
  Name,
  Department,
  /// Compared as text, not numerically.
  Extension,
}

fn by_name(a: &Contact, b: &Contact) -> Ordering {
  collate::compare(a.text(ContactField::Name), b.text(ContactField::Name))
}

fn by_department(a: &Contact, b: &Contact) -> Ordering {
  collate::compare(
    a.text(ContactField::Department),
    b.text(ContactField::Department),
  )
}

fn by_extension(a: &Contact, b: &Contact) -> Ordering {
  collate::compare(
    a.text(ContactField::Extension),
    b.text(ContactField::Extension),
  )
}

impl SortKey {
  pub fn comparator(self) -> fn(&Contact, &Contact) -> Ordering {
    match self {
      Self::Name => by_name,
      Self::Department => by_department,
      Self::Extension => by_extension,
    }
  }

  /// The next key in menu order, wrapping around.
  pub fn next(self) -> Self {
    let keys: Vec<Self> = Self::iter().collect();
    let idx = keys.iter().position(|&k| k == self).unwrap_or(0);
    keys[(idx + 1) % keys.len()]
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Every input to one engine computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
  pub view:      View,
  /// Free-text filter; empty means no filter.
  pub search:    String,
  pub tag:       Option<String>,
  pub language:  Option<String>,
  pub sort_by:   SortKey,
  /// 1-based.
  pub page:      usize,
  pub page_size: NonZeroUsize,
}

impl Default for ViewQuery {
  fn default() -> Self {
    Self {
      view:      View::default(),
      search:    String::new(),
      tag:       None,
      language:  None,
      sort_by:   SortKey::default(),
      page:      1,
      page_size: PAGE_SIZE,
    }
  }
}

/// One rendered page of the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPage<'a> {
  pub contacts:      Vec<&'a Contact>,
  /// The page these contacts were sliced from.
  pub page:          usize,
  /// Always at least 1.
  pub total_pages:   usize,
  pub total_results: usize,
}

impl<'a> ContactPage<'a> {
  /// Slice an already filtered and sorted list.
  pub fn paginate(
    items: Vec<&'a Contact>,
    page: usize,
    page_size: NonZeroUsize,
  ) -> Self {
    let total_results = items.len();
    let total_pages = pagination::total_pages(total_results, page_size);
    let (start, end) = pagination::page_bounds(page, page_size, total_results);
    Self {
      contacts: items[start..end].to_vec(),
      page: page.max(1),
      total_pages,
      total_results,
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Filter and sort `contacts` for `query`, without paginating.
pub fn select<'a>(
  contacts: &'a [Contact],
  favorites: &FavoriteSet,
  query: &ViewQuery,
) -> Vec<&'a Contact> {
  let needle = (!query.search.is_empty()).then(|| query.search.to_lowercase());

  let mut selected: Vec<&Contact> = contacts
    .iter()
    .filter(|c| query.view.admits(c, favorites))
    .filter(|c| needle.as_deref().is_none_or(|n| c.matches_lowercase(n)))
    .filter(|c| query.tag.as_deref().is_none_or(|t| c.has_tag(t)))
    .filter(|c| query.language.as_deref().is_none_or(|l| c.speaks(l)))
    .collect();

  // `sort_by` is stable: ties keep snapshot order.
  let cmp = query.sort_by.comparator();
  selected.sort_by(|a, b| cmp(a, b));
  selected
}

/// Compute the visible page for `query`.
pub fn compute<'a>(
  contacts: &'a [Contact],
  favorites: &FavoriteSet,
  query: &ViewQuery,
) -> ContactPage<'a> {
  let selected = select(contacts, favorites, query);
  trace!(
    view = %query.view,
    results = selected.len(),
    page = query.page,
    "computed contact view"
  );
  ContactPage::paginate(selected, query.page, query.page_size)
}

// ─── View state ──────────────────────────────────────────────────────────────

/// The query a front end holds between renders.
#[derive(Debug, Clone)]
pub struct ViewState {
  query:         ViewQuery,
  total_pages:   usize,
  total_results: usize,
}

impl Default for ViewState {
  fn default() -> Self {
    Self { query: ViewQuery::default(), total_pages: 1, total_results: 0 }
  }
}

impl ViewState {
  pub fn new() -> Self { Self::default() }

  pub fn query(&self) -> &ViewQuery { &self.query }

  /// Totals from the most recent [`ViewState::compute`].
  pub fn total_pages(&self) -> usize { self.total_pages }

  pub fn total_results(&self) -> usize { self.total_results }

  fn reset_page(&mut self) { self.query.page = 1; }

  /// Switch category. Also clears the tag and language selections.
  pub fn set_view(&mut self, view: View) {
    let changed = view != self.query.view
      || self.query.tag.is_some()
      || self.query.language.is_some();
    self.query.view = view;
    self.query.tag = None;
    self.query.language = None;
    if changed {
      self.reset_page();
    }
  }

  pub fn set_search(&mut self, search: impl Into<String>) {
    let search = search.into();
    if search != self.query.search {
      self.query.search = search;
      self.reset_page();
    }
  }

  pub fn set_tag(&mut self, tag: Option<String>) {
    if tag != self.query.tag {
      self.query.tag = tag;
      self.reset_page();
    }
  }

  pub fn set_language(&mut self, language: Option<String>) {
    if language != self.query.language {
      self.query.language = language;
      self.reset_page();
    }
  }

  /// Select `tag`, or clear it if it is already selected.
  pub fn toggle_tag(&mut self, tag: &str) {
    let next = match self.query.tag.as_deref() {
      Some(current) if current == tag => None,
      _ => Some(tag.to_owned()),
    };
    self.set_tag(next);
  }

  /// Select `language`, or clear it if it is already selected.
  pub fn toggle_language(&mut self, language: &str) {
    let next = match self.query.language.as_deref() {
      Some(current) if current == language => None,
      _ => Some(language.to_owned()),
    };
    self.set_language(next);
  }

  pub fn set_sort(&mut self, sort_by: SortKey) {
    if sort_by != self.query.sort_by {
      self.query.sort_by = sort_by;
      self.reset_page();
    }
  }

  /// Change page only; clamped to the last computed page count.
  pub fn set_page(&mut self, page: usize) {
    self.query.page = page.clamp(1, self.total_pages);
  }

  pub fn next_page(&mut self) { self.set_page(self.query.page + 1); }

  pub fn prev_page(&mut self) { self.set_page(self.query.page.saturating_sub(1)); }

  pub fn first_page(&mut self) { self.set_page(1); }

  pub fn last_page(&mut self) { self.set_page(self.total_pages); }

  /// Run the engine for the current query.
  ///
  /// `None` stands for a snapshot that has not loaded (or failed to load) and
  /// is treated as empty. If the result count shrank below the current page,
  /// the page is pulled back to the last one before slicing.
  pub fn compute<'a>(
    &mut self,
    contacts: Option<&'a [Contact]>,
    favorites: &FavoriteSet,
  ) -> ContactPage<'a> {
    let selected = select(contacts.unwrap_or_default(), favorites, &self.query);
    self.total_results = selected.len();
    self.total_pages = pagination::total_pages(self.total_results, self.query.page_size);
    self.query.page = self.query.page.clamp(1, self.total_pages);
    ContactPage::paginate(selected, self.query.page, self.query.page_size)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::*;

  fn contact(id: &str, name: &str) -> Contact { Contact::new(id, name) }

  fn numbered(n: usize) -> Vec<Contact> {
    (0..n)
      .map(|i| contact(&format!("c{i:02}"), &format!("Person {i:02}")))
      .collect()
  }

  fn ids<'a>(page: &ContactPage<'a>) -> Vec<&'a str> {
    page.contacts.iter().map(|c| c.id.as_str()).collect()
  }

  fn query() -> ViewQuery { ViewQuery::default() }

  fn none() -> FavoriteSet { FavoriteSet::new() }

  /// A mixed directory used by several tests.
  fn directory() -> Vec<Contact> {
    let mut jane = contact("1", "Jane Doe");
    jane.department = Some("Sales".into());
    jane.tags = vec!["VIP".into()];
    jane.languages = vec!["English".into(), "French".into()];

    let mut raj = contact("2", "Raj Patel");
    raj.department = Some("Engineering".into());
    raj.is_ert = true;
    raj.tags = vec!["IT".into()];
    raj.languages = vec!["Hindi".into(), "English".into()];

    let mut acme = contact("3", "Acme Laundry");
    acme.company = Some("Acme Ltd".into());
    acme.is_third_party = true;
    acme.tags = vec!["VIP".into()];

    let mut lena = contact("4", "Lena Ito");
    lena.designation = Some("Concierge".into());
    lena.is_ifa = true;
    lena.languages = vec!["Japanese".into()];

    let mut omar = contact("5", "Omar Haddad");
    omar.extension = Some("9".into());
    omar.email = Some("omar@hotel.example".into());
    omar.tags = vec!["VIP".into(), "IT".into()];

    vec![jane, raj, acme, lena, omar]
  }

  // ── Scenarios ────────────────────────────────────────────────────────────

  #[test]
  fn scenario_a_two_pages_of_twenty_and_five() {
    let contacts = numbered(25);

    let first = compute(&contacts, &none(), &query());
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.total_results, 25);
    assert_eq!(first.contacts.len(), 20);

    let second = compute(&contacts, &none(), &ViewQuery { page: 2, ..query() });
    assert_eq!(second.contacts.len(), 5);
    assert_eq!(ids(&second).first(), Some(&"c20"));
  }

  #[test]
  fn scenario_b_search_matches_fields_case_insensitively() {
    let mut jane = contact("1", "Jane Doe");
    jane.department = Some("Sales".into());
    let contacts = vec![jane];

    let hit = compute(&contacts, &none(), &ViewQuery { search: "jane".into(), ..query() });
    assert_eq!(hit.total_results, 1);

    let miss =
      compute(&contacts, &none(), &ViewQuery { search: "finance".into(), ..query() });
    assert_eq!(miss.total_results, 0);
    assert!(miss.contacts.is_empty());
  }

  #[test]
  fn scenario_c_tag_filter_keeps_sorted_order() {
    let mut a = contact("a", "Zed");
    a.tags = vec!["VIP".into()];
    let mut b = contact("b", "Amy");
    b.tags = vec!["VIP".into()];
    let mut c = contact("c", "Mo");
    c.tags = vec!["IT".into()];
    let contacts = vec![a, b, c];

    let page = compute(&contacts, &none(), &ViewQuery { tag: Some("VIP".into()), ..query() });
    assert_eq!(ids(&page), vec!["b", "a"]);
  }

  #[test]
  fn scenario_d_third_party_only_in_its_own_view() {
    let mut vendor = contact("v", "Vendor");
    vendor.is_third_party = true;
    let contacts = vec![vendor];

    let all = compute(&contacts, &none(), &query());
    assert_eq!(all.total_results, 0);

    let tp = compute(&contacts, &none(), &ViewQuery { view: View::ThirdParty, ..query() });
    assert_eq!(ids(&tp), vec!["v"]);
  }

  #[test]
  fn scenario_e_empty_input() {
    let page = compute(&[], &none(), &query());
    assert!(page.contacts.is_empty());
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.total_results, 0);

    let mut state = ViewState::new();
    let page = state.compute(None, &none());
    assert_eq!((page.total_pages, page.total_results), (1, 0));
  }

  #[test]
  fn scenario_f_extension_sorts_as_text() {
    let contacts: Vec<Contact> = ["103", "12", "9"]
      .into_iter()
      .rev()
      .map(|ext| {
        let mut c = contact(ext, "x");
        c.extension = Some(ext.into());
        c
      })
      .collect();

    let page =
      compute(&contacts, &none(), &ViewQuery { sort_by: SortKey::Extension, ..query() });
    assert_eq!(ids(&page), vec!["103", "12", "9"]);
  }

  // ── Categories ───────────────────────────────────────────────────────────

  #[test]
  fn each_view_admits_its_partition() {
    let contacts = directory();
    let favs: FavoriteSet = ["4", "2"].into_iter().collect();

    let of = |view| {
      let mut got: Vec<String> = compute(&contacts, &favs, &ViewQuery { view, ..query() })
        .contacts
        .iter()
        .map(|c| c.id.clone())
        .collect();
      got.sort();
      got
    };

    assert_eq!(of(View::All), vec!["1", "2", "4", "5"]);
    assert_eq!(of(View::Emergency), vec!["2"]);
    assert_eq!(of(View::Ifa), vec!["4"]);
    assert_eq!(of(View::ThirdParty), vec!["3"]);
    assert_eq!(of(View::Favorites), vec!["2", "4"]);
    assert_eq!(of(View::Languages), vec!["1", "2", "5"]);
    assert_eq!(of(View::Tags), vec!["1", "2", "5"]);
  }

  #[test]
  fn favorites_ignore_contacts_without_id() {
    let contacts = vec![contact("", "Ghost"), contact("x", "Xena")];
    let favs: FavoriteSet = ["x"].into_iter().collect();
    let page = compute(&contacts, &favs, &ViewQuery { view: View::Favorites, ..query() });
    assert_eq!(ids(&page), vec!["x"]);
  }

  #[test]
  fn view_names_parse() {
    assert_eq!("thirdparty".parse::<View>().unwrap(), View::ThirdParty);
    assert_eq!(View::Emergency.to_string(), "emergency");
    assert_eq!(View::iter().count(), 7);
  }

  // ── Filters ──────────────────────────────────────────────────────────────

  #[test]
  fn search_covers_extension_email_and_company() {
    let contacts = directory();
    let find = |s: &str, view| {
      compute(&contacts, &none(), &ViewQuery { search: s.into(), view, ..query() })
        .total_results
    };
    assert_eq!(find("9", View::All), 1);
    assert_eq!(find("HOTEL.EXAMPLE", View::All), 1);
    assert_eq!(find("acme ltd", View::ThirdParty), 1);
    assert_eq!(find("concierge", View::Ifa), 1);
  }

  #[test]
  fn language_and_tag_filters_compose() {
    let contacts = directory();
    let q = ViewQuery {
      tag: Some("IT".into()),
      language: Some("English".into()),
      ..query()
    };
    assert_eq!(ids(&compute(&contacts, &none(), &q)), vec!["2"]);

    let q = ViewQuery { language: Some("english".into()), ..query() };
    assert_eq!(compute(&contacts, &none(), &q).total_results, 0, "exact match only");
  }

  #[test]
  fn filter_order_does_not_change_the_result_set() {
    let contacts = directory();
    let favs: FavoriteSet = ["1", "5"].into_iter().collect();

    for view in View::iter() {
      for search in ["", "e", "sales"] {
        for tag in [None, Some("VIP")] {
          for language in [None, Some("English")] {
            let q = ViewQuery {
              view,
              search: search.into(),
              tag: tag.map(Into::into),
              language: language.map(Into::into),
              ..query()
            };
            let engine: BTreeSet<&str> =
              select(&contacts, &favs, &q).iter().map(|c| c.id.as_str()).collect();

            // Same predicates, applied in reverse order.
            let needle = search.to_lowercase();
            let manual: BTreeSet<&str> = contacts
              .iter()
              .filter(|c| language.is_none_or(|l| c.speaks(l)))
              .filter(|c| tag.is_none_or(|t| c.has_tag(t)))
              .filter(|c| needle.is_empty() || c.matches_lowercase(&needle))
              .filter(|c| view.admits(c, &favs))
              .map(|c| c.id.as_str())
              .collect();

            assert_eq!(engine, manual, "{q:?}");
          }
        }
      }
    }
  }

  // ── Sorting ──────────────────────────────────────────────────────────────

  #[test]
  fn missing_sort_field_sorts_first_and_ties_are_stable() {
    let mut a = contact("a", "A");
    a.department = Some("Sales".into());
    let b = contact("b", "B");
    let mut c = contact("c", "C");
    c.department = Some("sales".into());
    let mut d = contact("d", "D");
    d.department = Some("Sales".into());
    let contacts = vec![a, b, c, d];

    let page =
      compute(&contacts, &none(), &ViewQuery { sort_by: SortKey::Department, ..query() });
    assert_eq!(ids(&page), vec!["b", "c", "a", "d"]);
  }

  #[test]
  fn sort_keys_cycle() {
    assert_eq!(SortKey::Name.next(), SortKey::Department);
    assert_eq!(SortKey::Extension.next(), SortKey::Name);
  }

  // ── Pagination properties ────────────────────────────────────────────────

  #[test]
  fn page_lengths_follow_the_formula() {
    for n in [1, 19, 20, 21, 40, 57] {
      let contacts = numbered(n);
      for size in [1, 7, 20] {
        let page_size = NonZeroUsize::new(size).unwrap();
        let expected_pages = n.div_ceil(size).max(1);
        for page in 1..=expected_pages + 1 {
          let got = compute(&contacts, &none(), &ViewQuery { page, page_size, ..query() });
          assert_eq!(got.total_pages, expected_pages);
          let remaining = n.saturating_sub((page - 1) * size);
          assert_eq!(got.contacts.len(), remaining.min(size), "n={n} size={size} page={page}");
        }
      }
    }
  }

  #[test]
  fn page_past_the_end_is_empty() {
    let contacts = numbered(3);
    let page = compute(&contacts, &none(), &ViewQuery { page: 50, ..query() });
    assert!(page.contacts.is_empty());
    assert_eq!(page.total_pages, 1);
  }

  #[test]
  fn compute_is_idempotent() {
    let contacts = directory();
    let favs: FavoriteSet = ["2"].into_iter().collect();
    let q = ViewQuery { search: "a".into(), sort_by: SortKey::Department, ..query() };
    assert_eq!(compute(&contacts, &favs, &q), compute(&contacts, &favs, &q));
  }

  // ── View state ───────────────────────────────────────────────────────────

  #[test]
  fn filter_changes_reset_the_page() {
    let contacts = numbered(60);
    let favs = none();
    let mut state = ViewState::new();
    state.compute(Some(contacts.as_slice()), &favs);

    state.set_page(3);
    state.set_search("person");
    assert_eq!(state.query().page, 1);

    state.set_page(2);
    state.set_sort(SortKey::Extension);
    assert_eq!(state.query().page, 1);

    state.set_page(2);
    state.set_tag(Some("VIP".into()));
    assert_eq!(state.query().page, 1);
  }

  #[test]
  fn unchanged_filter_keeps_the_page() {
    let contacts = numbered(60);
    let mut state = ViewState::new();
    state.compute(Some(contacts.as_slice()), &none());
    state.set_page(2);
    state.set_search("");
    state.set_sort(SortKey::Name);
    state.set_view(View::All);
    assert_eq!(state.query().page, 2);
  }

  #[test]
  fn set_view_clears_tag_and_language() {
    let mut state = ViewState::new();
    state.set_tag(Some("VIP".into()));
    state.set_language(Some("English".into()));
    state.set_view(View::Emergency);
    assert_eq!(state.query().tag, None);
    assert_eq!(state.query().language, None);
    assert_eq!(state.query().view, View::Emergency);
  }

  #[test]
  fn toggling_the_active_tag_clears_it() {
    let mut state = ViewState::new();
    state.toggle_tag("VIP");
    assert_eq!(state.query().tag.as_deref(), Some("VIP"));
    state.toggle_tag("IT");
    assert_eq!(state.query().tag.as_deref(), Some("IT"));
    state.toggle_tag("IT");
    assert_eq!(state.query().tag, None);

    state.toggle_language("French");
    state.toggle_language("French");
    assert_eq!(state.query().language, None);
  }

  #[test]
  fn page_navigation_is_clamped() {
    let contacts = numbered(45);
    let mut state = ViewState::new();
    state.compute(Some(contacts.as_slice()), &none());
    assert_eq!(state.total_pages(), 3);

    state.prev_page();
    assert_eq!(state.query().page, 1);
    state.last_page();
    assert_eq!(state.query().page, 3);
    state.next_page();
    assert_eq!(state.query().page, 3);
    state.set_page(0);
    assert_eq!(state.query().page, 1);
  }

  #[test]
  fn shrinking_results_pull_the_page_back() {
    let big = numbered(45);
    let small = numbered(5);
    let mut state = ViewState::new();
    state.compute(Some(big.as_slice()), &none());
    state.last_page();

    // Snapshot replaced by a smaller one without any filter change.
    let page = state.compute(Some(small.as_slice()), &none());
    assert_eq!(page.page, 1);
    assert_eq!(page.contacts.len(), 5);
    assert_eq!(state.query().page, 1);
  }

  #[test]
  fn changing_page_keeps_the_filtered_set() {
    let contacts = directory();
    let favs = none();
    let mut state = ViewState::new();
    state.set_search("e");

    let before = select(&contacts, &favs, state.query());
    state.compute(Some(contacts.as_slice()), &favs);
    state.set_page(2);
    let after = select(&contacts, &favs, state.query());
    assert_eq!(before, after);
  }
}
