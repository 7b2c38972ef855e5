//! Application state machine and event dispatcher for the directory browser.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use phonebook_core::{
  contact::{Contact, Snapshot},
  favorites::FavoriteSet,
  view::{View, ViewState},
};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::{
  client::{ApiClient, ClientError, DIRECTORY_LIMIT},
  debounce::{Debouncer, SEARCH_DEBOUNCE},
  local::LocalStore,
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the contact list.
  ContactList,
  /// Focus on the detail pane for the selected contact.
  ContactDetail,
}

/// What keystrokes are currently routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Search,
  TagPicker,
  LanguagePicker,
  /// The emergency numbers popup.
  EmergencyNumbers,
}

// ─── App ──────────────────────────────────────────────────────────────────────

pub struct App {
  pub screen: Screen,
  pub mode:   Mode,

  /// Query, page and totals for the directory.
  pub view: ViewState,

  /// `None` until the first successful fetch.
  pub snapshot:  Option<Snapshot>,
  pub tags:      Vec<String>,
  pub languages: Vec<String>,
  pub favorites: FavoriteSet,

  /// What the user has typed; lags `view.query().search` by the debounce.
  pub search_input: String,

  /// Snapshot indices of the rows on the current page.
  pub page_rows: Vec<usize>,

  /// Cursor position within `page_rows`.
  pub list_cursor:   usize,
  pub picker_cursor: usize,

  /// Snapshot index of the contact in the detail pane.
  pub selected: Option<usize>,

  pub status_msg: String,

  client:    ApiClient,
  store:     LocalStore,
  debouncer: Debouncer<String>,
  settled:   UnboundedReceiver<String>,
}

impl App {
  pub fn new(client: ApiClient, store: LocalStore) -> Self {
    let (debouncer, settled) = Debouncer::new(SEARCH_DEBOUNCE);
    let favorites = store.load_favorites();
    Self {
      screen: Screen::ContactList,
      mode: Mode::Normal,
      view: ViewState::new(),
      snapshot: None,
      tags: Vec::new(),
      languages: Vec::new(),
      favorites,
      search_input: String::new(),
      page_rows: Vec::new(),
      list_cursor: 0,
      picker_cursor: 0,
      selected: None,
      status_msg: String::new(),
      client,
      store,
      debouncer,
      settled,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the snapshot and both vocabularies.
  ///
  /// Failures land in the status bar and leave the previous data in place.
  pub async fn load(&mut self) {
    self.status_msg = "Loading contacts…".into();

    let (contacts, tags, languages) = tokio::join!(
      self.client.list_contacts(DIRECTORY_LIMIT, false),
      self.client.tags(),
      self.client.languages(),
    );

    let contacts = match contacts {
      Err(e) if ClientError::is_unauthorized(&e) && self.client.has_token() => {
        self.drop_session();
        self.client.list_contacts(DIRECTORY_LIMIT, false).await
      }
      other => other,
    };

    let mut errors = Vec::new();
    match contacts {
      Ok(snapshot) => {
        info!(contacts = snapshot.len(), "loaded directory");
        self.snapshot = Some(snapshot);
        self.selected = None;
        self.screen = Screen::ContactList;
      }
      Err(e) => errors.push(format!("contacts: {e:#}")),
    }
    match tags {
      Ok(tags) => self.tags = tags,
      Err(e) => errors.push(format!("tags: {e:#}")),
    }
    match languages {
      Ok(languages) => self.languages = languages,
      Err(e) => errors.push(format!("languages: {e:#}")),
    }

    self.status_msg = if errors.is_empty() {
      String::new()
    } else {
      format!("Error: {}", errors.join("; "))
    };
    self.refresh_view();
  }

  fn drop_session(&mut self) {
    warn!("session rejected by the server; logging out");
    self.client.set_token(None);
    if let Err(e) = self.store.clear_session() {
      warn!(error = %e, "failed to clear session");
    }
  }

  // ── Derived view ──────────────────────────────────────────────────────────

  /// Re-run the engine and remember which snapshot rows are on screen.
  pub fn refresh_view(&mut self) {
    let contacts = self.snapshot.as_ref().map(Snapshot::contacts);
    let page = self.view.compute(contacts, &self.favorites);
    let all = contacts.unwrap_or_default();
    self.page_rows = page
      .contacts
      .iter()
      .filter_map(|p| all.iter().position(|c| std::ptr::eq(c, *p)))
      .collect();
    self.list_cursor = self.list_cursor.min(self.page_rows.len().saturating_sub(1));
  }

  fn contact_at(&self, index: usize) -> Option<&Contact> {
    self.snapshot.as_ref()?.contacts().get(index)
  }

  /// Contacts on the current page, in display order.
  pub fn visible(&self) -> Vec<&Contact> {
    self.page_rows.iter().filter_map(|&i| self.contact_at(i)).collect()
  }

  pub fn cursor_contact(&self) -> Option<&Contact> {
    self.page_rows.get(self.list_cursor).and_then(|&i| self.contact_at(i))
  }

  pub fn selected_contact(&self) -> Option<&Contact> {
    self.selected.and_then(|i| self.contact_at(i))
  }

  /// Vocabulary the open picker chooses from.
  pub fn picker_items(&self) -> &[String] {
    match self.mode {
      Mode::TagPicker => &self.tags,
      Mode::LanguagePicker => &self.languages,
      Mode::Normal | Mode::Search | Mode::EmergencyNumbers => &[],
    }
  }

  // ── Search ────────────────────────────────────────────────────────────────

  /// Typed input that has not been applied yet.
  pub fn search_pending(&self) -> bool { self.debouncer.is_pending() }

  /// Apply search strings that have settled. Called on every tick.
  pub fn poll_search(&mut self) {
    let mut changed = false;
    while let Ok(search) = self.settled.try_recv() {
      self.view.set_search(search);
      changed = true;
    }
    if changed {
      self.list_cursor = 0;
      self.refresh_view();
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    let cont = match self.mode {
      Mode::Search => self.handle_search_key(key),
      Mode::TagPicker | Mode::LanguagePicker => self.handle_picker_key(key),
      Mode::EmergencyNumbers => {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('e' | 'q')) {
          self.mode = Mode::Normal;
        }
        true
      }
      Mode::Normal => match self.screen {
        Screen::ContactList => self.handle_list_key(key).await?,
        Screen::ContactDetail => self.handle_detail_key(key),
      },
    };
    self.refresh_view();
    Ok(cont)
  }

  fn handle_search_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.search_input.clear();
        self.debouncer.flush(String::new());
        self.mode = Mode::Normal;
      }
      KeyCode::Enter => {
        self.debouncer.flush(self.search_input.clone());
        self.mode = Mode::Normal;
      }
      KeyCode::Backspace => {
        self.search_input.pop();
        self.debouncer.push(self.search_input.clone());
      }
      KeyCode::Char(c) => {
        self.search_input.push(c);
        self.debouncer.push(self.search_input.clone());
      }
      _ => {}
    }
    true
  }

  fn handle_picker_key(&mut self, key: KeyEvent) -> bool {
    let len = self.picker_items().len();
    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => self.mode = Mode::Normal,
      KeyCode::Down | KeyCode::Char('j') => {
        if self.picker_cursor + 1 < len {
          self.picker_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.picker_cursor = self.picker_cursor.saturating_sub(1);
      }
      KeyCode::Enter => {
        if let Some(item) = self.picker_items().get(self.picker_cursor).cloned() {
          match self.mode {
            Mode::TagPicker => self.view.toggle_tag(&item),
            Mode::LanguagePicker => self.view.toggle_language(&item),
            Mode::Normal | Mode::Search | Mode::EmergencyNumbers => {}
          }
          self.list_cursor = 0;
        }
        self.mode = Mode::Normal;
      }
      _ => {}
    }
    true
  }

  fn open_picker(&mut self, mode: Mode) {
    self.mode = mode;
    let (items, current) = match mode {
      Mode::TagPicker => (&self.tags, self.view.query().tag.as_deref()),
      _ => (&self.languages, self.view.query().language.as_deref()),
    };
    if items.is_empty() {
      self.mode = Mode::Normal;
      self.status_msg = "Nothing to choose from.".into();
      return;
    }
    self.picker_cursor = current
      .and_then(|cur| items.iter().position(|i| i == cur))
      .unwrap_or(0);
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Char(c @ '1'..='7') => {
        let index = c as usize - '1' as usize;
        if let Some(view) = View::iter().nth(index) {
          self.view.set_view(view);
          self.list_cursor = 0;
          match view {
            View::Tags => self.open_picker(Mode::TagPicker),
            View::Languages => self.open_picker(Mode::LanguagePicker),
            _ => {}
          }
        }
      }

      KeyCode::Char('/') => self.mode = Mode::Search,
      KeyCode::Esc if !self.search_input.is_empty() => {
        self.search_input.clear();
        self.debouncer.flush(String::new());
      }

      KeyCode::Char('s') => {
        self.view.set_sort(self.view.query().sort_by.next());
        self.list_cursor = 0;
      }
      KeyCode::Char('t') => self.open_picker(Mode::TagPicker),
      KeyCode::Char('L') => self.open_picker(Mode::LanguagePicker),
      KeyCode::Char('c') => {
        self.view.set_tag(None);
        self.view.set_language(None);
      }

      // Paging
      KeyCode::Left | KeyCode::Char('h') => self.change_page(ViewState::prev_page),
      KeyCode::Right | KeyCode::Char('l') => self.change_page(ViewState::next_page),
      KeyCode::Char('g') => self.change_page(ViewState::first_page),
      KeyCode::Char('G') => self.change_page(ViewState::last_page),

      // Cursor
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.page_rows.len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Enter => {
        if let Some(&index) = self.page_rows.get(self.list_cursor) {
          self.selected = Some(index);
          self.screen = Screen::ContactDetail;
        }
      }
      KeyCode::Char('f') => self.toggle_favorite(self.page_rows.get(self.list_cursor).copied()),
      KeyCode::Char('r') => self.load().await,
      KeyCode::Char('e') => self.mode = Mode::EmergencyNumbers,

      _ => {}
    }
    Ok(true)
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') | KeyCode::Backspace => {
        self.screen = Screen::ContactList;
        self.selected = None;
      }

      // Step through the page without leaving the detail pane.
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.page_rows.len() {
          self.list_cursor += 1;
          self.selected = self.page_rows.get(self.list_cursor).copied();
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
        self.selected = self.page_rows.get(self.list_cursor).copied();
      }

      KeyCode::Char('f') => self.toggle_favorite(self.selected),
      KeyCode::Char('e') => self.mode = Mode::EmergencyNumbers,

      _ => {}
    }
    true
  }

  fn change_page(&mut self, step: fn(&mut ViewState)) {
    let before = self.view.query().page;
    step(&mut self.view);
    if self.view.query().page != before {
      self.list_cursor = 0;
    }
  }

  /// Flip the favorite flag of the contact at snapshot `index` and persist.
  fn toggle_favorite(&mut self, index: Option<usize>) {
    let Some(contact) = index.and_then(|i| self.contact_at(i)) else {
      return;
    };
    if contact.id.is_empty() {
      self.status_msg = "This contact cannot be favorited.".into();
      return;
    }
    let (id, name) = (contact.id.clone(), contact.display_name().to_owned());

    let now = self.favorites.toggle(&id);
    self.status_msg = match self.store.save_favorites(&self.favorites) {
      Ok(()) if now => format!("Added {name} to favorites"),
      Ok(()) => format!("Removed {name} from favorites"),
      Err(e) => format!("Error: {e:#}"),
    };
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
