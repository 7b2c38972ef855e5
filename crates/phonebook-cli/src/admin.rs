//! Non-interactive subcommands: session management and contact
//! administration.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use phonebook_core::{
  Error as CoreError,
  admin::{self, AdminColumn, AdminQuery, SortDirection},
  contact::{ContactDraft, ContactField, ContactFlag, split_list},
  view::ContactPage,
};
use tracing::info;

use crate::{
  client::{ADMIN_LIMIT, ApiClient, ClientError},
  local::{LocalStore, Session},
};

// ─── Arguments ────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
  /// Print one page of the admin table (includes hidden and third-party records).
  List {
    #[arg(short, long, default_value = "")]
    search: String,
    /// name, designation, department, extension or ert.
    #[arg(long, default_value_t = AdminColumn::Name)]
    sort:   AdminColumn,
    #[arg(long)]
    desc:   bool,
    #[arg(long, default_value_t = 1)]
    page:   usize,
  },
  /// Create a contact.
  Add(DraftArgs),
  /// Change fields of an existing contact; unspecified fields are kept.
  Edit {
    id:     String,
    #[command(flatten)]
    fields: DraftArgs,
  },
  Delete {
    id:  String,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
  },
  /// Toggle a classification flag.
  Set {
    id:    String,
    /// ert, ifa, expose or third-party.
    flag:  ContactFlag,
    state: Switch,
  },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
  On,
  Off,
}

/// One flag per draft field. Lists are comma separated.
#[derive(Args, Debug, Default)]
pub struct DraftArgs {
  #[arg(long)]
  pub name:        Option<String>,
  #[arg(long)]
  pub designation: Option<String>,
  #[arg(long)]
  pub department:  Option<String>,
  #[arg(long)]
  pub company:     Option<String>,
  #[arg(long)]
  pub extension:   Option<String>,
  #[arg(long)]
  pub email:       Option<String>,
  #[arg(long)]
  pub mobile:      Option<String>,
  #[arg(long)]
  pub landline:    Option<String>,
  #[arg(long)]
  pub website:     Option<String>,
  #[arg(long)]
  pub comments:    Option<String>,
  #[arg(long)]
  pub languages:   Option<String>,
  #[arg(long)]
  pub tags:        Option<String>,
  #[arg(long)]
  pub picture:     Option<String>,
  #[arg(long)]
  pub expose:      Option<bool>,
  #[arg(long)]
  pub ert:         Option<bool>,
  #[arg(long)]
  pub ifa:         Option<bool>,
  #[arg(long)]
  pub third_party: Option<bool>,
}

impl DraftArgs {
  fn apply(self, draft: &mut ContactDraft) {
    let texts = [
      (ContactField::Name, self.name),
      (ContactField::Designation, self.designation),
      (ContactField::Department, self.department),
      (ContactField::Company, self.company),
      (ContactField::Extension, self.extension),
      (ContactField::Email, self.email),
      (ContactField::Mobile, self.mobile),
      (ContactField::Landline, self.landline),
      (ContactField::Website, self.website),
      (ContactField::Comments, self.comments),
    ];
    for (field, value) in texts {
      if let Some(value) = value {
        *draft.text_mut(field) = value;
      }
    }
    if let Some(raw) = self.languages {
      draft.languages = split_list(&raw);
    }
    if let Some(raw) = self.tags {
      draft.tags = split_list(&raw);
    }
    if let Some(picture) = self.picture {
      draft.profile_picture = picture;
    }
    let flags = [
      (ContactFlag::Expose, self.expose),
      (ContactFlag::Ert, self.ert),
      (ContactFlag::Ifa, self.ifa),
      (ContactFlag::ThirdParty, self.third_party),
    ];
    for (flag, value) in flags {
      if let Some(value) = value {
        draft.set_flag(flag, value);
      }
    }
  }
}

// ─── Session commands ─────────────────────────────────────────────────────────

pub async fn login(
  client: &ApiClient,
  store: &LocalStore,
  username: String,
  password: Option<String>,
  out: &mut impl Write,
) -> Result<()> {
  let password = match password {
    Some(p) => p,
    None => prompt("Password: ")?,
  };
  let token = client.login(&username, &password).await?;
  store.save_session(&Session { token, username: username.clone() })?;
  info!(%username, "logged in");
  writeln!(out, "Logged in as {username}")?;
  Ok(())
}

pub fn logout(store: &LocalStore, out: &mut impl Write) -> Result<()> {
  store.clear_session()?;
  writeln!(out, "Logged out")?;
  Ok(())
}

pub async fn whoami(client: &ApiClient, store: &LocalStore, out: &mut impl Write) -> Result<()> {
  let Some(session) = store.load_session() else {
    writeln!(out, "Not logged in")?;
    return Ok(());
  };
  let me = expire_on_401(client.me().await, store)?;
  let username = me
    .get("username")
    .and_then(|v| v.as_str())
    .unwrap_or(&session.username);
  writeln!(out, "{username} @ {}", client.base_url())?;
  Ok(())
}

// ─── Admin commands ───────────────────────────────────────────────────────────

pub async fn run(
  command: AdminCommand,
  client: &ApiClient,
  store: &LocalStore,
  out: &mut impl Write,
) -> Result<()> {
  if !client.has_token() {
    bail!("not logged in; run `phonebook login` first");
  }

  match command {
    AdminCommand::List { search, sort, desc, page } => {
      let snapshot = expire_on_401(client.list_contacts(ADMIN_LIMIT, true).await, store)?;
      let query = AdminQuery {
        search,
        column: sort,
        direction: if desc { SortDirection::Desc } else { SortDirection::Asc },
        page,
        ..AdminQuery::default()
      };
      let page = admin::compute(snapshot.contacts(), &query);
      write!(out, "{}", render_table(&page))?;
    }

    AdminCommand::Add(fields) => {
      let mut draft = ContactDraft::default();
      fields.apply(&mut draft);
      let draft = validated(draft)?;
      let created = expire_on_401(client.create_contact(&draft).await, store)?;
      let id = created.map(|c| c.id).unwrap_or_default();
      info!(%id, name = %draft.name, "created contact");
      writeln!(out, "Created {} {id}", draft.name)?;
    }

    AdminCommand::Edit { id, fields } => {
      let current = expire_on_401(client.get_contact(&id).await, store)?;
      let mut draft = ContactDraft::from_contact(&current);
      fields.apply(&mut draft);
      let draft = validated(draft)?;
      expire_on_401(client.update_contact(&id, &draft).await, store)?;
      info!(%id, "updated contact");
      writeln!(out, "Updated {} {id}", draft.name)?;
    }

    AdminCommand::Delete { id, yes } => {
      if !yes {
        let answer = prompt(&format!("Delete contact {id}? [y/N] "))?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
          writeln!(out, "Aborted")?;
          return Ok(());
        }
      }
      expire_on_401(client.delete_contact(&id).await, store)?;
      info!(%id, "deleted contact");
      writeln!(out, "Deleted {id}")?;
    }

    AdminCommand::Set { id, flag, state } => {
      let value = state == Switch::On;
      expire_on_401(client.set_flag(&id, flag, value).await, store)?;
      info!(%id, %flag, value, "set contact flag");
      writeln!(out, "{flag} {} for {id}", if value { "on" } else { "off" })?;
    }
  }
  Ok(())
}

/// Normalise and validate, reporting every field error at once.
fn validated(draft: ContactDraft) -> Result<ContactDraft> {
  match draft.into_valid() {
    Ok(draft) => Ok(draft),
    Err(CoreError::Validation(errors)) => {
      let lines: Vec<String> = errors.0.iter().map(|e| format!("  {e}")).collect();
      bail!("contact not saved:\n{}", lines.join("\n"))
    }
    Err(e) => Err(e.into()),
  }
}

/// A 401 means the stored token is no longer accepted.
fn expire_on_401<T>(result: Result<T>, store: &LocalStore) -> Result<T> {
  match result {
    Err(e) if ClientError::is_unauthorized(&e) => {
      store.clear_session()?;
      Err(e.context("session expired; run `phonebook login` again"))
    }
    other => other,
  }
}

fn prompt(label: &str) -> Result<String> {
  print!("{label}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line).context("reading stdin")?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn render_table(page: &ContactPage<'_>) -> String {
  let mut table = format!(
    "{:<24} {:<26} {:<20} {:<18} {:>6}  {}\n",
    "ID", "NAME", "DESIGNATION", "DEPARTMENT", "EXT", "FLAGS"
  );
  for c in &page.contacts {
    let flags: Vec<&str> = [
      (c.is_ert, "ert"),
      (c.is_ifa, "ifa"),
      (c.is_third_party, "third-party"),
      (!c.expose, "hidden"),
    ]
    .into_iter()
    .filter_map(|(on, label)| on.then_some(label))
    .collect();
    table.push_str(&format!(
      "{:<24} {:<26} {:<20} {:<18} {:>6}  {}\n",
      c.id,
      c.display_name(),
      c.designation.as_deref().unwrap_or(""),
      c.department.as_deref().unwrap_or(""),
      c.extension.as_deref().unwrap_or(""),
      flags.join(",")
    ));
  }
  table.push_str(&format!(
    "page {} of {} ({} results)\n",
    page.page, page.total_pages, page.total_results
  ));
  table
}
