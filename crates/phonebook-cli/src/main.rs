//! `phonebook` — terminal client for the staff directory.
//!
//! # Usage
//!
//! ```
//! phonebook                                  # browse the directory
//! phonebook --url https://directory.example
//! phonebook login --username admin
//! phonebook admin list --search sales --sort department
//! phonebook admin set 64f1c0 ert on
//! ```

mod admin;
mod app;
mod client;
mod config;
mod debounce;
mod local;
mod ui;

use std::{fs::OpenOptions, io, path::PathBuf, sync::Arc, time::Duration};

use admin::AdminCommand;
use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use local::LocalStore;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "phonebook", version, about = "Terminal client for the staff directory")]
struct Args {
  /// Path to a config file (url, data_dir).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the backend (default: http://localhost:8000).
  #[arg(long, env = "PHONEBOOK_URL")]
  url: Option<String>,

  /// Directory for favorites and the login session.
  #[arg(long, env = "PHONEBOOK_DATA_DIR")]
  data_dir: Option<PathBuf>,

  /// Write logs to this file while the browser is open.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Open the interactive directory (the default).
  Browse,
  /// Obtain an admin token and remember it.
  Login {
    #[arg(short, long)]
    username: String,
    /// Prompted for on stdin when omitted.
    #[arg(short, long, env = "PHONEBOOK_PASSWORD")]
    password: Option<String>,
  },
  Logout,
  /// Show who the stored session belongs to.
  Whoami,
  /// Manage directory records (requires login).
  #[command(subcommand)]
  Admin(AdminCommand),
}

// ─── Logging ──────────────────────────────────────────────────────────────────

fn env_filter() -> EnvFilter {
  EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy()
}

/// The browser owns the terminal, so it only logs when given a file.
fn init_tracing(browsing: bool, log_file: Option<&PathBuf>) -> Result<()> {
  match (browsing, log_file) {
    (_, Some(path)) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    }
    (false, None) => {
      tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
    }
    (true, None) => {}
  }
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let command = args.command.unwrap_or(Command::Browse);
  init_tracing(matches!(command, Command::Browse), args.log_file.as_ref())?;

  let settings = config::Settings::load(args.config.as_deref())?
    .with_overrides(args.url, args.data_dir);
  let store = LocalStore::open(settings.data_dir())?;
  tracing::debug!(url = %settings.url, data_dir = %store.dir().display(), "settings loaded");
  let session = store.load_session();

  let client = ApiClient::new(ApiConfig {
    base_url: settings.url.clone(),
    token:    session.map(|s| s.token),
  })?;

  let mut stdout = io::stdout();
  match command {
    Command::Browse => browse(client, store).await,
    Command::Login { username, password } => {
      admin::login(&client, &store, username, password, &mut stdout).await
    }
    Command::Logout => admin::logout(&store, &mut stdout),
    Command::Whoami => admin::whoami(&client, &store, &mut stdout).await,
    Command::Admin(cmd) => admin::run(cmd, &client, &store, &mut stdout).await,
  }
}

async fn browse(client: ApiClient, store: LocalStore) -> Result<()> {
  let mut app = App::new(client, store);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.load().await;
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.poll_search();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
