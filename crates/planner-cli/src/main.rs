//! `planner`, a terminal dashboard for event planning.
//!
//! # Usage
//!
//! ```
//! planner --supabase-url https://xyz.supabase.co --anon-key eyJ...
//! planner --config ~/.config/planner/config.toml --log-file /tmp/planner.log
//! ```
//!
//! Every setting can also come from a `PLANNER_*` environment variable, e.g.
//! `PLANNER_BACKEND_URL` or `PLANNER_LANGUAGES=en,hu,de`.

mod app;
mod client;
mod ui;


use std::{
  fs::{self, OpenOptions},
  io,
  path::{Path, PathBuf},
  process::Command,
  sync::Mutex,
  time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use app::{App, AppConfig, Flow};
use clap::Parser;
use client::{BackendClient, BackendConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use planner_core::session::SessionManager;
use planner_supabase::{FileSessionCache, SupabaseClient, SupabaseConfig};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_CONFIG: &str = "~/.config/planner/config.toml";
const DEFAULT_SESSION_FILE: &str = "~/.config/planner/session.json";

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "planner", version, about = "Terminal dashboard for event planning")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Supabase project URL.
  #[arg(long)]
  supabase_url: Option<String>,

  /// Supabase anon (public) API key.
  #[arg(long)]
  anon_key: Option<String>,

  /// Base URL of the workflow backend. Actions are disabled without it.
  #[arg(long)]
  backend_url: Option<String>,

  /// Where the signed-in session is cached.
  #[arg(long, value_name = "FILE")]
  session_file: Option<PathBuf>,

  /// Append logs to this file. Logging is off without it.
  #[arg(long, env = "PLANNER_LOG_FILE", value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Merged configuration: flags over `PLANNER_*` env over file over defaults.
#[derive(Debug, Deserialize)]
struct Settings {
  supabase_url:      String,
  supabase_anon_key: String,
  #[serde(default)]
  backend_url:       Option<String>,
  session_file:      PathBuf,
  /// Where the sign-in email links back to.
  #[serde(default)]
  redirect_to:       Option<String>,
  languages:         Vec<String>,
}

fn load_settings(args: &Args) -> Result<Settings> {
  let file = expand_tilde(args.config.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG)));

  let settings = config::Config::builder()
    .set_default("session_file", DEFAULT_SESSION_FILE)?
    .set_default("languages", vec!["en", "hu"])?
    .add_source(config::File::from(file).required(false))
    .add_source(
      config::Environment::with_prefix("PLANNER")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("languages"),
    )
    .set_override_option("supabase_url", args.supabase_url.clone())?
    .set_override_option("supabase_anon_key", args.anon_key.clone())?
    .set_override_option("backend_url", args.backend_url.clone())?
    .set_override_option(
      "session_file",
      args
        .session_file
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned()),
    )?
    .build()
    .context("failed to read configuration")?;

  let mut settings: Settings = settings
    .try_deserialize()
    .context("failed to deserialise configuration (supabase_url and supabase_anon_key are required)")?;
  settings.session_file = expand_tilde(&settings.session_file);
  settings.backend_url = settings.backend_url.filter(|url| !url.trim().is_empty());
  Ok(settings)
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

/// Send tracing output to `path`. The terminal belongs to the UI, so
/// without a file nothing is logged.
fn init_logging(path: Option<&Path>) -> Result<()> {
  let Some(path) = path else {
    return Ok(());
  };
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  init_logging(args.log_file.as_deref())?;
  let settings = load_settings(&args)?;

  let supabase = SupabaseClient::new(SupabaseConfig {
    url:      settings.supabase_url,
    anon_key: settings.supabase_anon_key,
  })?;
  let backend = settings
    .backend_url
    .map(|base_url| BackendClient::new(BackendConfig { base_url }))
    .transpose()?;
  let cache = FileSessionCache::new(settings.session_file);
  tracing::info!(cache = %cache.path().display(), "starting");

  let sessions = SessionManager::new(supabase.clone(), cache);
  let mut app = App::new(sessions, supabase, backend, AppConfig {
    redirect_to: settings.redirect_to,
    languages:   settings.languages,
  });
  app.restore().await;

  let mut terminal = enter_terminal()?;
  let run_result = run_event_loop(&mut terminal, &mut app).await;
  leave_terminal(&mut terminal);

  run_result
}

fn enter_terminal() -> Result<Tui> {
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")
}

/// Restore the terminal. Best effort; errors are ignored.
fn leave_terminal(terminal: &mut Tui) {
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
  loop {
    app.tick(Instant::now());
    app.sync_auth().await;
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(100))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    let Some(Event::Key(key)) = maybe_event else {
      continue;
    };
    match app.handle_key(key).await {
      Flow::Continue => {}
      Flow::Quit => break,
      Flow::EditInputs => {
        let original = app.inputs_text().unwrap_or_default().to_string();
        leave_terminal(terminal);
        let edited = tokio::task::block_in_place(|| edit_in_editor(&original));
        enable_raw_mode().context("enabling raw mode")?;
        execute!(terminal.backend_mut(), EnterAlternateScreen)
          .context("entering alternate screen")?;
        terminal.clear().context("clearing terminal")?;
        match edited {
          Ok(text) => app.set_inputs_text(text),
          Err(e) => app.show_alert(format!("Editor failed: {e:#}")),
        }
      }
    }
  }

  Ok(())
}

// ─── External editor ──────────────────────────────────────────────────────────

/// Open `text` in `$VISUAL`, `$EDITOR` or `vi` and return what was saved.
fn edit_in_editor(text: &str) -> Result<String> {
  let editor = std::env::var("VISUAL")
    .or_else(|_| std::env::var("EDITOR"))
    .unwrap_or_else(|_| "vi".to_string());
  let mut parts = editor.split_whitespace();
  let Some(program) = parts.next() else {
    bail!("no editor configured");
  };

  let path = std::env::temp_dir().join(format!("planner-inputs-{}.json", Uuid::new_v4()));
  fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;

  let status = Command::new(program).args(parts).arg(&path).status();
  let edited = fs::read_to_string(&path);
  fs::remove_file(&path).ok();

  let status = status.with_context(|| format!("running {program}"))?;
  if !status.success() {
    bail!("{program} exited with {status}");
  }
  edited.context("reading edited inputs")
}
