mod app;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod nav;
mod opener;
#[cfg(test)]
mod test_support;
mod theme;
mod tui;
mod ui;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ConfigBuilder, WriteLogger};

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, LogConfig, OpenerConfig};
use crate::event::{Event, EventHandler};
use crate::fs::listing::ListingLoader;
use crate::nav::action::Action;
use crate::nav::history::History;
use crate::nav::state::NavigationState;
use crate::opener::Opener;
use crate::tui::{install_panic_hook, TerminalLease, Tui};

/// A three-column terminal directory browser.
#[derive(Parser, Debug)]
#[command(name = "mill", version, about)]
struct Cli {
    /// Directory or file to start in (defaults to the config value, then ".")
    path: Option<PathBuf>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Command used to open text files
    #[arg(long)]
    editor: Option<String>,

    /// Command used to open binary files
    #[arg(long)]
    viewer: Option<String>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Disable mouse support
    #[arg(long)]
    no_mouse: bool,
}

impl Cli {
    /// Flags expressed as a partial config that overrides every file.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: None,
                mouse: self.no_mouse.then_some(false),
            },
            opener: OpenerConfig {
                editor: self.editor.clone(),
                viewer: self.viewer.clone(),
            },
            log: LogConfig {
                level: self.log_level.clone(),
                file: self
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
            },
            ..Default::default()
        }
    }
}

/// Create `path` and any missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    File::create(path)
}

/// Send log records to a file; the terminal belongs to the UI. Failing to
/// open the file leaves logging disabled with a warning on stderr, printed
/// before the TUI takes over the screen.
fn init_logging(config: &AppConfig) {
    let level = config.log_level();
    if level == LevelFilter::Off {
        return;
    }
    let Some(path) = config.log_file() else {
        return;
    };

    let log_file = match open_log_file(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!(
                "Warning: cannot open log file {}: {}; logging disabled",
                path.display(),
                e
            );
            return;
        }
    };
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Err(e) = WriteLogger::init(level, log_config, log_file) {
        eprintln!("Warning: failed to start logging: {}", e);
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    init_logging(&config);

    let start = cli
        .path
        .clone()
        .or_else(|| config.general.default_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let path = start.canonicalize().map_err(|_| {
        error::AppError::InvalidPath(format!("{} does not exist", start.display()))
    })?;
    info!("mill starting in {}", path.display());

    let theme = theme::resolve_theme(&config.theme);
    let opener = Opener::from_config(&config);
    let loader = ListingLoader::new(config.max_preview_bytes(), config.sniff_bytes());
    let nav = NavigationState::new(History::with_capacity(config.history_capacity()));

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(16));
    let mut app = App::new(nav, loader, events.sender());
    app.dispatch(Action::Init(path));

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&app, &theme, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
            Event::Navigation(action) => app.dispatch(action),
        }

        if let Some(request) = app.take_pending_open() {
            let mut lease = TerminalLease {
                tui: &mut tui,
                events: &events,
            };
            if let Err(e) = opener.open(&request, &mut lease).await {
                app.set_status_message(e.to_string());
            }
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    info!("mill exiting");
    Ok(())
}
