mod state;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pans_core::{config, CommandTool, PanController, PansConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::{self, OpenOptions},
    io,
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pans-tui")]
#[command(about = "Interactive per-process stereo pan control", long_about = None)]
struct Args {
    /// Filter applied on startup
    pattern: Option<String>,
    /// Path to the pan tool (overrides config)
    #[arg(long)]
    tool: Option<PathBuf>,
    /// Upper bound of the pan range (overrides config)
    #[arg(long)]
    pan_limit: Option<f64>,
    /// Config file (defaults to $XDG_CONFIG_HOME/pans/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let config = PansConfig::load(&config_path)
        .and_then(|config| config.with_overrides(args.tool.clone(), args.pan_limit))
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    info!(tool = %config.tool.display(), pan_limit = config.pan_limit, "starting");

    let controller = PanController::new(CommandTool::new(&config.tool), config.pan_limit);
    let mut app = state::App::new(controller, config.pan_step);
    if let Some(pattern) = args.pattern {
        app.apply_filter(pattern);
    }

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    if let Err(err) = result {
        eprintln!("pans-tui: {err}");
    }

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut state::App<CommandTool>,
) -> Result<()> {
    let input_poll = Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Every gesture blocks on the pan tool; nothing runs in the background.
        if event::poll(input_poll)? {
            match event::read()? {
                Event::Key(key) => {
                    if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                        app.handle_key(key);
                    }
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                }
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// The alternate screen owns stdout, so logs go to a file under the state
/// directory, or nowhere when that cannot be opened.
fn init_logging(debug: bool) {
    let level = if debug {
        "debug".to_string()
    } else if let Ok(level) = std::env::var("PANS_LOG_LEVEL") {
        level
    } else {
        "info".to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);
    let result = match open_log_file() {
        Ok(file) => tracing::subscriber::set_global_default(
            builder.with_writer(Mutex::new(file)).finish(),
        ),
        Err(_) => tracing::subscriber::set_global_default(builder.with_writer(io::sink).finish()),
    };
    if result.is_err() {
        eprintln!("pans-tui: logging already initialised");
    }
}

fn open_log_file() -> io::Result<fs::File> {
    let dir = config::state_dir().join("pans");
    fs::create_dir_all(&dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("pans-tui.log"))
}
