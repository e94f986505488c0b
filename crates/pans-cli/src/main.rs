use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use pans_core::{
    config, CommandTool, PanController, PanTool, PansConfig, ProcessId, ProcessRecord,
    ToolRequest,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pans")]
#[command(about = "Per-process stereo pan control", long_about = None)]
struct Cli {
    /// Path to the pan tool (overrides config)
    #[arg(long, global = true)]
    tool: Option<PathBuf>,
    /// Upper bound of the pan range (overrides config)
    #[arg(long, global = true)]
    pan_limit: Option<f64>,
    /// Config file (defaults to $XDG_CONFIG_HOME/pans/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List pannable processes matching a pattern
    List {
        pattern: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the tool's raw output for one process
    Get { pattern: String, id: ProcessId },
    /// Pan one process (clamped to the configured range)
    Set {
        pattern: String,
        id: ProcessId,
        #[arg(allow_hyphen_values = true)]
        value: f64,
    },
    /// Centre one process
    Reset { pattern: String, id: ProcessId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let config = PansConfig::load(&config_path)
        .and_then(|config| config.with_overrides(cli.tool.clone(), cli.pan_limit))
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let mut controller = PanController::new(CommandTool::new(&config.tool), config.pan_limit);

    match cli.command {
        Commands::List { pattern, json } => {
            controller.apply_filter(&pattern)?;
            let records: Vec<ProcessRecord> = controller
                .registry()
                .iter()
                .map(|process| ProcessRecord {
                    id: process.id,
                    name: process.name.clone(),
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No pannable processes match '{pattern}'");
            } else {
                for record in &records {
                    println!("#{}: {}", record.id, record.name);
                }
            }
        }
        Commands::Get { pattern, id } => {
            let output = controller
                .tool_mut()
                .invoke(&ToolRequest::get(pattern, id))?;
            print!("{output}");
        }
        Commands::Set { pattern, id, value } => {
            let index = locate(&mut controller, &pattern, id)?;
            let applied = controller.set_pan(index, value)?;
            println!("#{id}: {applied:.1}");
        }
        Commands::Reset { pattern, id } => {
            let index = locate(&mut controller, &pattern, id)?;
            controller.reset_pan(index)?;
            println!("#{id}: 0.0");
        }
    }

    Ok(())
}

fn locate<T: PanTool>(
    controller: &mut PanController<T>,
    pattern: &str,
    id: ProcessId,
) -> Result<usize> {
    controller.apply_filter(pattern)?;
    controller
        .registry()
        .position_of(id)
        .ok_or_else(|| anyhow!("process #{id} does not match '{pattern}'"))
}

fn init_logging(debug: bool) {
    let level = if debug {
        "debug".to_string()
    } else if let Ok(level) = std::env::var("PANS_LOG_LEVEL") {
        level
    } else {
        "warn".to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("pans: logging already initialised");
    }
}
