//! # Autofulfill Console
//!
//! Runs the autofulfill system against an in-memory colony world and reads
//! operator commands from stdin, one per line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use autofulfill_core::clock::SystemClock;
use autofulfill_core::commands::CommandSurface;
use autofulfill_core::config::ConfigManager;
use autofulfill_core::gateway::{InMemoryColonyGateway, WorldSnapshot};
use autofulfill_core::logging::init_structured_logging;
use autofulfill_core::notification::{ConsoleSink, Observers};
use autofulfill_core::orchestration::AutofulfillSystem;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "autofulfill")]
#[command(about = "Automatically fulfil colony resource requests")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Config file, generated with defaults if it does not exist
    #[arg(short, long, default_value = "config/autofulfill.toml")]
    config: PathBuf,

    /// JSON world snapshot to load (default: built-in demo world)
    #[arg(short, long)]
    world: Option<PathBuf>,

    /// Number of readiness probes that report "still loading" before ready
    #[arg(long, default_value_t = 0)]
    not_ready_probes: u32,
}

fn load_world(path: Option<&PathBuf>) -> anyhow::Result<WorldSnapshot> {
    let Some(path) = path else {
        return Ok(WorldSnapshot::demo());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading world file {}", path.display()))?;
    WorldSnapshot::from_json_str(&json)
        .with_context(|| format!("parsing world file {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_structured_logging();

    let config_manager = ConfigManager::load_from_file(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let world = load_world(cli.world.as_ref())?;

    let gateway =
        Arc::new(InMemoryColonyGateway::new(world).with_not_ready_probes(cli.not_ready_probes));
    let observers = Arc::new(Observers::new());
    observers.register(Arc::new(ConsoleSink));

    let mut system = AutofulfillSystem::start(
        config_manager.config(),
        gateway,
        observers,
        Arc::new(SystemClock),
    );
    let commands = CommandSurface::new(system.main_loop().clone());

    info!("Autofulfill console ready, type 'quit' to exit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "Failed to read from stdin");
                        break;
                    }
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
                    break;
                }

                let response = commands.execute_line(trimmed).await;
                for line in response.lines {
                    println!("{line}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C");
                break;
            }
        }
    }

    system.shutdown().await?;
    info!("Autofulfill stopped");
    Ok(())
}
