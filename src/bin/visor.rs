//! Visor daemon: load assets, open a display, run the command loop.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use visor::boot::play_boot_animation;
use visor::commands::command_queue;
use visor::display::{DisplaySink, MockDisplay, TerminalDisplay};
use visor::input::{KeyInput, KeyInputOptions};
use visor::monitor::SystemMonitor;
use visor::router::CommandRouter;
use visor::{Assets, Config, ExpressionManager, GeneratorRegistry, RenderPipeline, VisorError};

const BOOT_DURATION: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(author, version, about = "LED matrix face engine", long_about = None)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "visor.toml")]
    config: PathBuf,

    /// Assets directory containing manifest.json (overrides the config).
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Display backend, `terminal` or `mock` (overrides the config).
    #[arg(short, long)]
    backend: Option<String>,

    /// List expressions and effects, then exit.
    #[arg(long)]
    list: bool,
}

fn main() -> visor::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;
    if let Some(backend) = cli.backend {
        config.display.backend = backend;
    }

    let assets_dir = cli
        .assets
        .unwrap_or_else(|| PathBuf::from(&config.expressions_dir));
    let assets = Assets::load(&assets_dir)?;

    if cli.list {
        println!("expressions:");
        for name in assets.catalogue.names() {
            println!("  {name}");
        }
        println!("effects:");
        for name in sorted_effect_names(&assets) {
            println!("  {name}");
        }
        return Ok(());
    }

    let mut monitor = SystemMonitor::new();
    let status = monitor.status();
    tracing::info!(
        cpu = status.cpu_usage,
        uptime = status.uptime,
        "host status"
    );

    let registry = Arc::new(GeneratorRegistry::with_builtins());
    let sink = create_display(&config)?;
    sink.set_brightness(config.display.brightness);

    play_boot_animation(&sink, BOOT_DURATION);

    let startup = startup_expression(&assets, &config);
    let effect_names = sorted_effect_names(&assets);

    let pipeline = Arc::new(RenderPipeline::new(sink.clone(), registry.clone()));
    let manager = Arc::new(ExpressionManager::new(
        pipeline.clone() as Arc<dyn DisplaySink>,
        registry,
        assets.catalogue,
        &config,
    ));

    if let Some(name) = &startup {
        manager.set_expression(name);
    } else {
        tracing::warn!("no expressions loaded, the face stays dark");
    }

    let (command_tx, command_rx) = command_queue();
    let (quit_tx, quit_rx) = crossbeam_channel::bounded(1);
    let input = KeyInput::spawn(
        command_tx,
        quit_tx,
        KeyInputOptions {
            expressions: manager.expression_names(),
            effects: effect_names,
            brightness: config.display.brightness,
        },
    );

    let router = CommandRouter::new(manager.clone(), pipeline.clone(), assets.effects);
    tracing::info!(
        width = config.display.width,
        height = config.display.height,
        backend = %config.display.backend,
        "visor running"
    );
    router.run(&command_rx, &quit_rx);

    input.join();
    Ok(())
}

fn create_display(config: &Config) -> visor::Result<Arc<dyn DisplaySink>> {
    let width = config.display.width;
    let height = config.display.height;
    match config.display.backend.as_str() {
        "terminal" => Ok(Arc::new(TerminalDisplay::new(width, height)?)),
        "mock" => Ok(Arc::new(MockDisplay::new(width, height))),
        other => Err(VisorError::config(format!(
            "unknown display backend '{other}'"
        ))),
    }
}

/// Pick the startup face: the configured default when it exists, then the
/// manifest's nomination, then the first name in sort order.
fn startup_expression(assets: &Assets, config: &Config) -> Option<String> {
    if assets.catalogue.contains(&config.default_expression) {
        return Some(config.default_expression.clone());
    }
    if let Some(name) = &assets.default_expression {
        if assets.catalogue.contains(name) {
            return Some(name.clone());
        }
    }
    assets.catalogue.names().into_iter().next()
}

fn sorted_effect_names(assets: &Assets) -> Vec<String> {
    let mut names: Vec<String> = assets.effects.keys().cloned().collect();
    names.sort();
    names
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
