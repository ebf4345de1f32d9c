//! Treemap Viewer
//!
//! CLI commands:
//! - gui: Interactive native viewer (default)
//! - render: Write a dataset's treemap as a standalone HTML page
//! - serve: Start HTTP server
//! - list: List the dataset registry

mod color;
mod config;
mod gui;
mod hierarchy;
mod layout;
mod legend;
mod loader;
mod logging;
mod page;
mod render;
mod server;
mod state;
mod tooltip;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "treemap_viewer")]
#[command(about = "Interactive treemaps of top-100 datasets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to datasets.yaml config
    #[arg(short, long, default_value = "datasets.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch native GUI viewer
    Gui,

    /// Render a dataset to an HTML page
    Render {
        /// Dataset key (defaults to the configured default)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Read the hierarchy from a local JSON file instead of fetching
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "treemap.html")]
        output: PathBuf,

        /// Prefix for navbar links. The default only resolves when the page
        /// is served by `serve`
        #[arg(long, default_value = page::SERVED_LINK_BASE)]
        link_base: String,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (defaults to PORT from .env, then 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List available datasets
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = config::Env::load();

    // Initialize logging first
    logging::init_logging(&env.log_dir)?;
    tracing::info!("Treemap Viewer starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    // Load config
    let config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        config::Config::load(&cli.config)?
    } else {
        tracing::info!("Config file not found: {:?}, using built-in datasets", cli.config);
        config::Config::default()
    };
    tracing::info!("Config loaded: {} datasets, default '{}'",
        config.datasets.len(), config.default_dataset);

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => {
            tracing::info!("Launching native GUI viewer");
            gui::run_viewer(config, tokio::runtime::Handle::current())?;
        }

        Commands::Render { dataset, input, output, link_base } => {
            render_to_file(config, dataset, input, &output, &link_base).await?;
        }

        Commands::Serve { port } => {
            server::serve(config, port.unwrap_or(env.port)).await?;
        }

        Commands::List => {
            list_datasets(&config);
        }
    }

    Ok(())
}

/// Load one dataset and write its page
async fn render_to_file(
    config: config::Config,
    dataset: Option<String>,
    input: Option<PathBuf>,
    output: &PathBuf,
    link_base: &str,
) -> anyhow::Result<()> {
    let mut app = state::AppState::new(config);
    if let Some(key) = dataset {
        if app.dispatch(state::Action::Select(key.clone())) == state::Effect::None {
            anyhow::bail!("Unknown dataset '{}'. Known: {}", key, app.config.keys().join(", "));
        }
    }

    let key = app.selection().to_string();
    let result = match &input {
        Some(path) => loader::load_file(path),
        None => loader::load(&app.config, &key).await,
    };
    let root = result.with_context(|| format!("Failed to load '{}'", key))?;
    app.dispatch(state::Action::Loaded { key: key.clone(), result: Ok(root) });

    let mut scene = render::Scene::new();
    let tiles = app
        .render(&mut scene, &render::CharWidthEstimate::default())
        .unwrap_or(0);
    let html = page::render_page(&app, &scene, link_base);
    std::fs::write(output, html)?;

    println!("Rendered '{}' ({} tiles, {} categories) -> {:?}",
        key, tiles, scene.legend.len(), output);
    Ok(())
}

/// List the dataset registry
fn list_datasets(config: &config::Config) {
    println!("Available datasets ({}):", config.datasets.len());
    println!();
    for dataset in &config.datasets {
        let marker = if dataset.key == config.default_dataset { " (default)" } else { "" };
        println!("  - {}{}", dataset.key, marker);
        println!("    {}", state::title(&dataset.key));
        println!("    {}", dataset.url);
    }
}
