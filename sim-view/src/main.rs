//! Application entry point for the force-directed graph viewer.
//!
//! Loads a graph and optional parameters file, starts the simulation
//! thread, and hands drawing and interaction to [`Viewer`].

mod palette;
mod viewer;

use std::path::PathBuf;

use clap::Parser;
use sim_core::{config::Config, import};
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(name = "graph-layout")]
#[command(about = "Interactive force-directed graph layout")]
#[command(version)]
struct Args {
    /// Graph file in node-link JSON format
    graph: PathBuf,

    /// Simulation parameters file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cfg = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    let graph = import::load_graph(&args.graph, &cfg)?;

    let title = format!(
        "Graph Layout - {}",
        args.graph
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([cfg.viewport_width, cfg.viewport_height])
            .with_title(title.clone()),
        ..Default::default()
    };

    let viewer = Viewer::new(graph, cfg)?;
    info!("opening window");
    eframe::run_native(&title, options, Box::new(move |_cc| Ok(Box::new(viewer))))?;
    Ok(())
}
