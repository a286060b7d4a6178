//! Customer cluster map renderer.
//!
//! Loads a customer CSV export and state boundaries (local files or URLs),
//! renders the first frame, then replays an optional interaction script of
//! zoom/pan/control events, writing one SVG (and optionally PNG) per frame.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use renderer::controller::{MapController, MapState};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use cluster_map::config::{MapConfig, Overrides};
use cluster_map::loader::{Loader, Source};
use cluster_map::replay::{emit, load_script, replay, FrameWriter};

#[derive(Parser, Debug)]
#[command(name = "cluster-map")]
#[command(about = "Render aggregated customer clusters over a US state map")]
struct Args {
    /// Customer CSV (path or http(s) URL)
    #[arg(long, env = "CLUSTER_MAP_DATA", default_value = "data.csv")]
    data: String,

    /// State boundaries as GeoJSON or TopoJSON (path or http(s) URL)
    #[arg(long, env = "CLUSTER_MAP_STATES", default_value = "us-states.json")]
    states: String,

    /// Map configuration YAML (width, initial controls, ranges, style)
    #[arg(long, env = "CLUSTER_MAP_CONFIG")]
    config: Option<PathBuf>,

    /// Interaction script YAML to replay after the first frame
    #[arg(long)]
    events: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Initial grid cell size in pixels
    #[arg(long)]
    cell_size: Option<f64>,

    /// Initial bubble size multiplier
    #[arg(long)]
    scale_multiplier: Option<f64>,

    /// Initial minimum cluster sum
    #[arg(long)]
    min_sum: Option<f64>,

    /// Directory for rendered frames
    #[arg(long, default_value = "frames")]
    out_dir: PathBuf,

    /// Also rasterize every frame to PNG
    #[arg(long)]
    png: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    let config = MapConfig::load_or_default(args.config.as_deref())?.with_overrides(Overrides {
        width: args.width,
        cell_size: args.cell_size,
        scale_multiplier: args.scale_multiplier,
        min_sum: args.min_sum,
    });
    let events = match &args.events {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    info!(
        data = %args.data,
        states = %args.states,
        width = config.width,
        events = events.len(),
        "Starting cluster map"
    );

    let state = MapState::new(config.viewport(), config.control_surface());
    let mut controller = MapController::with_albers_usa(state);

    let loader = Loader::new()?;
    let data = match loader
        .load(&Source::parse(&args.data), &Source::parse(&args.states))
        .await
    {
        Ok(data) => data,
        Err(e) => {
            // No partial map: nothing is rendered when either input fails.
            error!(error = %format!("{:#}", e), "Failed to load map data");
            return Err(e);
        }
    };

    let writer = FrameWriter::new(&args.out_dir, args.png, config.style.clone())?;
    if let Some(report) = controller.load(data.records, data.basemap) {
        emit(&writer, &controller, &report)?;
    }

    let reports = replay(&mut controller, &events, &writer)?;

    let marks = controller.marks();
    info!(
        frames = reports.len() + 1,
        clusters = marks.len(),
        out_dir = %args.out_dir.display(),
        "Done"
    );

    Ok(())
}
