//! Geocoding backfill tool.
//!
//! Looks up every row of a customer CSV that is missing latitude or
//! longitude and writes the coordinates back into the same file, saving
//! after each row.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geocoder::backfill::{backfill, BackfillOptions};
use geocoder::geocode::{NominatimClient, DEFAULT_ENDPOINT};
use geocoder::table::Table;
use geocoder::template::{QueryTemplate, DEFAULT_TEMPLATE};

#[derive(Parser, Debug)]
#[command(name = "geocoder")]
#[command(about = "Fill in missing latitude/longitude in a CSV via Nominatim")]
struct Args {
    /// CSV file to update in place
    input: PathBuf,

    /// Write results here instead of overwriting the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Latitude column name
    #[arg(long, default_value = "Latitude")]
    lat_column: String,

    /// Longitude column name
    #[arg(long, default_value = "Longitude")]
    lon_column: String,

    /// Address query template with {Column} placeholders
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    template: String,

    /// Pause between lookups in milliseconds
    #[arg(long, env = "GEOCODER_DELAY_MS", default_value = "1000")]
    delay_ms: u64,

    /// Keep existing coordinate cells when a lookup fails
    #[arg(long)]
    keep_existing: bool,

    /// List rows that would be geocoded without calling the service
    #[arg(long)]
    dry_run: bool,

    /// Nominatim base URL
    #[arg(long, env = "GEOCODER_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// User-Agent sent with every request
    #[arg(long, env = "GEOCODER_USER_AGENT", default_value = "geodata-script/1.0")]
    user_agent: String,

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

    let mut table = Table::read(&args.input)?;
    info!(
        input = %args.input.display(),
        rows = table.len(),
        columns = table.headers().len(),
        "Loaded table"
    );

    let options = BackfillOptions {
        lat_column: args.lat_column.clone(),
        lon_column: args.lon_column.clone(),
        template: QueryTemplate::parse(&args.template)?,
        delay: Duration::from_millis(args.delay_ms),
        keep_existing: args.keep_existing,
        dry_run: args.dry_run,
        output: (!args.dry_run).then(|| args.output.clone().unwrap_or_else(|| args.input.clone())),
    };

    let client = NominatimClient::new(&args.endpoint, &args.user_agent)?;
    let summary = backfill(&mut table, &client, &options).await?;

    info!(
        processed = summary.processed,
        resolved = summary.resolved,
        failed = summary.failed,
        skipped = summary.skipped,
        started_at = %summary.started_at.to_rfc3339(),
        finished_at = %summary.finished_at.to_rfc3339(),
        "Updated {} rows with missing coordinates",
        summary.resolved + summary.failed
    );

    Ok(())
}
