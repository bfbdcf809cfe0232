//! CLI entry point for dbrest.
//!
//! Builds one request per invocation from the subcommand's flags, fetches it
//! and prints either the raw payload or a tab-separated table.

use std::ffi::OsStr;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use dbrest::compose::path_segment;
use dbrest::config::{
    BASE_URL_ENV, DEFAULT_BASE_URL, TIMEOUT_ENV, default_user_agent, parse_timeout,
};
use dbrest::output::write_raw;
use dbrest::{ApiClient, ClientConfig, EndpointKind, Params, decode, render};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Set to also write JSON logs to a daily rolling file at this path.
const LOG_FILE_ENV: &str = "DBREST_LOG_FILE";

#[derive(Parser)]
#[command(name = "dbrest", version)]
#[command(about = "Deutsche Bahn transport API CLI", long_about = None)]
struct Cli {
    /// Output the raw API response
    #[arg(long, global = true, conflicts_with = "plain")]
    json: bool,

    /// Output stable tab-separated columns without a header
    #[arg(long, global = true)]
    plain: bool,

    /// API base URL
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// HTTP timeout (e.g. 10s, 1m)
    #[arg(
        long,
        global = true,
        env = TIMEOUT_ENV,
        default_value = "10s",
        allow_hyphen_values = true,
        value_parser = parse_timeout
    )]
    timeout: Duration,

    /// Print request details to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for stations, places and addresses
    Locations(LocationsArgs),
    /// List departures for a stop
    Departures(StopArgs),
    /// List arrivals for a stop
    Arrivals(StopArgs),
    /// Find journeys between two locations
    Journeys(JourneysArgs),
    /// Fetch a trip by id
    Trip(TripArgs),
    /// List vehicle movements in a bounding box
    Radar(RadarArgs),
    /// Perform a raw GET request; the response is never tabulated
    Request(RequestArgs),
}

#[derive(Args)]
struct ExtraParams {
    /// Extra query param key=value (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

#[derive(Args)]
struct LocationsArgs {
    /// Search query
    #[arg(value_name = "QUERY")]
    query_arg: Option<String>,

    /// Search query
    #[arg(long)]
    query: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    results: u32,

    /// Enable fuzzy search
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    fuzzy: bool,

    /// Include stops and stations
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    stops: bool,

    /// Include addresses
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    addresses: bool,

    /// Include points of interest
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    poi: bool,

    #[command(flatten)]
    extra: ExtraParams,
}

#[derive(Args)]
struct StopArgs {
    /// Stop/station id
    #[arg(value_name = "STOP")]
    stop_arg: Option<String>,

    /// Stop/station id
    #[arg(long)]
    stop: Option<String>,

    /// Time (ISO 8601)
    #[arg(long)]
    when: Option<String>,

    /// Search window in minutes
    #[arg(long)]
    duration: Option<u32>,

    /// Maximum number of results
    #[arg(long)]
    results: Option<u32>,

    /// Direction filter (station id)
    #[arg(long)]
    direction: Option<String>,

    #[command(flatten)]
    extra: ExtraParams,
}

#[derive(Args)]
struct JourneysArgs {
    /// Origin station/location id or name
    #[arg(long)]
    from: String,

    /// Destination station/location id or name
    #[arg(long)]
    to: String,

    /// Via station/location id or name
    #[arg(long)]
    via: Option<String>,

    /// Departure time (ISO 8601)
    #[arg(long, conflicts_with = "arrival")]
    departure: Option<String>,

    /// Arrival time (ISO 8601)
    #[arg(long)]
    arrival: Option<String>,

    /// Maximum number of results
    #[arg(long)]
    results: Option<u32>,

    /// Maximum number of transfers
    #[arg(long)]
    transfers: Option<u32>,

    #[command(flatten)]
    extra: ExtraParams,
}

#[derive(Args)]
struct TripArgs {
    /// Trip id
    #[arg(value_name = "TRIP_ID")]
    id_arg: Option<String>,

    /// Trip id
    #[arg(long)]
    id: Option<String>,

    /// Line name filter
    #[arg(long)]
    line_name: Option<String>,

    #[command(flatten)]
    extra: ExtraParams,
}

#[derive(Args)]
struct RadarArgs {
    /// Northern latitude
    #[arg(long, allow_negative_numbers = true)]
    north: f64,

    /// Southern latitude
    #[arg(long, allow_negative_numbers = true)]
    south: f64,

    /// Western longitude
    #[arg(long, allow_negative_numbers = true)]
    west: f64,

    /// Eastern longitude
    #[arg(long, allow_negative_numbers = true)]
    east: f64,

    /// Maximum number of results
    #[arg(long)]
    results: Option<u32>,

    /// Timespan in seconds
    #[arg(long)]
    duration: Option<u32>,

    #[command(flatten)]
    extra: ExtraParams,
}

#[derive(Args)]
struct RequestArgs {
    /// API path (e.g. /journeys)
    #[arg(value_name = "PATH")]
    path_arg: Option<String>,

    /// API path (e.g. /journeys)
    #[arg(long)]
    path: Option<String>,

    #[command(flatten)]
    extra: ExtraParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    /// Table with header
    Human,
    /// Table without header
    Plain,
    /// Raw payload
    Json,
}

impl OutputMode {
    fn from_flags(json: bool, plain: bool) -> Self {
        match (json, plain) {
            (true, _) => OutputMode::Json,
            (false, true) => OutputMode::Plain,
            (false, false) => OutputMode::Human,
        }
    }
}

/// A fully resolved request; `kind` is `None` for raw passthrough.
#[derive(Debug, PartialEq)]
struct ApiRequest {
    path: String,
    params: Params,
    kind: Option<EndpointKind>,
}

impl Commands {
    fn into_request(self) -> Result<ApiRequest, clap::Error> {
        let request = match self {
            Commands::Locations(args) => {
                let query = required(args.query, args.query_arg, "--query")?;
                let mut params = Params::new();
                params.set("query", query);
                params.set("results", args.results.to_string());
                params.set("fuzzy", args.fuzzy.to_string());
                params.set("stops", args.stops.to_string());
                params.set("addresses", args.addresses.to_string());
                params.set("poi", args.poi.to_string());
                ApiRequest {
                    path: "/locations".to_string(),
                    params: args.extra.apply(params),
                    kind: Some(EndpointKind::Locations),
                }
            }
            Commands::Departures(args) => args.into_request(EndpointKind::Departures)?,
            Commands::Arrivals(args) => args.into_request(EndpointKind::Arrivals)?,
            Commands::Journeys(args) => {
                if args.from.trim().is_empty() || args.to.trim().is_empty() {
                    return Err(usage_error("--from and --to are required"));
                }
                let mut params = Params::new();
                params.set("from", args.from);
                params.set("to", args.to);
                set_text(&mut params, "via", args.via);
                set_text(&mut params, "departure", args.departure);
                set_text(&mut params, "arrival", args.arrival);
                set_count(&mut params, "results", args.results);
                set_count(&mut params, "transfers", args.transfers);
                ApiRequest {
                    path: "/journeys".to_string(),
                    params: args.extra.apply(params),
                    kind: Some(EndpointKind::Journeys),
                }
            }
            Commands::Trip(args) => {
                let id = required(args.id, args.id_arg, "--id")?;
                let mut params = Params::new();
                set_text(&mut params, "lineName", args.line_name);
                ApiRequest {
                    path: format!("/trips/{}", path_segment(&id)),
                    params: args.extra.apply(params),
                    kind: Some(EndpointKind::Trip),
                }
            }
            Commands::Radar(args) => {
                let mut params = Params::new();
                params.set("north", format!("{:.6}", args.north));
                params.set("south", format!("{:.6}", args.south));
                params.set("west", format!("{:.6}", args.west));
                params.set("east", format!("{:.6}", args.east));
                set_count(&mut params, "results", args.results);
                set_count(&mut params, "duration", args.duration);
                ApiRequest {
                    path: "/radar".to_string(),
                    params: args.extra.apply(params),
                    kind: Some(EndpointKind::Radar),
                }
            }
            Commands::Request(args) => {
                let path = required(args.path, args.path_arg, "--path")?;
                ApiRequest {
                    path,
                    params: args.extra.apply(Params::new()),
                    kind: None,
                }
            }
        };
        Ok(request)
    }
}

impl StopArgs {
    fn into_request(self, kind: EndpointKind) -> Result<ApiRequest, clap::Error> {
        let stop = required(self.stop, self.stop_arg, "--stop")?;
        let mut params = Params::new();
        set_text(&mut params, "when", self.when);
        set_count(&mut params, "duration", self.duration);
        set_count(&mut params, "results", self.results);
        set_text(&mut params, "direction", self.direction);
        Ok(ApiRequest {
            path: format!("/stops/{}/{kind}", path_segment(&stop)),
            params: self.extra.apply(params),
            kind: Some(kind),
        })
    }
}

impl ExtraParams {
    fn apply(self, mut params: Params) -> Params {
        for (key, value) in self.params {
            params.add(key, value);
        }
        params
    }
}

/// The flag value if given, else the positional one; blank counts as missing.
fn required(
    flag: Option<String>,
    positional: Option<String>,
    name: &str,
) -> Result<String, clap::Error> {
    flag.filter(|v| !v.is_empty())
        .or(positional)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| usage_error(format!("missing {name}")))
}

fn set_text(params: &mut Params, key: &str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.set(key, value);
    }
}

fn set_count(params: &mut Params, key: &str, value: Option<u32>) {
    if let Some(n) = value.filter(|n| *n > 0) {
        params.set(key, n.to_string());
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid --param {raw:?} (expected key=value)")),
    }
}

fn usage_error(message: impl std::fmt::Display) -> clap::Error {
    Cli::command().error(ErrorKind::MissingRequiredArgument, message)
}

/// Stderr filter used when `RUST_LOG` is unset; `--verbose` only opens up
/// this crate's own events.
fn verbose_directive(verbose: bool) -> &'static str {
    if verbose { "dbrest=debug" } else { "warn" }
}

/// Logs to stderr, plus a JSON file when [`LOG_FILE_ENV`] is set.
///
/// The returned guard must stay alive until exit so buffered file logs flush.
fn init_tracing(verbose: bool) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(verbose_directive(verbose))),
        );

    let (json_layer, guard) = match std::env::var(LOG_FILE_ENV) {
        Ok(log_file_path) if !log_file_path.trim().is_empty() => {
            let path = Path::new(&log_file_path);
            let log_dir = path.parent().unwrap_or(Path::new("."));
            let log_file_name = path.file_name().unwrap_or(OsStr::new("dbrest.log"));
            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(
                    EnvFilter::builder()
                        .with_env_var("RUST_LOG_JSON")
                        .with_default_directive(LevelFilter::DEBUG.into())
                        .from_env_lossy(),
                );
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file before clap reads env defaults

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.verbose);

    let mode = OutputMode::from_flags(cli.json, cli.plain);
    let request = cli.command.into_request().unwrap_or_else(|e| e.exit());

    let config = ClientConfig::new(&cli.base_url, cli.timeout, Some(default_user_agent()))?;
    let client = ApiClient::new(config);

    if cli.verbose {
        eprintln!("GET {}", client.url(&request.path, &request.params));
    }

    let data = client.get(&request.path, &request.params).await?;
    debug!(bytes = data.len(), ?mode, "Fetched payload");

    let mut stdout = std::io::stdout().lock();
    match (request.kind, mode) {
        (Some(kind), OutputMode::Human | OutputMode::Plain) => {
            let records = decode(&data, kind)?;
            stdout.write_all(render(&records, mode == OutputMode::Human).as_bytes())?;
            stdout.flush()?;
        }
        _ => write_raw(&mut stdout, &data)?,
    }

    Ok(())
}
