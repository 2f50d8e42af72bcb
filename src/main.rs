//! switchboard -- demo entry point.
//!
//! Wires the application the way a real one would at startup:
//!   - Configuration loading
//!   - Tracing initialization
//!   - Shared executor construction
//!   - Contract bindings and screen assembly
//!   - One feed load through the assembled feed screen

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use switchboard::ApiClient;
use switchboard::config::{CONFIG_ENV_VAR, Config};
use switchboard::holder;
use switchboard::wiring::{self, Assemble, Screens};

// ---------------------------------------------------------------------------
// CLI argument parsing (minimal, no clap dependency)
// ---------------------------------------------------------------------------

struct CliArgs {
    config_path: Option<PathBuf>,
    pages: u32,
}

fn parse_args() -> CliArgs {
    let mut args = std::env::args().skip(1);
    let mut cli = CliArgs {
        config_path: None,
        pages: 1,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                if let Some(path) = args.next() {
                    cli.config_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--pages" | "-p" => match args.next().and_then(|v| v.parse().ok()) {
                Some(pages) => cli.pages = pages,
                None => {
                    eprintln!("Error: --pages requires a positive number");
                    std::process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("switchboard {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Run with --help for usage information.");
                std::process::exit(1);
            }
        }
    }

    cli
}

fn print_usage() {
    println!(
        "\
switchboard {version} -- shared API client demo

USAGE:
    switchboard [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file [default: switchboard.toml]
    -p, --pages <N>        Number of feed pages to load [default: 1]
    -h, --help             Print this help message
    -V, --version          Print version information

ENVIRONMENT:
    RUST_LOG               Override log level (e.g. RUST_LOG=debug)
    SWITCHBOARD_CONFIG     Alternative to --config flag
    SWITCHBOARD_BASE_URL   Override client.base_url
",
        version = env!("CARGO_PKG_VERSION")
    );
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse CLI arguments
    let cli = parse_args();
    let config_path = cli.config_path.unwrap_or_else(Config::default_path);

    // 2. Load configuration
    let config = Config::load(&config_path)?;

    // 3. Initialize tracing/logging
    init_tracing(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        config_env = CONFIG_ENV_VAR,
        "Starting switchboard"
    );
    for (key, env_var) in config.env_overrides.all() {
        tracing::debug!(setting = %key, env = %env_var, "Setting overridden by environment");
    }

    // 4. Shared executor (built here, on first access)
    let client = holder::shared_or_init(|| ApiClient::from_config(&config.client));
    tracing::info!(base_url = %client.base_url(), "Shared client ready");

    // 5. Bind contracts and assemble every screen; a missing binding stops startup.
    let registry = wiring::production(client);
    tracing::debug!(contracts = ?registry.contracts(), "Contracts bound");
    let screens = Screens::assemble(&registry)?;

    // 6. Drive the feed screen
    screens.feed.view_did_load().await;
    let mut loaded = 1;
    while loaded < cli.pages && screens.feed.load_more().await {
        loaded += 1;
    }

    if let Some(error) = screens.feed.last_error() {
        tracing::error!(error = %error, "Feed failed to load");
        anyhow::bail!("feed failed to load: {error}");
    }
    for item in screens.feed.items() {
        println!("{}\t{}", item.id, item.title);
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    // RUST_LOG env var takes precedence over config file
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.logging.level;
        EnvFilter::new(format!("switchboard={level},warn"))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if config.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
