//! pulse CLI
//!
//! Runs the API server, seeds a running instance with synthetic events, and
//! watches a live dashboard session from the terminal.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "pulse",
    version,
    about = "pulse - real-time application event analytics",
    long_about = "Event ingestion, rolling-window statistics, and live dashboard \
                  notifications.\n\n\
                  Run `pulse serve` to start the engine, `pulse seed` to push \
                  synthetic events into it, and `pulse watch` to follow the \
                  dashboard from a terminal."
)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true, env = "PULSE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter directive (overrides configuration)
    #[arg(long, global = true, env = "PULSE_LOG", value_name = "FILTER")]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,

    /// Post synthetic events to a running instance
    Seed {
        /// Base URL of the running instance
        #[arg(long, env = "PULSE_API_URL", default_value = "http://localhost:3000")]
        api_url: String,

        /// Number of extra randomized events on top of the fixed samples
        #[arg(long, default_value = "20")]
        count: usize,
    },

    /// Follow the dashboard from the terminal (polling mode)
    Watch {
        /// Base URL of the running instance
        #[arg(long, env = "PULSE_API_URL", default_value = "http://localhost:3000")]
        api_url: String,

        /// Login email
        #[arg(long, default_value = "admin@dashboard.com")]
        email: String,

        /// Login password
        #[arg(long, default_value = "admin123")]
        password: String,

        /// Refresh period in seconds
        #[arg(long, default_value = "30")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pulse_config::PulseConfig::load(cli.config.clone())?;
    config.validate()?;

    let filter = cli
        .log
        .clone()
        .unwrap_or_else(|| config.observability.log_filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match cli.command {
        Commands::Serve => commands::serve::run(config).await,
        Commands::Seed { api_url, count } => commands::seed::run(&api_url, count).await,
        Commands::Watch {
            api_url,
            email,
            password,
            interval,
        } => commands::watch::run(&api_url, &email, &password, interval).await,
    }
}
