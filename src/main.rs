//! Junction client CLI application
//!
//! Command-line interface for the junction-analysis backend: submits four
//! intersection videos, follows the analysis with a progress bar and prints
//! the per-direction signal timing.

use std::process;

use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Import CLI modules through the library (module is public but not re-exported)
use junction_client::cli::{
    format_error, handle_config, handle_health, handle_stats, handle_submit, Cli, Commands,
};
use junction_client::config::AppConfig;
use junction_client::errors::Result;

#[tokio::main]
async fn main() {
    // Initialize program
    let result = run().await;

    // Handle any errors that occurred
    if let Err(e) = result {
        eprintln!("Error: {}", format_error(&e));
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok(); // Ignore errors if file doesn't exist

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Defaults, then config file, then JUNCTION_API_URL, then flags
    let mut config = AppConfig::load(cli.global.config.clone()).await?;
    if let Some(api_url) = cli.global.api_url.clone() {
        config = config.with_api_url(api_url);
        config.validate()?;
    }

    // Initialize logging based on verbosity
    init_logging(&cli, &config);

    info!("Junction client v{} starting", env!("CARGO_PKG_VERSION"));
    info!("Backend address: {}", config.client.base_url);

    let quiet = cli.global.quiet;

    // Execute the appropriate command
    match cli.command {
        Commands::Submit(args) => {
            info!("Executing submit command");
            handle_submit(args, &config, quiet).await
        }
        Commands::Health(args) => {
            info!("Executing health command");
            handle_health(args, &config).await
        }
        Commands::Stats => {
            info!("Executing stats command");
            handle_stats(&config, quiet).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(args, &config).await
        }
    }
}

/// Initialize logging based on CLI verbosity and the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let configured = config.logging.level.parse().unwrap_or(Level::WARN);
    let log_level = cli.log_level(configured);

    // Create environment filter
    let mut filter = EnvFilter::from_default_env();
    match format!("junction_client={}", log_level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Invalid log directive: {}", e),
    }

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.logging.colored_output && atty::is(atty::Stream::Stderr))
        .with_writer(std::io::stderr)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
