//! Talk2Code Web Server
//!
//! Serves the chat and repository analysis API.

use clap::Parser;
use std::path::PathBuf;
use talk2code_core::{init_logging, AppConfig, EnvSource, LogFormat};
use talk2code_web::Talk2CodeServerBuilder;
use tracing::{error, info};

/// Talk2Code Web Server - chat with a repository's code graph
#[derive(Parser)]
#[command(name = "talk2code-web")]
#[command(about = "HTTP API for Talk2Code")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (json, pretty, compact)
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Args {
    fn apply_logging(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let mut config = match AppConfig::load(args.config.as_deref(), &EnvSource::Process) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    args.apply_logging(&mut config);

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let mut builder = Talk2CodeServerBuilder::new(config);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }

    let server = match builder.build() {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting Talk2Code Web Server on http://{}",
        server.config().server.address()
    );

    if let Err(e) = server.start().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
