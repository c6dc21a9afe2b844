//! dbpools - run SQL statements through a cached multi-database pool.
//!
//! Each result is printed to stdout as one JSON line; logs go to stderr.

use clap::Parser;
use dbpools::{Config, DatabasePools};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_tracing(&config);

    let pools = match DatabasePools::from_url(&config.url, config.cache_options()) {
        Ok(pools) => pools,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("Error: {}", e);
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Hint: {}", suggestion);
            }
            return ExitCode::FAILURE;
        }
    };

    info!(
        database = %config.database,
        statements = config.statements.len(),
        repeat = config.repeat,
        "Starting dbpools v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut failed = false;
    for _ in 0..config.repeat {
        for sql in &config.statements {
            match pools.execute_async(&config.database, sql, config.force).await {
                Ok(result) => match serde_json::to_string(result.as_ref()) {
                    Ok(line) => println!("{}", line),
                    Err(e) => {
                        error!(error = %e, "Failed to serialize result");
                        failed = true;
                    }
                },
                Err(message) => {
                    error!(sql = %sql, error = %message, "Statement failed");
                    eprintln!("Error: {}", message);
                    failed = true;
                }
            }
        }
    }

    pools.destroy().await;

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
