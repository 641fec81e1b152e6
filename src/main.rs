use std::process::ExitCode;

use serde_json::Value;
use tracing::{error, info};

use galnet_publisher::{Config, Handler};

/// Optional TOML file layered under the environment variables.
const CONFIG_PATH_VAR: &str = "PUBLISHER_CONFIG";

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => Config::load_with_env(&path),
        Err(_) => Config::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = galnet_publisher::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        galnet_publisher::logging::init_console_only();
    }

    let handler = match Handler::from_config(&config).await {
        Ok(handler) => handler,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match handler.run(&Value::Null).await {
        Ok(outcome) => {
            info!("Run finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
