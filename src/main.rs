use std::sync::Arc;

use authlink::config::{config_schema, load_config};
use authlink::startup;
use authlink::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--schema") {
        match config_schema() {
            Ok(schema) => println!("{}", schema),
            Err(e) => {
                eprintln!("Error rendering configuration schema: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(Arc::new(config)).await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
