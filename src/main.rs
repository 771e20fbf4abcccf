//! RAX Gopher Server - Entry Point
//!
//! Serves a document root over the Gopher protocol (RFC 1436).

use log::{error, info};
use std::path::Path;
use std::process;
use std::sync::Arc;

use rax_gopher_server::error::handlers::handle_error;
use rax_gopher_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "rax-gopher-server".into());
    let docroot = args.next();
    if matches!(docroot.as_deref(), Some("-h") | Some("--help")) {
        println!("usage: {} [docroot]", program);
        return;
    }

    let mut config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };
    if let Some(docroot) = docroot {
        config.document_root = docroot;
    }

    if !Path::new(&config.document_root).is_dir() {
        error!("Document root path '{}' doesn't exist.", config.document_root);
        process::exit(1);
    }

    info!("Launching Gopher server...");

    let server = Arc::new(Server::new(config));
    let signal_server = Arc::clone(&server);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_server.shutdown();
        }
    });

    if let Err(e) = server.start().await {
        handle_error(&e);
        process::exit(1);
    }
}
