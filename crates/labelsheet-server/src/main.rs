// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelsheet — barcode label sheet generator
//
// Entry point. Initialises logging, loads configuration, and runs the sheet
// server until Ctrl-C.

use labelsheet_core::AppConfig;
use labelsheet_core::error::Result;
use labelsheet_server::SheetServer;

/// Environment variable naming a JSON configuration file.
const CONFIG_ENV: &str = "LABELSHEET_CONFIG";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Labelsheet starting");

    if let Err(err) = run().await {
        tracing::error!(error = %err, "Labelsheet exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => AppConfig::load(path)?,
        None => {
            tracing::info!("{CONFIG_ENV} not set, using built-in defaults");
            AppConfig::default()
        }
    };

    let mut server = SheetServer::new(config);
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");

    server.stop().await
}
