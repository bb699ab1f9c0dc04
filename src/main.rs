// src/main.rs
use std::process::exit;
use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use leaker::cli::{App, Args};
use leaker::logging::{init_logging, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LogLevel::from_flags(args.quiet, args.debug))?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let app = App::new(args);
    if let Err(e) = app.run(cancel).await {
        error!("{}", e);
        exit(1);
    }

    Ok(())
}

/// Cancel every enumeration on Ctrl-C or SIGTERM
async fn cancel_on_signal(cancel: CancellationToken) {
    match wait_for_shutdown_signal().await {
        Ok(signal) => debug!("Received {}, shutting down", signal),
        Err(e) => {
            error!("{}", e);
            return;
        }
    }
    cancel.cancel();
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = tokio::signal::ctrl_c() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("failed to install Ctrl-C handler: {}", e))?;
    Ok("Ctrl-C")
}
