// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! linkbus daemon (linkbusd)
//!
//! Consumes account events until SIGINT or SIGTERM, then drains and exits.

use std::path::Path;

use linkbus_daemon::config::{Config, LogFormat, LogSection};
use linkbus_daemon::lifecycle::{self, LifecycleError};
use linkbus_messaging::CancellationToken;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let path = Config::path_from(
        std::env::args().skip(1),
        std::env::var("LINKBUS_CONFIG").ok(),
    );
    let config = Config::from_file_and_env(&path)?;

    // Held until exit so buffered file logs are flushed
    let _log_guard = setup_logging(&config.log)?;

    info!(
        config = %path.display(),
        transport = ?config.transport.kind,
        topics = ?config.consumer.topics,
        group_id = %config.consumer.group_id,
        "Starting linkbusd"
    );

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone())?;

    match lifecycle::run(&config, shutdown).await {
        Ok(stats) => {
            info!(
                received = stats.received,
                handled = stats.handled,
                dropped = stats.dropped(),
                dead_lettered = stats.dead_lettered,
                "linkbusd stopped"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "linkbusd failed");
            Err(e.into())
        }
    }
}

fn spawn_signal_handler(shutdown: CancellationToken) -> Result<(), LifecycleError> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
        }
        shutdown.cancel();
    });
    Ok(())
}

/// `RUST_LOG` wins over the configured level. Logs go to stdout unless a
/// file is configured.
fn setup_logging(log: &LogSection) -> Result<Option<WorkerGuard>, LifecycleError> {
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .map_err(|e| LifecycleError::Logging(format!("bad log level {:?}: {}", log.level, e)))?;

    let (writer, guard) = match &log.file {
        Some(path) => {
            let file_name = path.file_name().ok_or_else(|| {
                LifecycleError::Logging(format!("not a file path: {}", path.display()))
            })?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match log.format {
        LogFormat::Text => fmt::layer()
            .with_ansi(log.file.is_none())
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| LifecycleError::Logging(e.to_string()))?;

    Ok(guard)
}
