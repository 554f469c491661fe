//! Telemetry Spool - Binary Entry Point
//!
//! Reads log lines from stdin and spools them under the current consent.
//! Lines starting with `:` are commands:
//!
//! - `:consent <pending|granted|not_granted>` changes the tracking consent
//! - `:flush` waits for queued writes
//! - `:stats` prints per-consent directory statistics

use std::env;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use telemetry_spool::consent::ConsentAwareStore;
use telemetry_spool::diagnostics::TracingSink;
use telemetry_spool::spool::{directory_stats, DirectoryStats, LogEventSerializer, SpoolConfig};
use telemetry_spool::types::{Consent, LogEvent, LogLevel};
use telemetry_spool::utils::current_millis;
use telemetry_spool::SpoolResult;

const SERVICE_NAME: &str = "spool-cli";

#[tokio::main]
async fn main() -> SpoolResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SpoolConfig::from_env()?;
    let initial = match env::var("SPOOL_CONSENT") {
        Ok(value) => value.parse()?,
        Err(_) => Consent::Pending,
    };

    tracing::info!(
        data_dir = %config.data_dir.display(),
        feature = %config.feature,
        consent = %initial,
        "Starting spool"
    );

    let store = ConsentAwareStore::<LogEvent>::new(
        &config,
        initial,
        Arc::new(LogEventSerializer::new()),
        tokio::runtime::Handle::current(),
        TracingSink::shared(),
    );
    store.wait_for_migrations().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, draining queues");
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => handle_line(&store, &line).await,
                    None => break,
                }
            }
        }
    }

    store.flush().await;
    store.wait_for_migrations().await;
    store.shutdown();

    Ok(())
}

async fn handle_line(store: &ConsentAwareStore<LogEvent>, line: &str) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }

    let Some(command) = trimmed.strip_prefix(':') else {
        let event = LogEvent::new(LogLevel::Info, trimmed, SERVICE_NAME)
            .with_timestamp(current_millis() as i64);
        store.append(event);
        return;
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("consent"), Some(value)) => match value.parse::<Consent>() {
            Ok(next) => store.set_consent(next),
            Err(e) => tracing::warn!(error = %e, "Ignoring consent command"),
        },
        (Some("flush"), None) => store.flush().await,
        (Some("stats"), None) => {
            store.flush().await;
            store.wait_for_migrations().await;
            for consent in Consent::ALL {
                let dir = store.root_dir(consent);
                match directory_stats(&dir) {
                    Ok(stats) => println!(
                        "{:<12} {:>4} files {:>12}  {}",
                        consent.to_string(),
                        stats.file_count,
                        DirectoryStats::format_size(stats.total_bytes),
                        dir.display()
                    ),
                    Err(e) => tracing::warn!(error = %e, dir = %dir.display(), "Unable to read stats"),
                }
            }
        }
        _ => tracing::warn!(command = %trimmed, "Unknown command"),
    }
}
