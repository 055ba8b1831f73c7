//! Wisp server binary.
//!
//! Parses configuration from flags and environment, starts one expiry
//! sweeper per store, serves HTTP until Ctrl+C or SIGTERM, then wipes both
//! stores before exiting.

use clap::Parser;
use wisp_core::config::{
    DEFAULT_FILE_ID_LENGTH, DEFAULT_MAX_ID_ATTEMPTS, DEFAULT_MESSAGE_ID_LENGTH,
    DEFAULT_SWEEP_INTERVAL_SECS, MAX_TTL_SECS,
};
use wisp_core::StoreConfig;
use wisp_server::config::{DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT};
use wisp_server::{router, AppState, ServerConfig};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

const MAX_TTL_MINUTES: i64 = MAX_TTL_SECS / 60;

#[derive(Parser, Debug)]
#[command(name = "wisp-server", version, about = "Ephemeral encrypted file and message drop")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "WISP_PORT")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = DEFAULT_HOST, env = "WISP_HOST")]
    host: String,

    /// File TTL in minutes
    #[arg(
        long,
        default_value_t = 60,
        env = "FILE_TTL_MINUTES",
        value_parser = clap::value_parser!(i64).range(1..=MAX_TTL_MINUTES)
    )]
    file_ttl_minutes: i64,

    /// Message TTL in minutes
    #[arg(
        long,
        default_value_t = 60,
        env = "MESSAGE_TTL_MINUTES",
        value_parser = clap::value_parser!(i64).range(1..=MAX_TTL_MINUTES)
    )]
    message_ttl_minutes: i64,

    /// Expiry sweep interval in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_SWEEP_INTERVAL_SECS,
        env = "SWEEP_INTERVAL_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    sweep_interval_secs: u64,

    /// Largest accepted upload in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "MAX_UPLOAD_BYTES")]
    max_upload_bytes: usize,

    /// Characters per file id
    #[arg(long, default_value_t = DEFAULT_FILE_ID_LENGTH, env = "FILE_ID_LENGTH")]
    file_id_length: usize,

    /// Characters per message id
    #[arg(long, default_value_t = DEFAULT_MESSAGE_ID_LENGTH, env = "MESSAGE_ID_LENGTH")]
    message_id_length: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            max_upload_bytes: self.max_upload_bytes,
            store: StoreConfig {
                file_ttl_secs: self.file_ttl_minutes.saturating_mul(60),
                message_ttl_secs: self.message_ttl_minutes.saturating_mul(60),
                sweep_interval_secs: self.sweep_interval_secs,
                file_id_length: self.file_id_length,
                message_id_length: self.message_id_length,
                max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
            },
        }
    }
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wisp_server=info,wisp_core=info".into()),
        )
        .init();

    let config = Args::parse().into_config();
    let addr = config.bind_addr();

    tracing::info!(
        file_ttl_secs = config.store.file_ttl_secs,
        message_ttl_secs = config.store.message_ttl_secs,
        sweep_interval_secs = config.store.sweep_interval_secs,
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded"
    );

    let state = AppState::new(config);
    let sweepers = state.spawn_sweepers();
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Wisp server starting on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    for sweeper in sweepers {
        sweeper.shutdown();
    }
    let (files, messages) = state.wipe_all();
    tracing::info!(files, messages, "Stores wiped, shutting down");

    served
}

/// Resolve on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let config = Args::parse_from(["wisp-server"]).into_config();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_upload_bytes, 15 * 1024 * 1024);
        assert_eq!(config.store.file_ttl_secs, 3600);
        assert_eq!(config.store.message_ttl_secs, 3600);
        assert_eq!(config.store.sweep_interval_secs, 300);
        assert_eq!(config.store.file_id_length, 3);
        assert_eq!(config.store.message_id_length, 8);
    }

    #[test]
    fn test_args_override() {
        let config = Args::parse_from([
            "wisp-server",
            "--port",
            "9000",
            "--file-ttl-minutes",
            "5",
            "--file-id-length",
            "6",
        ])
        .into_config();
        assert_eq!(config.port, 9000);
        assert_eq!(config.store.file_ttl_secs, 300);
        assert_eq!(config.store.file_id_length, 6);
    }

    #[test]
    fn test_out_of_range_durations_are_rejected() {
        for (flag, value) in [
            ("--message-ttl-minutes", "0"),
            ("--file-ttl-minutes", "-3"),
            ("--file-ttl-minutes", "1000000000000"),
            ("--message-ttl-minutes", "153722867280912930"),
            ("--sweep-interval-secs", "0"),
        ] {
            assert!(
                Args::try_parse_from(["wisp-server", flag, value]).is_err(),
                "{flag} {value} should be rejected"
            );
        }
    }

    #[test]
    fn test_longest_ttl_is_accepted() {
        let max = MAX_TTL_MINUTES.to_string();
        let config = Args::parse_from(["wisp-server", "--file-ttl-minutes", max.as_str()])
            .into_config();
        assert_eq!(config.store.file_ttl_secs, MAX_TTL_SECS);
    }
}
