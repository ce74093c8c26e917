//! Chat proxy server.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 CHAT PROXY                   │
//!   Browser / CLI         │  ┌────────┐   ┌─────────┐   ┌────────────┐   │
//!   (BackoffClient)  ─────┼─▶│ origin │──▶│endpoint │──▶│  upstream  │───┼──▶ Generative
//!                         │  │  gate  │   │ handler │   │   client   │   │    Language API
//!                    ◀────┼──│  403   │◀──│ 200/500 │◀──│ (deadline) │◀──┼───
//!                         │  └────────┘   └─────────┘   └────────────┘   │
//!                         │                                              │
//!                         │  config (env/TOML) · logging (stdout + file) │
//!                         │  metrics · graceful shutdown                 │
//!                         └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from the environment (`GEMINI_API_KEY`, `PORT`,
//! `ALLOWED_ORIGINS`, ...) optionally layered over a TOML file named by
//! `CHAT_PROXY_CONFIG`. The process exits with status 1 when the credential
//! is missing.

use chat_proxy::lifecycle::{self, Shutdown};
use chat_proxy::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging depends on config, so these errors go straight to stderr.
    let (config, _log_guard) = match lifecycle::configure(None) {
        Ok(ready) => ready,
        Err(e) => {
            eprintln!("Error: {}", e.fatal_message());
            std::process::exit(1);
        }
    };

    tracing::info!("chat-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let (server, listener) = match lifecycle::prepare(config).await {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
