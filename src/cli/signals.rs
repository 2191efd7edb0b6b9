//! Signal handling for interactive commands
//!
//! Long-running commands race their work against [`shutdown_requested`] so
//! CTRL-C or SIGTERM tears the running job or monitor down cleanly.

use tokio::signal;
use tracing::{info, warn};

/// Resolve when the process is asked to stop (CTRL-C, SIGTERM)
///
/// A handler that cannot be installed never fires; the other one still does.
pub async fn shutdown_requested() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C signal received"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("SIGTERM signal received");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
}
