//! # OS signal driven shutdown.
//!
//! The engine itself only watches a [`CancellationToken`]. Hosts that want the
//! process signals to stop it spawn [`cancel_on_signal`] with the same token.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT`
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Waits for a termination signal, then cancels `token`.
///
/// Returns early without cancelling if the token is cancelled by someone else.
///
/// # Errors
/// Signal registration failure; the token is left untouched.
pub async fn cancel_on_signal(token: CancellationToken) -> std::io::Result<()> {
    tokio::select! {
        res = wait_for_shutdown_signal() => {
            res?;
            info!("termination signal received");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
    Ok(())
}

/// Waits for a termination signal.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
