// Server loop module
// Accepts connections until shutdown is requested, then drains them

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{watch, Notify};

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections until `shutdown` is notified.
///
/// After that no new connections are taken. Open connections are told to
/// close after their current request, and the loop returns once they are
/// all gone or `performance.shutdown_timeout` has passed. Tasks still
/// running at that point are dropped with the `LocalSet`.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    let (drain_tx, drain_rx) = watch::channel(false);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            drain_rx.clone(),
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_info("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    drop(listener);
    drain_tx.send_replace(true);

    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    drain_connections(&active_connections, grace).await;
}

/// Wait until no connection is open or `grace` has elapsed.
async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            logger::log_info("All connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "{remaining} connection(s) still open after {}s, closing them",
                grace.as_secs()
            ));
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
