// Connection handling module
// Accepts a single TCP connection and serves it with the request handler

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::sync::watch;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
/// * `draining` - Flips to `true` once shutdown starts
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    draining: watch::Receiver<bool>,
) {
    // Increment first, then check, so concurrent accepts can't both slip under the limit
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
        draining,
    );
}

/// Serve one connection in a local task.
///
/// Only header reads are timed; a request being handled is never cut off
/// here, so the upstream timeout decides how long a slow application may
/// take. When draining starts the connection finishes its current request
/// and closes. The counter is decremented when the task ends.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
    mut draining: watch::Receiver<bool>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(performance.read_timeout))
            .keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );
        tokio::pin!(conn);

        let result = tokio::select! {
            result = conn.as_mut() => result,
            _ = draining.wait_for(|draining| *draining) => {
                conn.as_mut().graceful_shutdown();
                conn.as_mut().await
            }
        };

        if let Err(err) = result {
            logger::log_connection_error(&err);
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
