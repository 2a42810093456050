// Server module entry point
// Listener setup, per-connection serving, and the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::start_server_loop;
