//! Request handler module
//!
//! Applies a routing decision to an HTTP request: injects auth parameters,
//! streams static files, answers 404, or passes the request through.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
