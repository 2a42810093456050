//! Application entry point
//!
//! The router never produces application responses itself. Auth actions and
//! passthrough requests are handed to an [`EntryPoint`], which owns the full
//! response.

pub mod request;
pub mod upstream;

use std::future::Future;
use std::pin::Pin;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

pub use request::{ForwardedRequest, IncomingRequest};
pub use upstream::UpstreamEntryPoint;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The application's main entry point
pub trait EntryPoint: Send + Sync {
    /// Produce the complete response for a forwarded request
    fn forward(&self, request: ForwardedRequest) -> BoxFuture<'_, Response<Full<Bytes>>>;
}
