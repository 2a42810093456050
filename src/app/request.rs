//! Per-request values
//!
//! [`IncomingRequest`] is what the handler reads off the wire.
//! [`ForwardedRequest`] is a new value built from it for the entry point,
//! optionally carrying injected query parameters. Neither is mutated after
//! construction.

use std::net::SocketAddr;

use hyper::body::Bytes;
use hyper::{HeaderMap, Method};
use url::form_urlencoded;

/// A request with its body fully collected
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub path: String,
    /// Query string as received, without the leading `?`
    pub raw_query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub remote_addr: Option<SocketAddr>,
}

impl IncomingRequest {
    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

#[cfg(test)]
impl IncomingRequest {
    /// Bodiless request built from a request target
    pub fn new(method: Method, path_and_query: &str) -> Self {
        let (path, raw_query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path_and_query.to_string(), None),
        };
        Self {
            method,
            path,
            raw_query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }
}

/// Immutable request handed to the application entry point
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    request: IncomingRequest,
    query: Option<String>,
}

impl ForwardedRequest {
    /// Forward the request as received
    pub fn unchanged(request: IncomingRequest) -> Self {
        let query = request.raw_query.clone();
        Self { request, query }
    }

    /// Forward with extra query parameters appended after the original query
    pub fn with_params(request: IncomingRequest, params: &[(&str, &str)]) -> Self {
        let injected = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        let query = match request.raw_query.as_deref() {
            Some(original) if !original.is_empty() => Some(format!("{original}&{injected}")),
            _ if injected.is_empty() => request.raw_query.clone(),
            _ => Some(injected),
        };
        Self { request, query }
    }

    pub const fn method(&self) -> &Method {
        &self.request.method
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    pub const fn body(&self) -> &Bytes {
        &self.request.body
    }

    pub const fn remote_addr(&self) -> Option<SocketAddr> {
        self.request.remote_addr
    }

    /// Path plus query, as it goes on the request line
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.request.path),
            None => self.request.path.clone(),
        }
    }
}

#[cfg(test)]
impl ForwardedRequest {
    pub fn path(&self) -> &str {
        &self.request.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Last value of a query parameter; injected parameters come last
    pub fn param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| key == name)
            .last()
            .map(|(_, value)| value.into_owned())
    }
}
