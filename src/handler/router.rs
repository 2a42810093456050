//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: upload limit checks, body
//! collection, classification, and dispatch of the decision.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::{Request, Response};

use crate::app::{ForwardedRequest, IncomingRequest};
use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::RouteDecision;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let max_body_size = state.config.http.max_body_size;

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", parts.version).replace("HTTP/", "");
    entry.user_agent = parts
        .headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let (mut response, route) = if let Some(resp) = check_body_size(&parts.headers, max_body_size)
    {
        (resp, "rejected")
    } else {
        match collect_body(body, max_body_size).await {
            Ok(bytes) => {
                let incoming = IncomingRequest {
                    method: parts.method,
                    path: parts.uri.path().to_string(),
                    raw_query: parts.uri.query().map(ToString::to_string),
                    headers: parts.headers,
                    body: bytes,
                    remote_addr: Some(remote_addr),
                };
                dispatch(incoming, &state).await
            }
            Err(resp) => (resp, "rejected"),
        }
    };

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(header::SERVER, server);
    }

    if state.access_log_enabled() {
        entry.route = route;
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().map_or(0, |n| {
            usize::try_from(n).unwrap_or(usize::MAX)
        });
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Classify the request and carry out the decision.
///
/// Returns the response together with the access-log label of the decision.
async fn dispatch(
    req: IncomingRequest,
    state: &AppState,
) -> (Response<Full<Bytes>>, &'static str) {
    let decision = state.router.classify(&req.path);
    let label = decision.label();
    logger::log_debug(&format!("{} {} -> {decision:?}", req.method, req.path));

    let response = match decision {
        RouteDecision::AuthAction { page, action } => {
            let forwarded =
                ForwardedRequest::with_params(req, &[("page", page), ("action", action)]);
            state.entry.forward(forwarded).await
        }
        RouteDecision::StaticFile {
            absolute_path,
            content_type,
        } => static_files::serve_file(&absolute_path, content_type, req.is_head()).await,
        RouteDecision::NotFound => http::build_404_response(),
        RouteDecision::Passthrough => state.entry.forward(ForwardedRequest::unchanged(req)).await,
    };

    (response, label)
}

/// Validate Content-Length header and return 413 if it exceeds the upload limit
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(header::CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Collect the request body, enforcing the upload limit while reading
async fn collect_body<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response())
        }
    }
}
