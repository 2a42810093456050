//! Static file serving module
//!
//! One-shot read of a resolved asset. The file may vanish or become
//! unreadable between classification and the read; that is reported as a
//! response, never as a fault.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use crate::http;
use crate::logger;

/// Serve a file the router already resolved
pub async fn serve_file(
    path: &Path,
    content_type: &'static str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match fs::read(path).await {
        Ok(content) => http::build_file_response(Bytes::from(content), content_type, is_head),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            logger::log_warning(&format!(
                "File disappeared before it could be read '{}'",
                path.display()
            ));
            http::build_404_response()
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            http::build_500_response()
        }
    }
}
