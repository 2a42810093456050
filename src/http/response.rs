//! HTTP response building module
//!
//! Builders for the responses the router produces itself. Builder errors are
//! logged and degrade to an empty response; they never panic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Build a plain-text response with the given status
pub fn build_text_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", message.len())
        .body(Full::new(Bytes::from_static(message.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(message.as_bytes())))
        })
}

/// Build 400 Bad Request response (body could not be read)
pub fn build_400_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::BAD_REQUEST, "400 Bad Request")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Build 500 Internal Server Error response with a generic body
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

/// Build 502 Bad Gateway response (application server unreachable)
pub fn build_502_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::BAD_GATEWAY, "502 Bad Gateway")
}

/// Build 504 Gateway Timeout response
pub fn build_504_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::GATEWAY_TIMEOUT, "504 Gateway Timeout")
}

/// Build a static asset response: fresh headers, exact length, verbatim bytes
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            build_500_response()
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_404_is_plain_text() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_of(resp).await, "404 Not Found");
    }

    #[tokio::test]
    async fn test_file_response_headers() {
        let resp = build_file_response(Bytes::from_static(b"body{}"), "text/css", false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/css");
        assert_eq!(resp.headers()["content-length"], "6");
        assert_eq!(resp.headers().len(), 2);
        assert_eq!(body_of(resp).await, "body{}");
    }

    #[tokio::test]
    async fn test_file_response_head_has_no_body() {
        let resp = build_file_response(Bytes::from_static(b"body{}"), "text/css", true);
        assert_eq!(resp.headers()["content-length"], "6");
        assert!(body_of(resp).await.is_empty());
    }
}
