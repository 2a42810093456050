//! Upstream entry point
//!
//! Forwards requests over HTTP/1.1 to the application server that runs the
//! real entry script. Client failures are logged here, at the boundary, and
//! turned into gateway responses.

use std::str::FromStr;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::http::uri::Authority;
use hyper::{Method, Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use super::{BoxFuture, EntryPoint, ForwardedRequest};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::http;
use crate::logger;

/// Headers that describe one hop and are not forwarded
static HOP_BY_HOP: [HeaderName; 5] = [
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::TE,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
];

pub struct UpstreamEntryPoint {
    client: Client<HttpConnector, Full<Bytes>>,
    authority: Authority,
    timeout: Duration,
    preserve_host: bool,
}

impl UpstreamEntryPoint {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let authority = Authority::from_str(&config.upstream)
            .map_err(|_| Error::InvalidUpstream(config.upstream.clone()))?;
        if authority.port_u16().is_none() {
            return Err(Error::InvalidUpstream(config.upstream.clone()));
        }

        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            authority,
            timeout: Duration::from_secs(config.timeout_secs),
            preserve_host: config.preserve_host,
        })
    }

    /// Build the outgoing request for the application server
    pub fn build_request(
        &self,
        request: &ForwardedRequest,
    ) -> std::result::Result<Request<Full<Bytes>>, hyper::http::Error> {
        let uri = Uri::builder()
            .scheme("http")
            .authority(self.authority.clone())
            .path_and_query(request.path_and_query())
            .build()?;

        let mut builder = Request::builder().method(request.method().clone()).uri(uri);

        if let Some(headers) = builder.headers_mut() {
            for (name, value) in request.headers() {
                if !HOP_BY_HOP.contains(name) && name != header::CONTENT_LENGTH {
                    headers.append(name.clone(), value.clone());
                }
            }

            let client_host = request.headers().get(header::HOST).cloned();
            if let Some(host) = &client_host {
                headers.insert("x-forwarded-host", host.clone());
            }
            if !self.preserve_host || client_host.is_none() {
                if let Ok(host) = HeaderValue::from_str(self.authority.as_str()) {
                    headers.insert(header::HOST, host);
                }
            }
            if let Some(addr) = request.remote_addr() {
                if let Ok(ip) = HeaderValue::from_str(&addr.ip().to_string()) {
                    headers.insert("x-forwarded-for", ip);
                }
            }
        }

        builder.body(Full::new(request.body().clone()))
    }

    async fn send(&self, request: ForwardedRequest) -> Response<Full<Bytes>> {
        let target = format!("{} {}", request.method(), request.path_and_query());
        let is_head = *request.method() == Method::HEAD;
        let outgoing = match self.build_request(&request) {
            Ok(req) => req,
            Err(e) => {
                logger::log_upstream_error(&target, &e);
                return http::build_500_response();
            }
        };

        let exchange = async {
            let response = self.client.request(outgoing).await?;
            let (parts, body) = response.into_parts();
            let bytes = body.collect().await?.to_bytes();
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>((parts, bytes))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok((mut parts, bytes))) => {
                for name in HOP_BY_HOP.iter() {
                    parts.headers.remove(name);
                }
                // A HEAD answer has no body; its Content-Length describes the GET
                if !is_head {
                    if let Ok(len) = HeaderValue::from_str(&bytes.len().to_string()) {
                        parts.headers.insert(header::CONTENT_LENGTH, len);
                    }
                }
                Response::from_parts(parts, Full::new(bytes))
            }
            Ok(Err(e)) => {
                logger::log_upstream_error(&target, &e);
                http::build_502_response()
            }
            Err(_) => {
                logger::log_upstream_error(
                    &target,
                    &format!("no response within {}s", self.timeout.as_secs()),
                );
                http::build_504_response()
            }
        }
    }
}

impl EntryPoint for UpstreamEntryPoint {
    fn forward(&self, request: ForwardedRequest) -> BoxFuture<'_, Response<Full<Bytes>>> {
        Box::pin(self.send(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::IncomingRequest;
    use hyper::StatusCode;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn app_config(upstream: &str, preserve_host: bool) -> AppConfig {
        AppConfig {
            upstream: upstream.to_string(),
            timeout_secs: 5,
            preserve_host,
        }
    }

    /// Application server that answers one request with a fixed raw response
    async fn fixed_upstream(raw: &'static [u8]) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            stream.write_all(raw).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        addr
    }

    fn incoming(path_and_query: &str) -> IncomingRequest {
        let mut req = IncomingRequest::new(Method::POST, path_and_query);
        req.headers
            .insert(header::HOST, HeaderValue::from_static("localhost:8080"));
        req.headers
            .insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        req.headers
            .insert(header::COOKIE, HeaderValue::from_static("sid=1"));
        req.body = Bytes::from_static(b"name=x");
        req.remote_addr = Some("127.0.0.1:55000".parse().unwrap());
        req
    }

    #[test]
    fn test_rejects_invalid_upstream() {
        assert!(matches!(
            UpstreamEntryPoint::new(&app_config("not a host", false)),
            Err(Error::InvalidUpstream(_))
        ));
        assert!(matches!(
            UpstreamEntryPoint::new(&app_config("localhost", false)),
            Err(Error::InvalidUpstream(_))
        ));
    }

    #[tokio::test]
    async fn test_build_request_rewrites_uri_and_headers() {
        let upstream = UpstreamEntryPoint::new(&app_config("127.0.0.1:9000", false)).unwrap();
        let fwd = ForwardedRequest::with_params(
            incoming("/auth/google/callback?code=abc"),
            &[("page", "auth"), ("action", "callback")],
        );

        let req = upstream.build_request(&fwd).unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.uri().to_string(),
            "http://127.0.0.1:9000/auth/google/callback?code=abc&page=auth&action=callback"
        );
        assert_eq!(req.headers()[header::HOST], "127.0.0.1:9000");
        assert_eq!(req.headers()["x-forwarded-host"], "localhost:8080");
        assert_eq!(req.headers()["x-forwarded-for"], "127.0.0.1");
        assert_eq!(req.headers()[header::COOKIE], "sid=1");
        assert!(req.headers().get(header::CONNECTION).is_none());

        let body = req.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "name=x");
    }

    #[test]
    fn test_preserve_host() {
        let upstream = UpstreamEntryPoint::new(&app_config("127.0.0.1:9000", true)).unwrap();
        let fwd = ForwardedRequest::unchanged(incoming("/dashboard"));
        let req = upstream.build_request(&fwd).unwrap();
        assert_eq!(req.headers()[header::HOST], "localhost:8080");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let upstream =
            UpstreamEntryPoint::new(&app_config(&format!("127.0.0.1:{port}"), false)).unwrap();

        let resp = upstream
            .forward(ForwardedRequest::unchanged(incoming("/dashboard")))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_upstream_response_returned_as_is() {
        let addr = fixed_upstream(
            b"HTTP/1.1 201 Created\r\n\
              X-App: yes\r\n\
              Set-Cookie: sid=2\r\n\
              Connection: close\r\n\
              Transfer-Encoding: chunked\r\n\
              \r\n\
              5\r\nhello\r\n0\r\n\r\n",
        )
        .await;
        let upstream = UpstreamEntryPoint::new(&app_config(&addr.to_string(), false)).unwrap();
        let fwd = ForwardedRequest::unchanged(IncomingRequest::new(Method::GET, "/dashboard?x=1"));

        let resp = upstream.forward(fwd).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()["x-app"], "yes");
        assert_eq!(resp.headers()[header::SET_COOKIE], "sid=2");
        assert!(resp.headers().get(header::CONNECTION).is_none());
        assert!(resp.headers().get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "5");

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_head_keeps_upstream_content_length() {
        let addr = fixed_upstream(b"HTTP/1.1 200 OK\r\nContent-Length: 42\r\n\r\n").await;
        let upstream = UpstreamEntryPoint::new(&app_config(&addr.to_string(), false)).unwrap();
        let fwd = ForwardedRequest::unchanged(IncomingRequest::new(Method::HEAD, "/report"));

        let resp = upstream.forward(fwd).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "42");

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_stalled_upstream_is_gateway_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let config = AppConfig {
            timeout_secs: 1,
            ..app_config(&addr.to_string(), false)
        };
        let upstream = UpstreamEntryPoint::new(&config).unwrap();

        let resp = upstream
            .forward(ForwardedRequest::unchanged(incoming("/dashboard")))
            .await;
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
