//! Internal HTTP server exposing host status.
//!
//! | Path       | Auth  | Response                                   |
//! |------------|-------|--------------------------------------------|
//! | `/health`  | none  | `{"status":"ok","timestamp":<unix secs>}`  |
//! | `/ping`    | token | `{"err":null,"data":<StatusSnapshot>}`     |
//! | `/metrics` | token | Prometheus text format                     |
//!
//! Token-protected paths require the `X-Judge-Server-Token` header to carry
//! the SHA-256 hex digest of the shared secret.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming as IncomingBody;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::Token;
use crate::observability::StatusMetrics;
use crate::status::StatusReporter;

/// Header carrying the token digest.
pub const TOKEN_HEADER: &str = "X-Judge-Server-Token";

/// Shared state of the status server.
pub struct StatusState {
    reporter: StatusReporter,
    token: Token,
    metrics: StatusMetrics,
}

impl StatusState {
    pub fn new(reporter: StatusReporter, token: Token) -> Result<Self, prometheus::Error> {
        Ok(Self {
            reporter,
            token,
            metrics: StatusMetrics::new()?,
        })
    }

    pub fn reporter(&self) -> &StatusReporter {
        &self.reporter
    }
}

/// Response envelope for `/ping`.
#[derive(Serialize)]
struct Envelope<T: Serialize> {
    err: Option<&'static str>,
    data: Option<T>,
}

/// Bind `addr` and serve status requests until the task is dropped.
pub async fn run_status_server(
    addr: SocketAddr,
    state: Arc<StatusState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Status server listening on {}", listener.local_addr()?);
    serve(listener, state).await
}

/// Serve status requests on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    state: Arc<StatusState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let _ = stream.set_nodelay(true);
        let state = Arc::clone(&state);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { handle_request(req, state).await }
            });

            let io = TokioIo::new(stream);
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Status connection from {} closed: {}", peer, e);
            }
        });
    }
}

async fn handle_request(
    req: Request<IncomingBody>,
    state: Arc<StatusState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let token = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    Ok(route(&state, req.method(), req.uri().path(), token))
}

/// Dispatch a request to its endpoint.
pub fn route(
    state: &StatusState,
    method: &Method,
    path: &str,
    token: Option<&str>,
) -> Response<Full<Bytes>> {
    match (path, method) {
        ("/health", &Method::GET) => {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            let body = serde_json::json!({ "status": "ok", "timestamp": now.as_secs() });
            response(StatusCode::OK, "application/json", body.to_string())
        }
        ("/ping", &Method::GET | &Method::POST) => {
            if !authorized(state, token) {
                return unauthorized();
            }
            let body = Envelope {
                err: None,
                data: Some(state.reporter.snapshot()),
            };
            json(StatusCode::OK, &body)
        }
        ("/metrics", &Method::GET) => {
            if !authorized(state, token) {
                return unauthorized();
            }
            state.metrics.observe(&state.reporter.snapshot());
            match state.metrics.encode() {
                Ok(text) => response(StatusCode::OK, "text/plain; version=0.0.4", text),
                Err(e) => {
                    warn!("Failed to encode metrics: {}", e);
                    response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "text/plain",
                        "Internal Server Error".to_string(),
                    )
                }
            }
        }
        ("/health" | "/ping" | "/metrics", _) => response(
            StatusCode::METHOD_NOT_ALLOWED,
            "text/plain",
            "Method Not Allowed".to_string(),
        ),
        _ => response(StatusCode::NOT_FOUND, "text/plain", "Not Found".to_string()),
    }
}

fn authorized(state: &StatusState, token: Option<&str>) -> bool {
    let ok = token.is_some_and(|t| state.token.matches(t));
    if !ok {
        warn!("Rejected status request with invalid token");
    }
    ok
}

fn unauthorized() -> Response<Full<Bytes>> {
    let body: Envelope<()> = Envelope {
        err: Some("invalid_token"),
        data: None,
    };
    json(StatusCode::UNAUTHORIZED, &body)
}

fn json<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_string(body) {
        Ok(body) => response(status, "application/json", body),
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "text/plain",
                "Internal Server Error".to_string(),
            )
        }
    }
}

fn response(status: StatusCode, content_type: &'static str, body: String) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from(body)));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    resp
}
