//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, size
//! limits, health probes and dispatch to the assistant home router.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::body::Body;
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request};

use crate::config::AppState;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let mut access = state
        .access_log_enabled()
        .then(|| AccessLogEntry::from_request(&req, peer_addr));

    let mut response = route_request(&req, &state).await;

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(entry) = access.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and configuration
async fn route_request<B>(req: &Request<B>, state: &AppState) -> HttpResponse {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(req.method(), state.config.http.enable_cors) {
        return resp;
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(req, state.config.http.max_body_size) {
        return resp;
    }

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let path = req.uri().path();

    // 3. Health check endpoints
    let health = &state.config.routes.health;
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return http::build_health_response("ok");
    }

    // 4. Assistant home
    if state.home.matches(path) {
        return state
            .home
            .handle(req, &state.config.ai_home.js_callbacks)
            .await;
    }

    http::build_404_response()
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<HttpResponse> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<HttpResponse> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_check() {
        assert!(check_http_method(&Method::GET, false).is_none());
        assert!(check_http_method(&Method::HEAD, false).is_none());
        assert_eq!(check_http_method(&Method::OPTIONS, false).unwrap().status(), 204);
        assert_eq!(check_http_method(&Method::POST, false).unwrap().status(), 405);
        assert_eq!(check_http_method(&Method::DELETE, true).unwrap().status(), 405);
    }

    #[test]
    fn test_cors_preflight_headers() {
        let resp = check_http_method(&Method::OPTIONS, true).unwrap();
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
    }

    #[test]
    fn test_body_size_check() {
        let req = |len: &str| {
            Request::builder()
                .header("content-length", len)
                .body(())
                .unwrap()
        };
        assert!(check_body_size(&req("10"), 100).is_none());
        assert_eq!(check_body_size(&req("101"), 100).unwrap().status(), 413);
        assert!(check_body_size(&req("lots"), 100).is_none());
        assert!(check_body_size(&Request::new(()), 100).is_none());
    }
}
