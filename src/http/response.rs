//! HTTP response building module
//!
//! Builders for the status codes the home server produces.

use super::cache::CachePolicy;
use super::range::ByteRange;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::Response;

pub type HttpResponse = Response<Full<Bytes>>;

/// Representation metadata shared by 200 and 206 responses
#[derive(Debug, Clone)]
pub struct BodyMeta<'a> {
    pub content_type: &'a str,
    pub policy: CachePolicy,
    /// Only sent for cacheable responses
    pub etag: Option<&'a str>,
    /// Only sent for cacheable responses
    pub last_modified: Option<&'a str>,
    pub is_head: bool,
}

impl BodyMeta<'_> {
    fn headers(&self, builder: Builder) -> Builder {
        let mut builder = self
            .policy
            .apply(builder)
            .header("Content-Type", self.content_type)
            .header("Accept-Ranges", "bytes");
        if self.policy.is_cacheable() {
            if let Some(etag) = self.etag {
                builder = builder.header("ETag", etag);
            }
            if let Some(last_modified) = self.last_modified {
                builder = builder.header("Last-Modified", last_modified);
            }
        }
        builder
    }
}

/// Build 200 OK with the whole body
pub fn build_body_response(data: Bytes, meta: &BodyMeta<'_>) -> HttpResponse {
    let content_length = data.len();
    let body = if meta.is_head { Bytes::new() } else { data };

    meta.headers(Response::builder().status(200))
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 Partial Content for a single range of `data`
pub fn build_partial_response(data: &Bytes, range: &ByteRange, meta: &BodyMeta<'_>) -> HttpResponse {
    let body = if meta.is_head {
        Bytes::new()
    } else {
        data.slice(range.bounds())
    };

    meta.headers(Response::builder().status(206))
        .header("Content-Length", range.byte_count())
        .header("Content-Range", range.content_range(data.len()))
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, policy: CachePolicy) -> HttpResponse {
    policy
        .apply(Response::builder().status(304))
        .header("ETag", etag)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> HttpResponse {
    build_text_response(404, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> HttpResponse {
    let mut builder = Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS");

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type, Range")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> HttpResponse {
    build_text_response(413, "413 Payload Too Large")
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(total_size: usize) -> HttpResponse {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{total_size}"))
        .body(Full::new(Bytes::from("416 Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> HttpResponse {
    build_text_response(500, "500 Internal Server Error")
}

/// Build health check response
pub fn build_health_response(status: &str) -> HttpResponse {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache")
        .body(Full::new(Bytes::from(status.to_string())))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn build_text_response(status: u16, text: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(text, &e);
            Response::new(Full::new(Bytes::from_static(text.as_bytes())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
