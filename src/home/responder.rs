//! File-serving collaborators of the home router
//!
//! The router only decides *what* to send. [`FileRenderer`] and
//! [`FileSender`] populate the response, and [`FsResponder`] implements both
//! on top of `tokio::fs`.

use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

use hyper::body::Bytes;
use tokio::fs;

use super::conditions::RequestConditions;
use crate::http::cache::{self, CachePolicy};
use crate::http::range::{parse_range_header, RangeParseResult};
use crate::http::response::{
    build_304_response, build_404_response, build_416_response, build_500_response,
    build_body_response, build_partial_response, BodyMeta, HttpResponse,
};
use crate::http::mime;
use crate::logger;
use crate::template::TemplateFilter;

/// Send a file after passing its text through a template filter
#[allow(async_fn_in_trait)]
pub trait FileRenderer {
    async fn render_file(
        &self,
        path: &Path,
        conditions: &RequestConditions,
        filter: &TemplateFilter,
        policy: CachePolicy,
    ) -> HttpResponse;
}

/// Send a file as-is
#[allow(async_fn_in_trait)]
pub trait FileSender {
    async fn send_file(
        &self,
        path: &Path,
        conditions: &RequestConditions,
        policy: CachePolicy,
    ) -> HttpResponse;
}

/// Responder reading from the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResponder;

/// File contents plus modification time
struct LoadedFile {
    data: Bytes,
    modified: Option<SystemTime>,
}

impl FileRenderer for FsResponder {
    async fn render_file(
        &self,
        path: &Path,
        conditions: &RequestConditions,
        filter: &TemplateFilter,
        policy: CachePolicy,
    ) -> HttpResponse {
        let file = match load_file(path).await {
            Ok(file) => file,
            Err(resp) => return resp,
        };

        match filter.apply_bytes(&file.data) {
            Ok(rendered) => respond(
                Bytes::from(rendered),
                file.modified,
                mime::content_type_for(path),
                conditions,
                policy,
            ),
            Err(e) => {
                logger::log_error(&format!("Failed to render '{}': {e}", path.display()));
                build_500_response()
            }
        }
    }
}

impl FileSender for FsResponder {
    async fn send_file(
        &self,
        path: &Path,
        conditions: &RequestConditions,
        policy: CachePolicy,
    ) -> HttpResponse {
        match load_file(path).await {
            Ok(file) => respond(
                file.data,
                file.modified,
                mime::content_type_for(path),
                conditions,
                policy,
            ),
            Err(resp) => resp,
        }
    }
}

/// Read a regular file, mapping failures to the response to send instead
async fn load_file(path: &Path) -> Result<LoadedFile, HttpResponse> {
    let metadata = match fs::metadata(path).await {
        Ok(m) if m.is_file() => m,
        // Directories are not served
        Ok(_) => return Err(build_404_response()),
        Err(e) => return Err(io_failure(path, &e)),
    };

    match fs::read(path).await {
        Ok(data) => Ok(LoadedFile {
            data: Bytes::from(data),
            modified: metadata.modified().ok(),
        }),
        Err(e) => Err(io_failure(path, &e)),
    }
}

fn io_failure(path: &Path, err: &std::io::Error) -> HttpResponse {
    // Missing files are common (404), no need to log at warning level
    if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) {
        logger::log_debug(&format!("Home resource not found: {}", path.display()));
        return build_404_response();
    }
    logger::log_error(&format!("Failed to read file '{}': {err}", path.display()));
    build_500_response()
}

/// Build the response for a loaded body under `policy`
fn respond(
    data: Bytes,
    modified: Option<SystemTime>,
    content_type: &str,
    conditions: &RequestConditions,
    policy: CachePolicy,
) -> HttpResponse {
    let etag = policy.is_cacheable().then(|| cache::generate_etag(&data));
    let last_modified = modified
        .filter(|_| policy.is_cacheable())
        .map(cache::format_http_date);

    if let Some(etag) = etag.as_deref() {
        // If-None-Match takes precedence over If-Modified-Since
        let fresh = if conditions.if_none_match.is_some() {
            cache::check_etag_match(conditions.if_none_match.as_deref(), etag)
        } else {
            modified.is_some_and(|m| {
                cache::not_modified_since(conditions.if_modified_since.as_deref(), m)
            })
        };
        if fresh {
            return build_304_response(etag, policy);
        }
    }

    let meta = BodyMeta {
        content_type,
        policy,
        etag: etag.as_deref(),
        last_modified: last_modified.as_deref(),
        is_head: conditions.is_head,
    };

    match parse_range_header(conditions.range.as_deref(), data.len()) {
        RangeParseResult::Valid(range) => build_partial_response(&data, &range, &meta),
        RangeParseResult::NotSatisfiable => build_416_response(data.len()),
        RangeParseResult::None => build_body_response(data, &meta),
    }
}
