//! Prefix stripping and relative path resolution

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Why a request path cannot be mapped under the resource base
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathRejection {
    #[error("path is outside the home prefix")]
    NotUnderPrefix,
    #[error("path is not valid percent-encoded UTF-8")]
    InvalidEncoding,
    #[error("path contains a NUL byte")]
    NulByte,
    #[error("path is absolute")]
    Absolute,
    #[error("path escapes the resource directory")]
    Traversal,
}

/// Return the part of `path` following `prefix`, percent-decoded
///
/// The prefix without its trailing slash (`/ai/doc/home` for
/// `/ai/doc/home/`) yields an empty remainder.
pub fn path_after_prefix(path: &str, prefix: &str) -> Result<String, PathRejection> {
    let remainder = match path.strip_prefix(prefix) {
        Some(rest) => rest,
        None if prefix.strip_suffix('/') == Some(path) => "",
        None => return Err(PathRejection::NotUnderPrefix),
    };
    urlencoding::decode(remainder)
        .map(Cow::into_owned)
        .map_err(|_| PathRejection::InvalidEncoding)
}

/// Turn a decoded relative path into a path that stays under its base
///
/// Empty and `.` segments are dropped; `..`, rooted paths and NUL bytes are
/// rejected.
pub fn sanitize_relative(relative: &str) -> Result<PathBuf, PathRejection> {
    if relative.contains('\0') {
        return Err(PathRejection::NulByte);
    }
    if relative.starts_with(['/', '\\']) {
        return Err(PathRejection::Absolute);
    }

    let mut clean = PathBuf::new();
    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Err(PathRejection::Traversal),
            _ => {
                // Drive letters and other prefixes on platforms that have them
                if !matches!(Path::new(segment).components().next(), Some(Component::Normal(_))) {
                    return Err(PathRejection::Absolute);
                }
                clean.push(segment);
            }
        }
    }
    Ok(clean)
}
