//! HTTP Range request parsing module
//!
//! Single byte-range support (RFC 7233) for home resources.

use std::ops::RangeInclusive;

/// A satisfiable byte range, both ends inclusive and inside the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    /// Number of bytes covered by the range
    pub const fn byte_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Slice bounds into the body
    pub const fn bounds(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// `Content-Range` header value
    pub fn content_range(&self, total_size: usize) -> String {
        format!("bytes {}-{}/{total_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(ByteRange),
    /// Range outside the body - should return 416
    NotSatisfiable,
    /// No Range header or malformed (ignore, return full content)
    None,
}

/// Parse HTTP Range header against a body of `total_size` bytes
///
/// Accepted forms: `bytes=start-end`, `bytes=start-` and `bytes=-suffix`.
/// Multi-range requests and other units are ignored.
///
/// # Examples
/// ```
/// use ai_home::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { start: 0, end: 99 }));
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, total_size: usize) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };

    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        suffix_range(last, total_size)
    } else {
        bounded_range(first, last, total_size)
    }
}

/// `-N`: the last N bytes
fn suffix_range(suffix: &str, total_size: usize) -> RangeParseResult {
    let Ok(suffix) = suffix.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if suffix == 0 || total_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }
    RangeParseResult::Valid(ByteRange {
        start: total_size.saturating_sub(suffix),
        end: total_size - 1,
    })
}

/// `N-` or `N-M`
fn bounded_range(first: &str, last: &str, total_size: usize) -> RangeParseResult {
    let Ok(start) = first.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if start >= total_size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if last.is_empty() {
        total_size - 1
    } else {
        match last.parse::<usize>() {
            Ok(e) => e.min(total_size - 1),
            Err(_) => return RangeParseResult::None,
        }
    };

    if start > end {
        return RangeParseResult::NotSatisfiable;
    }
    RangeParseResult::Valid(ByteRange { start, end })
}
