//! HTTP protocol layer module
//!
//! Cache validators, range parsing, MIME detection and response builders,
//! independent of how home resources are resolved.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_416_response, build_500_response, build_health_response, build_options_response,
    HttpResponse,
};
