//! Assistant home page module
//!
//! Serves the embedded UI entry point under `/ai/doc/home/`: the rendered
//! root document and the static assets next to it.

pub mod conditions;
pub mod path;
pub mod responder;
pub mod router;

// Re-export main entry points
pub use conditions::RequestConditions;
pub use path::PathRejection;
pub use responder::{FileRenderer, FileSender, FsResponder};
pub use router::{HomeRouter, HomeTarget, JS_CALLBACKS_VAR};
