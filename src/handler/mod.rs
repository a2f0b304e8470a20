//! Request handler module
//!
//! Responsible for request validation and dispatch to the home router.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
