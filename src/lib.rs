//! Assistant home server
//!
//! Serves the embedded UI entry point of the in-application assistant:
//! `/ai/doc/home/` renders `index.htm` with the caller's callback
//! registrations injected, and `/ai/doc/home/<path>` returns the static
//! asset at `<resources>/ai_resources/<path>`.

pub mod config;
pub mod error;
pub mod handler;
pub mod home;
pub mod http;
pub mod logger;
pub mod server;
pub mod template;
