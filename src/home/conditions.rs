//! Request headers consulted when populating a home response

use hyper::{Method, Request};

/// Conditional and partial request information taken from the request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConditions {
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range: Option<String>,
}

impl RequestConditions {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            is_head: req.method() == Method::HEAD,
            if_none_match: header("if-none-match"),
            if_modified_since: header("if-modified-since"),
            range: header("range"),
        }
    }
}
