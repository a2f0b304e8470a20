//! Resource request router for the assistant home page
//!
//! Requests under the home prefix either name the root document, which is
//! rendered with the caller's callback registrations and never cached, or a
//! static asset under the resource directory, which is sent cacheable.

use std::path::{Path, PathBuf};

use hyper::Request;

use super::conditions::RequestConditions;
use super::path::{path_after_prefix, sanitize_relative, PathRejection};
use super::responder::{FileRenderer, FileSender, FsResponder};
use crate::config::AiHomeConfig;
use crate::http::{self, CachePolicy, HttpResponse};
use crate::logger;
use crate::template::TemplateFilter;

/// Template variable carrying the serialized callback registrations
pub const JS_CALLBACKS_VAR: &str = "js_callbacks";

/// Where a home request path leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeTarget {
    /// Root document, rendered through the template filter
    Template(PathBuf),
    /// Static asset, sent as-is
    Asset(PathBuf),
    /// Path cannot be served from the resource directory
    Rejected(PathRejection),
}

#[derive(Debug, Clone)]
pub struct HomeRouter<S = FsResponder> {
    prefix: String,
    resource_base: PathBuf,
    index_file: String,
    asset_policy: CachePolicy,
    responder: S,
}

impl HomeRouter<FsResponder> {
    /// Router serving from the local file system
    pub fn from_config(config: &AiHomeConfig) -> Self {
        Self::new(config, FsResponder)
    }
}

impl<S> HomeRouter<S> {
    pub fn new(config: &AiHomeConfig, responder: S) -> Self {
        let mut prefix = config.prefix.clone();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            prefix,
            resource_base: config.resource_base(),
            index_file: config.index_file.clone(),
            asset_policy: CachePolicy::Public(config.asset_max_age),
            responder,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn resource_base(&self) -> &Path {
        &self.resource_base
    }

    /// Whether `path` belongs to this router
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix) || self.prefix.strip_suffix('/') == Some(path)
    }

    /// Map a request path to the file it names
    pub fn resolve(&self, path: &str) -> HomeTarget {
        let relative = match path_after_prefix(path, &self.prefix) {
            Ok(relative) => relative,
            Err(reason) => return HomeTarget::Rejected(reason),
        };

        if relative.is_empty() {
            return HomeTarget::Template(self.resource_base.join(&self.index_file));
        }

        match sanitize_relative(&relative) {
            Ok(clean) => HomeTarget::Asset(self.resource_base.join(clean)),
            Err(reason) => HomeTarget::Rejected(reason),
        }
    }
}

impl<S: FileRenderer + FileSender> HomeRouter<S> {
    /// Serve a home request
    ///
    /// `callback_data` is substituted verbatim for `#js_callbacks#` in the
    /// root document.
    pub async fn handle<B>(&self, req: &Request<B>, callback_data: &str) -> HttpResponse {
        let conditions = RequestConditions::from_request(req);
        let path = req.uri().path();

        match self.resolve(path) {
            HomeTarget::Template(index) => {
                logger::log_debug(&format!("Rendering home template {}", index.display()));
                let filter = TemplateFilter::with_variable(JS_CALLBACKS_VAR, callback_data);
                self.responder
                    .render_file(&index, &conditions, &filter, CachePolicy::NoCache)
                    .await
            }
            HomeTarget::Asset(file) => {
                logger::log_debug(&format!("Sending home asset {}", file.display()));
                self.responder
                    .send_file(&file, &conditions, self.asset_policy)
                    .await
            }
            HomeTarget::Rejected(reason) => {
                logger::log_warning(&format!("Home request rejected: {path} ({reason})"));
                http::build_404_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::Response;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Render {
            path: PathBuf,
            rendered: String,
            policy: CachePolicy,
        },
        Send {
            path: PathBuf,
            policy: CachePolicy,
            conditions: RequestConditions,
        },
    }

    /// Records calls instead of touching the file system
    #[derive(Default)]
    struct RecordingResponder {
        template: String,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingResponder {
        fn with_template(template: &str) -> Self {
            Self {
                template: template.to_string(),
                calls: Mutex::default(),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FileRenderer for RecordingResponder {
        async fn render_file(
            &self,
            path: &Path,
            _conditions: &RequestConditions,
            filter: &TemplateFilter,
            policy: CachePolicy,
        ) -> HttpResponse {
            let rendered = filter.apply(&self.template).unwrap();
            self.calls.lock().unwrap().push(Call::Render {
                path: path.to_path_buf(),
                rendered: rendered.clone(),
                policy,
            });
            Response::new(Full::new(Bytes::from(rendered)))
        }
    }

    impl FileSender for RecordingResponder {
        async fn send_file(
            &self,
            path: &Path,
            conditions: &RequestConditions,
            policy: CachePolicy,
        ) -> HttpResponse {
            self.calls.lock().unwrap().push(Call::Send {
                path: path.to_path_buf(),
                policy,
                conditions: conditions.clone(),
            });
            Response::new(Full::new(Bytes::new()))
        }
    }

    fn config() -> AiHomeConfig {
        AiHomeConfig {
            resources_path: PathBuf::from("/srv/resources"),
            asset_max_age: 120,
            ..AiHomeConfig::default()
        }
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[test]
    fn test_resolve_root_and_boundary() {
        let router = HomeRouter::from_config(&config());
        let index = PathBuf::from("/srv/resources/ai_resources/index.htm");
        assert_eq!(router.resolve("/ai/doc/home/"), HomeTarget::Template(index.clone()));
        assert_eq!(router.resolve("/ai/doc/home"), HomeTarget::Template(index));
    }

    #[test]
    fn test_resolve_asset() {
        let router = HomeRouter::from_config(&config());
        assert_eq!(
            router.resolve("/ai/doc/home/styles/app.css"),
            HomeTarget::Asset(PathBuf::from("/srv/resources/ai_resources/styles/app.css"))
        );
    }

    #[test]
    fn test_resolve_rejections() {
        let router = HomeRouter::from_config(&config());
        assert_eq!(
            router.resolve("/ai/doc/home/../../etc/passwd"),
            HomeTarget::Rejected(PathRejection::Traversal)
        );
        assert_eq!(
            router.resolve("/ai/doc/home/%2e%2e/secret"),
            HomeTarget::Rejected(PathRejection::Traversal)
        );
        assert_eq!(
            router.resolve("/other/path"),
            HomeTarget::Rejected(PathRejection::NotUnderPrefix)
        );
    }

    #[test]
    fn test_matches() {
        let router = HomeRouter::from_config(&config());
        assert_eq!(router.prefix(), "/ai/doc/home/");
        assert!(router.matches("/ai/doc/home/"));
        assert!(router.matches("/ai/doc/home"));
        assert!(router.matches("/ai/doc/home/app.js"));
        assert!(!router.matches("/ai/doc/homework"));
        assert!(!router.matches("/"));
    }

    #[test]
    fn test_prefix_without_trailing_slash_is_normalised() {
        let router = HomeRouter::from_config(&AiHomeConfig {
            prefix: "/ai/doc/home".to_string(),
            ..config()
        });
        assert_eq!(router.prefix(), "/ai/doc/home/");
        assert!(!router.matches("/ai/doc/homework"));
        assert_eq!(
            router.resolve("/ai/doc/homework"),
            HomeTarget::Rejected(PathRejection::NotUnderPrefix)
        );
        assert_eq!(
            router.resolve("/ai/doc/home"),
            HomeTarget::Template(PathBuf::from("/srv/resources/ai_resources/index.htm"))
        );
    }

    #[tokio::test]
    async fn test_root_renders_template_without_cache() {
        let router = HomeRouter::new(
            &config(),
            RecordingResponder::with_template("<script>init(#js_callbacks#);</script>"),
        );
        router.handle(&get("/ai/doc/home/"), "cb123").await;

        assert_eq!(
            router.responder.calls(),
            vec![Call::Render {
                path: PathBuf::from("/srv/resources/ai_resources/index.htm"),
                rendered: "<script>init(cb123);</script>".to_string(),
                policy: CachePolicy::NoCache,
            }]
        );
    }

    #[tokio::test]
    async fn test_asset_sent_cacheable_with_conditions() {
        let router = HomeRouter::new(&config(), RecordingResponder::default());
        let req = Request::builder()
            .uri("/ai/doc/home/js/app.js?v=2")
            .header("Range", "bytes=0-1")
            .body(())
            .unwrap();
        router.handle(&req, "ignored").await;

        let calls = router.responder.calls();
        assert_eq!(calls.len(), 1);
        let Call::Send { path, policy, conditions } = &calls[0] else {
            panic!("expected a file send, got {calls:?}");
        };
        assert_eq!(path, &PathBuf::from("/srv/resources/ai_resources/js/app.js"));
        assert_eq!(*policy, CachePolicy::Public(120));
        assert_eq!(conditions.range.as_deref(), Some("bytes=0-1"));
    }

    #[tokio::test]
    async fn test_rejected_path_never_reaches_responder() {
        let router = HomeRouter::new(&config(), RecordingResponder::default());
        let resp = router.handle(&get("/ai/doc/home/a/../../b"), "cb").await;
        assert_eq!(resp.status(), 404);
        assert!(router.responder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_root_rendering_is_idempotent() {
        let router = HomeRouter::new(
            &config(),
            RecordingResponder::with_template("#js_callbacks#|#js_callbacks#"),
        );
        router.handle(&get("/ai/doc/home/"), "cb").await;
        router.handle(&get("/ai/doc/home"), "cb").await;

        let calls = router.responder.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }
}
