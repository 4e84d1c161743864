//! Server-side request pipeline
//!
//! Incoming archive requests run through an ordered chain of hooks before
//! full-page rendering. The fragment dispatcher sits ahead of the canonical
//! redirect so that pagination requests are answered before any redirect
//! could fire.

mod canonical;
mod dispatcher;
mod renderer;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use tracing::debug;
use url::form_urlencoded;

use crate::state::ArchiveQuery;
use crate::Result;

pub use canonical::CanonicalRedirect;
pub use dispatcher::RequestDispatcher;
pub use renderer::ContentRenderer;

/// Priority hooks get unless registered otherwise
pub const DEFAULT_PRIORITY: i32 = 10;

/// An archive request as seen by the hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub path: String,
    /// Query pairs in their original order
    pub pairs: Vec<(String, String)>,
}

impl ArchiveRequest {
    pub fn new(path: impl Into<String>, raw_query: Option<&str>) -> Self {
        let pairs = raw_query
            .map(|raw| {
                form_urlencoded::parse(raw.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            path: path.into(),
            pairs,
        }
    }

    /// Query as a map; later duplicates win
    pub fn query(&self) -> ArchiveQuery {
        self.pairs.iter().cloned().collect()
    }

    /// Path plus encoded query, as it would appear in a Location header
    pub fn url_with(&self, path: &str, pairs: &[(String, String)]) -> String {
        if pairs.is_empty() {
            return path.to_string();
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
        format!("{}?{}", path, serializer.finish())
    }
}

/// A response produced by a hook, terminating the pipeline
#[derive(Debug, Clone)]
pub struct DispatchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl DispatchResponse {
    pub fn html(content_type: &str, body: String) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }
        Self {
            status: StatusCode::OK,
            headers,
            body,
        }
    }

    pub fn redirect(location: &str) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(location) {
            headers.insert(header::LOCATION, value);
        }
        Self {
            status: StatusCode::MOVED_PERMANENTLY,
            headers,
            body: String::new(),
        }
    }
}

/// What a hook decided about a request
#[derive(Debug, Clone)]
pub enum HookOutcome {
    /// Let the next hook (or full-page rendering) handle it
    Continue,
    /// Answer now and stop the pipeline
    Respond(DispatchResponse),
}

/// One step of the request pipeline
#[async_trait]
pub trait TemplateHook: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, request: &ArchiveRequest) -> Result<HookOutcome>;
}

struct HookEntry {
    priority: i32,
    hook: Arc<dyn TemplateHook>,
}

/// Hooks ordered by priority; equal priorities keep registration order
#[derive(Default)]
pub struct HookChain {
    entries: Vec<HookEntry>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, hook: Arc<dyn TemplateHook>) {
        self.add_with_priority(hook, DEFAULT_PRIORITY);
    }

    pub fn add_with_priority(&mut self, hook: Arc<dyn TemplateHook>, priority: i32) {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.priority > priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, HookEntry { priority, hook });
    }

    /// Move a registered hook to another priority; false if it is not registered
    pub fn reprioritize(&mut self, name: &str, priority: i32) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.hook.name() == name) else {
            return false;
        };
        let entry = self.entries.remove(index);
        self.add_with_priority(entry.hook, priority);
        true
    }

    /// Hook names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.hook.name()).collect()
    }

    /// Run hooks in order until one responds
    pub async fn run(&self, request: &ArchiveRequest) -> Result<Option<DispatchResponse>> {
        for entry in &self.entries {
            match entry.hook.handle(request).await? {
                HookOutcome::Continue => continue,
                HookOutcome::Respond(response) => {
                    debug!("{} answered {}", entry.hook.name(), request.path);
                    return Ok(Some(response));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, bool);

    #[async_trait]
    impl TemplateHook for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn handle(&self, _request: &ArchiveRequest) -> Result<HookOutcome> {
            if self.1 {
                Ok(HookOutcome::Respond(DispatchResponse::html(
                    "text/html",
                    self.0.to_string(),
                )))
            } else {
                Ok(HookOutcome::Continue)
            }
        }
    }

    #[test]
    fn test_request_parses_query_in_order() {
        let request = ArchiveRequest::new("/", Some("s=hello+world&page=2&s=again"));
        assert_eq!(request.pairs.len(), 3);
        assert_eq!(request.pairs[0], ("s".to_string(), "hello world".to_string()));
        assert_eq!(request.query().get("s").map(String::as_str), Some("again"));
    }

    #[test]
    fn test_chain_orders_by_priority() {
        let mut chain = HookChain::new();
        chain.add(Arc::new(Named("redirect", false)));
        chain.add(Arc::new(Named("dispatch", false)));
        assert_eq!(chain.names(), vec!["redirect", "dispatch"]);

        assert!(chain.reprioritize("redirect", DEFAULT_PRIORITY + 1));
        assert_eq!(chain.names(), vec!["dispatch", "redirect"]);
        assert!(!chain.reprioritize("missing", 1));
    }

    #[tokio::test]
    async fn test_first_response_wins() {
        let mut chain = HookChain::new();
        chain.add(Arc::new(Named("pass", false)));
        chain.add(Arc::new(Named("first", true)));
        chain.add(Arc::new(Named("second", true)));

        let request = ArchiveRequest::new("/", None);
        let response = chain.run(&request).await.unwrap().unwrap();
        assert_eq!(response.body, "first");
    }

    #[tokio::test]
    async fn test_empty_chain_falls_through() {
        let chain = HookChain::new();
        let request = ArchiveRequest::new("/", None);
        assert!(chain.run(&request).await.unwrap().is_none());
    }
}
