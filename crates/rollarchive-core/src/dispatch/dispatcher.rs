use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{
    ArchiveRequest, ContentRenderer, DispatchResponse, HookChain, HookOutcome, TemplateHook,
    DEFAULT_PRIORITY,
};
use crate::protocol::{filter_terms, requested_page, DynamicMode};
use crate::Result;

/// Answers fragment requests with listing markup only
pub struct RequestDispatcher {
    renderer: Arc<dyn ContentRenderer>,
    content_type: String,
}

impl RequestDispatcher {
    pub const NAME: &'static str = "rolling_archives_dispatch";

    pub fn new(renderer: Arc<dyn ContentRenderer>, content_type: impl Into<String>) -> Self {
        Self {
            renderer,
            content_type: content_type.into(),
        }
    }

    /// Register on a chain and push the canonical redirect behind it
    pub fn install(self, chain: &mut HookChain) {
        chain.add_with_priority(Arc::new(self), DEFAULT_PRIORITY);
        chain.reprioritize(super::CanonicalRedirect::NAME, DEFAULT_PRIORITY + 1);
    }
}

#[async_trait]
impl TemplateHook for RequestDispatcher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn handle(&self, request: &ArchiveRequest) -> Result<HookOutcome> {
        let query = request.query();
        let Some(mode) = DynamicMode::from_query(&query) else {
            return Ok(HookOutcome::Continue);
        };

        let terms = filter_terms(&query);
        let page = requested_page(&query);
        debug!("Fragment request for page {} ({:?})", page, mode);

        let body = match mode {
            DynamicMode::Fragment => self.renderer.render_fragment(&terms, page).await?,
            DynamicMode::Init => {
                // The bootstrap may clamp the page; the markup must match it
                let state = self.renderer.pagination_state(&terms, page).await?;
                let mut body = self
                    .renderer
                    .render_fragment(&terms, state.current_page())
                    .await?;
                body.push_str(&state.to_bootstrap_script()?);
                body
            }
        };

        Ok(HookOutcome::Respond(DispatchResponse::html(
            &self.content_type,
            body,
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::{header, StatusCode};

    use super::*;
    use crate::dispatch::CanonicalRedirect;
    use crate::state::{ArchiveQuery, PaginationState};
    use crate::Error;

    #[derive(Default)]
    struct StubRenderer {
        full_pages: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ContentRenderer for StubRenderer {
        async fn render_fragment(&self, query: &ArchiveQuery, page: u32) -> Result<String> {
            if self.fail {
                return Err(Error::Render("template missing".into()));
            }
            let term = query.get("s").cloned().unwrap_or_default();
            Ok(format!("<article class=\"post\">page {} {}</article>", page, term))
        }

        async fn pagination_state(&self, query: &ArchiveQuery, page: u32) -> Result<PaginationState> {
            PaginationState::new(
                page.clamp(1, 3),
                3,
                query.clone(),
                vec!["a".into(), "b".into(), "c".into()],
            )
        }

        async fn render_page(
            &self,
            _query: &ArchiveQuery,
            _page: u32,
            _state: &PaginationState,
        ) -> Result<String> {
            self.full_pages.fetch_add(1, Ordering::SeqCst);
            Ok("<html></html>".into())
        }
    }

    fn chain_with(renderer: Arc<StubRenderer>) -> HookChain {
        let mut chain = HookChain::new();
        chain.add(Arc::new(CanonicalRedirect::new()));
        RequestDispatcher::new(renderer, "text/html; charset=UTF-8").install(&mut chain);
        chain
    }

    #[tokio::test]
    async fn test_unflagged_request_continues() {
        let chain = chain_with(Arc::new(StubRenderer::default()));
        let request = ArchiveRequest::new("/", Some("s=rust"));
        assert!(chain.run(&request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fragment_request_returns_fragment_only() {
        let chain = chain_with(Arc::new(StubRenderer::default()));
        let request = ArchiveRequest::new("/", Some("s=rust&page=2&dynamic=1"));

        let response = chain.run(&request).await.unwrap().unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=UTF-8"
        );
        assert_eq!(response.body, "<article class=\"post\">page 2 rust</article>");
    }

    #[tokio::test]
    async fn test_init_request_appends_bootstrap() {
        let chain = chain_with(Arc::new(StubRenderer::default()));
        let request = ArchiveRequest::new("/", Some("dynamic=init"));

        let response = chain.run(&request).await.unwrap().unwrap();
        let state = PaginationState::from_bootstrap_html(&response.body)
            .unwrap()
            .unwrap();
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.page_count(), 3);
        assert!(state.query().is_empty());
    }

    #[tokio::test]
    async fn test_init_request_past_last_page_renders_clamped_page() {
        let chain = chain_with(Arc::new(StubRenderer::default()));
        let request = ArchiveRequest::new("/", Some("page=9&dynamic=init"));

        let response = chain.run(&request).await.unwrap().unwrap();
        assert!(response.body.starts_with("<article class=\"post\">page 3 </article>"));
        let state = PaginationState::from_bootstrap_html(&response.body)
            .unwrap()
            .unwrap();
        assert_eq!(state.current_page(), 3);
    }

    #[tokio::test]
    async fn test_dispatcher_runs_before_canonical_redirect() {
        let chain = chain_with(Arc::new(StubRenderer::default()));
        assert_eq!(
            chain.names(),
            vec![RequestDispatcher::NAME, CanonicalRedirect::NAME]
        );

        // Without the flag, the same non-canonical URL would redirect
        let request = ArchiveRequest::new("/archive", Some("page=1&dynamic=1"));
        let response = chain.run(&request).await.unwrap().unwrap();
        assert_eq!(response.status, StatusCode::OK);

        let request = ArchiveRequest::new("/archive", Some("page=1"));
        let response = chain.run(&request).await.unwrap().unwrap();
        assert_eq!(response.status, StatusCode::MOVED_PERMANENTLY);
    }

    #[tokio::test]
    async fn test_renderer_failure_propagates() {
        let renderer = Arc::new(StubRenderer {
            fail: true,
            ..Default::default()
        });
        let chain = chain_with(renderer);
        let request = ArchiveRequest::new("/", Some("dynamic=1"));
        assert!(matches!(
            chain.run(&request).await,
            Err(Error::Render(_))
        ));
    }
}
