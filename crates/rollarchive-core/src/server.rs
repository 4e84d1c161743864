//! HTTP front end: runs every request through the hook chain, then falls
//! back to full-page rendering

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::dispatch::{
    ArchiveRequest, CanonicalRedirect, ContentRenderer, DispatchResponse, HookChain,
    RequestDispatcher,
};
use crate::protocol::{filter_terms, requested_page};
use crate::Result;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub struct ArchiveServer {
    chain: HookChain,
    renderer: Arc<dyn ContentRenderer>,
    content_type: String,
}

impl ArchiveServer {
    /// Standard pipeline: canonical redirect plus the fragment dispatcher ahead of it
    pub fn new(renderer: Arc<dyn ContentRenderer>, config: &ServerConfig) -> Self {
        let content_type = config.content_type();
        let mut chain = HookChain::new();
        chain.add(Arc::new(CanonicalRedirect::new()));
        RequestDispatcher::new(renderer.clone(), content_type.clone()).install(&mut chain);
        Self::with_chain(chain, renderer, content_type)
    }

    pub fn with_chain(
        chain: HookChain,
        renderer: Arc<dyn ContentRenderer>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            chain,
            renderer,
            content_type: content_type.into(),
        }
    }

    pub fn router(self) -> Router {
        Router::new()
            .fallback(handle_request)
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::new(self))
    }

    async fn respond(&self, request: &ArchiveRequest) -> Result<Response> {
        if let Some(response) = self.chain.run(request).await? {
            return Ok(into_response(response));
        }

        let terms = filter_terms(&request.query());
        let page = requested_page(&request.query());
        let state = self.renderer.pagination_state(&terms, page).await?;
        // Out-of-range pages are clamped by the state; render what it points at
        let body = self
            .renderer
            .render_page(&terms, state.current_page(), &state)
            .await?;
        Ok(into_response(DispatchResponse::html(&self.content_type, body)))
    }
}

fn into_response(response: DispatchResponse) -> Response {
    (response.status, response.headers, response.body).into_response()
}

async fn handle_request(State(server): State<Arc<ArchiveServer>>, uri: Uri) -> Response {
    let request = ArchiveRequest::new(uri.path(), uri.query());
    match server.respond(&request).await {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to render {}: {}", uri, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=UTF-8")],
                e.to_string(),
            )
                .into_response()
        }
    }
}

/// Serve until Ctrl+C
pub async fn serve(server: ArchiveServer, config: &ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    info!("Archive server listening on http://{}", listener.local_addr()?);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, server.router())
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down archive server");
            let _ = shutdown_tx.send(());
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
                Ok(result) => result?,
                Err(_) => error!("Server shutdown timed out"),
            }
        }
    }

    info!("Archive server stopped");
    Ok(())
}
