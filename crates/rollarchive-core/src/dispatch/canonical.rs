use async_trait::async_trait;
use tracing::debug;

use super::{ArchiveRequest, DispatchResponse, HookOutcome, TemplateHook};
use crate::protocol::{DYNAMIC_PARAM, PAGE_PARAM};
use crate::Result;

/// Redirects archive URLs to their canonical form
///
/// Directory-like paths gain a trailing slash and an explicit first page is
/// dropped from the query. A redirect that would still carry the fragment
/// flag is never issued.
#[derive(Debug, Default)]
pub struct CanonicalRedirect;

impl CanonicalRedirect {
    pub const NAME: &'static str = "canonical_redirect";

    pub fn new() -> Self {
        Self
    }

    /// Canonical location for a request, or `None` if it already is canonical
    pub fn canonical_location(request: &ArchiveRequest) -> Option<String> {
        let path = canonical_path(&request.path);
        let pairs: Vec<(String, String)> = request
            .pairs
            .iter()
            .filter(|(key, value)| !(key == PAGE_PARAM && value == "1"))
            .cloned()
            .collect();

        if path == request.path && pairs.len() == request.pairs.len() {
            return None;
        }
        Some(request.url_with(&path, &pairs))
    }
}

fn canonical_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    if path.ends_with('/') {
        return path.to_string();
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    if last.contains('.') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

#[async_trait]
impl TemplateHook for CanonicalRedirect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn handle(&self, request: &ArchiveRequest) -> Result<HookOutcome> {
        let Some(location) = Self::canonical_location(request) else {
            return Ok(HookOutcome::Continue);
        };
        if location.contains(&format!("{}=", DYNAMIC_PARAM)) {
            debug!("Suppressed canonical redirect to {}", location);
            return Ok(HookOutcome::Continue);
        }
        debug!("Canonical redirect {} -> {}", request.path, location);
        Ok(HookOutcome::Respond(DispatchResponse::redirect(&location)))
    }
}
