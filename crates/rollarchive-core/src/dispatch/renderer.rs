use async_trait::async_trait;

use crate::state::{ArchiveQuery, PaginationState};
use crate::Result;

/// Produces archive markup; the navigation core treats its output as opaque
#[async_trait]
pub trait ContentRenderer: Send + Sync {
    /// Listing markup for one page of the filtered archive
    async fn render_fragment(&self, query: &ArchiveQuery, page: u32) -> Result<String>;

    /// Pagination state for the filtered archive positioned at `page`
    async fn pagination_state(&self, query: &ArchiveQuery, page: u32) -> Result<PaginationState>;

    /// Complete document for a normal (non-fragment) request
    async fn render_page(
        &self,
        query: &ArchiveQuery,
        page: u32,
        state: &PaginationState,
    ) -> Result<String>;
}
