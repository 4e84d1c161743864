pub mod browse;
pub mod init;
pub mod page;
pub mod serve;

use rollarchive_core::protocol::SEARCH_PARAM;
use rollarchive_core::ArchiveQuery;

/// Archive query for an optional search term
pub fn search_query(search: Option<&str>) -> ArchiveQuery {
    let mut query = ArchiveQuery::new();
    if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
        query.insert(SEARCH_PARAM.to_string(), term.to_string());
    }
    query
}
