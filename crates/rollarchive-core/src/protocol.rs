//! Wire names shared by the fragment server and client

use crate::state::ArchiveQuery;

/// Query parameter that selects fragment-only rendering
pub const DYNAMIC_PARAM: &str = "dynamic";
/// Reserved flag value asking for the bootstrap payload as well
pub const DYNAMIC_INIT: &str = "init";
/// Flag value used for ordinary page fetches
pub const DYNAMIC_FRAGMENT: &str = "1";
/// Query parameter carrying the requested page
pub const PAGE_PARAM: &str = "page";
/// Query parameter carrying the search filter
pub const SEARCH_PARAM: &str = "s";

/// What a request carrying the discriminator flag asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicMode {
    /// Listing fragment only
    Fragment,
    /// Listing fragment followed by the bootstrap payload
    Init,
}

impl DynamicMode {
    /// Interpret the flag the way a falsy/truthy check would: absent, empty
    /// and "0" all mean a normal full-page request.
    pub fn from_value(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("0") => None,
            Some(DYNAMIC_INIT) => Some(DynamicMode::Init),
            Some(_) => Some(DynamicMode::Fragment),
        }
    }

    pub fn from_query(query: &ArchiveQuery) -> Option<Self> {
        Self::from_value(query.get(DYNAMIC_PARAM).map(String::as_str))
    }

    pub fn as_value(self) -> &'static str {
        match self {
            DynamicMode::Fragment => DYNAMIC_FRAGMENT,
            DynamicMode::Init => DYNAMIC_INIT,
        }
    }
}

/// Drop transport-only parameters, leaving the archive's filter terms
pub fn filter_terms(query: &ArchiveQuery) -> ArchiveQuery {
    query
        .iter()
        .filter(|(key, _)| key.as_str() != DYNAMIC_PARAM && key.as_str() != PAGE_PARAM)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Requested page, defaulting to 1 for missing or malformed values
pub fn requested_page(query: &ArchiveQuery) -> u32 {
    query
        .get(PAGE_PARAM)
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_truthiness() {
        assert_eq!(DynamicMode::from_value(None), None);
        assert_eq!(DynamicMode::from_value(Some("")), None);
        assert_eq!(DynamicMode::from_value(Some("0")), None);
        assert_eq!(DynamicMode::from_value(Some("1")), Some(DynamicMode::Fragment));
        assert_eq!(DynamicMode::from_value(Some("yes")), Some(DynamicMode::Fragment));
        assert_eq!(DynamicMode::from_value(Some("init")), Some(DynamicMode::Init));
    }

    #[test]
    fn test_filter_terms_strip_transport_params() {
        let query: ArchiveQuery = [
            ("dynamic", "1"),
            ("page", "3"),
            ("s", "rust"),
            ("cat", "news"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let terms = filter_terms(&query);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms.get("s").map(String::as_str), Some("rust"));
        assert_eq!(requested_page(&query), 3);
    }

    #[test]
    fn test_requested_page_defaults() {
        let mut query = ArchiveQuery::new();
        assert_eq!(requested_page(&query), 1);
        query.insert("page".into(), "zero".into());
        assert_eq!(requested_page(&query), 1);
        query.insert("page".into(), "0".into());
        assert_eq!(requested_page(&query), 1);
    }
}
