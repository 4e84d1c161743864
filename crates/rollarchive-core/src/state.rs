//! Pagination state shared by the server and the navigation controller
//!
//! A `PaginationState` is never mutated in place: every transition builds a
//! new value so that page number, page count and labels always agree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Filter parameters of an archive listing, passed through untouched
pub type ArchiveQuery = BTreeMap<String, String>;

/// Element id of the inline bootstrap payload
pub const BOOTSTRAP_ELEMENT_ID: &str = "rolling-archives-state";

/// Where a page sits in the archive, used for navigation chrome flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePosition {
    OnlyPage,
    First,
    Nth,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPaginationState")]
pub struct PaginationState {
    current_page: u32,
    page_count: u32,
    #[serde(default)]
    query: ArchiveQuery,
    #[serde(default)]
    page_date_labels: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPaginationState {
    current_page: u32,
    page_count: u32,
    #[serde(default)]
    query: ArchiveQuery,
    #[serde(default)]
    page_date_labels: Vec<String>,
}

impl TryFrom<RawPaginationState> for PaginationState {
    type Error = Error;

    fn try_from(raw: RawPaginationState) -> Result<Self> {
        Self::new(raw.current_page, raw.page_count, raw.query, raw.page_date_labels)
    }
}

impl PaginationState {
    /// Build a validated state
    pub fn new(
        current_page: u32,
        page_count: u32,
        query: ArchiveQuery,
        page_date_labels: Vec<String>,
    ) -> Result<Self> {
        if page_date_labels.len() != page_count as usize {
            return Err(Error::InvalidState(format!(
                "{} date labels for {} pages",
                page_date_labels.len(),
                page_count
            )));
        }
        if current_page < 1 {
            return Err(Error::InvalidState("current page must be at least 1".into()));
        }
        if page_count > 0 && current_page > page_count {
            return Err(Error::InvalidState(format!(
                "current page {} outside 1..={}",
                current_page, page_count
            )));
        }

        Ok(Self {
            current_page,
            page_count,
            query,
            page_date_labels,
        })
    }

    /// State of an archive with nothing to page through
    pub fn empty(query: ArchiveQuery) -> Self {
        Self {
            current_page: 1,
            page_count: 0,
            query,
            page_date_labels: Vec::new(),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn query(&self) -> &ArchiveQuery {
        &self.query
    }

    pub fn page_date_labels(&self) -> &[String] {
        &self.page_date_labels
    }

    /// Single-page and empty archives never show paging UI
    pub fn is_paginated(&self) -> bool {
        self.page_count > 1
    }

    /// Whether the listing is narrowed by any filter term
    pub fn has_filter(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn date_label(&self, page: u32) -> Option<&str> {
        let index = page.checked_sub(1)? as usize;
        self.page_date_labels.get(index).map(String::as_str)
    }

    /// Slider value for the current page; the slider runs newest-last
    pub fn slider_value(&self) -> u32 {
        self.slider_value_for(self.current_page)
    }

    pub fn slider_value_for(&self, page: u32) -> u32 {
        (self.page_count + 1).saturating_sub(page)
    }

    /// Inverse of `slider_value_for`
    pub fn page_for_slider(&self, value: u32) -> u32 {
        (self.page_count + 1).saturating_sub(value)
    }

    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.page_count
    }

    /// Clamp a page into range; `None` when the archive is not paginated
    pub fn clamp_page(&self, page: i64) -> Option<u32> {
        if !self.is_paginated() {
            return None;
        }
        Some(page.clamp(1, self.page_count as i64) as u32)
    }

    pub fn position(&self, page: u32) -> PagePosition {
        if !self.is_paginated() {
            PagePosition::OnlyPage
        } else if page >= self.page_count {
            PagePosition::Last
        } else if page <= 1 {
            PagePosition::First
        } else {
            PagePosition::Nth
        }
    }

    /// A new state on another page of the same archive
    pub fn with_page(&self, page: u32) -> Result<Self> {
        Self::new(
            page,
            self.page_count,
            self.query.clone(),
            self.page_date_labels.clone(),
        )
    }

    /// Render the inline payload consumed once by the client on first load
    pub fn to_bootstrap_script(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        // Keep the payload from terminating its own script element
        let json = json.replace("</", "<\\/");
        Ok(format!(
            "<script type=\"application/json\" id=\"{}\">{}</script>",
            BOOTSTRAP_ELEMENT_ID, json
        ))
    }

    /// Find and parse a bootstrap payload inside an HTML document or fragment
    pub fn from_bootstrap_html(html: &str) -> Result<Option<Self>> {
        let marker = format!("id=\"{}\">", BOOTSTRAP_ELEMENT_ID);
        let Some(start) = html.find(&marker) else {
            return Ok(None);
        };
        let body = &html[start + marker.len()..];
        let end = body.find("</script>").ok_or(Error::MissingBootstrap)?;
        Ok(Some(serde_json::from_str(&body[..end])?))
    }

    /// Remove any bootstrap payload, leaving only listing markup
    pub fn strip_bootstrap(html: &str) -> String {
        let marker = format!(
            "<script type=\"application/json\" id=\"{}\">",
            BOOTSTRAP_ELEMENT_ID
        );
        let Some(start) = html.find(&marker) else {
            return html.to_string();
        };
        match html[start..].find("</script>") {
            Some(len) => {
                let end = start + len + "</script>".len();
                format!("{}{}", &html[..start], &html[end..])
            }
            None => html[..start].to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Month {}", i)).collect()
    }

    #[test]
    fn test_rejects_mismatched_labels() {
        let err = PaginationState::new(1, 3, ArchiveQuery::new(), labels(2)).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[test]
    fn test_rejects_out_of_range_page() {
        assert!(PaginationState::new(4, 3, ArchiveQuery::new(), labels(3)).is_err());
        assert!(PaginationState::new(0, 3, ArchiveQuery::new(), labels(3)).is_err());
    }

    #[test]
    fn test_slider_mapping_is_inverted() {
        let state = PaginationState::new(2, 5, ArchiveQuery::new(), labels(5)).unwrap();
        assert_eq!(state.slider_value(), 4);
        assert_eq!(state.page_for_slider(4), 2);
        assert_eq!(state.page_for_slider(5), 1);
        assert_eq!(state.page_for_slider(1), 5);
    }

    #[test]
    fn test_position_flags() {
        let state = PaginationState::new(1, 3, ArchiveQuery::new(), labels(3)).unwrap();
        assert_eq!(state.position(1), PagePosition::First);
        assert_eq!(state.position(2), PagePosition::Nth);
        assert_eq!(state.position(3), PagePosition::Last);

        let single = PaginationState::new(1, 1, ArchiveQuery::new(), labels(1)).unwrap();
        assert_eq!(single.position(1), PagePosition::OnlyPage);
        assert_eq!(single.clamp_page(2), None);
    }

    #[test]
    fn test_date_label_lookup() {
        let state = PaginationState::new(1, 2, ArchiveQuery::new(), labels(2)).unwrap();
        assert_eq!(state.date_label(2), Some("Month 2"));
        assert_eq!(state.date_label(0), None);
        assert_eq!(state.date_label(3), None);
    }

    #[test]
    fn test_bootstrap_script_is_found_in_markup() {
        let mut query = ArchiveQuery::new();
        query.insert("s".into(), "</script>".into());
        let state = PaginationState::new(1, 2, query, labels(2)).unwrap();
        let html = format!(
            "<article class=\"post\">x</article>{}",
            state.to_bootstrap_script().unwrap()
        );

        let parsed = PaginationState::from_bootstrap_html(&html).unwrap();
        assert_eq!(parsed, Some(state));
        assert_eq!(
            PaginationState::strip_bootstrap(&html),
            "<article class=\"post\">x</article>"
        );
    }

    #[test]
    fn test_bootstrap_payload_uses_camel_case() {
        let state = PaginationState::new(1, 1, ArchiveQuery::new(), labels(1)).unwrap();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["pageCount"], 1);
        assert!(json["pageDateLabels"].is_array());
    }

    #[test]
    fn test_deserialize_validates() {
        let bad = r#"{"currentPage":3,"pageCount":2,"query":{},"pageDateLabels":["a","b"]}"#;
        assert!(serde_json::from_str::<PaginationState>(bad).is_err());
    }
}
