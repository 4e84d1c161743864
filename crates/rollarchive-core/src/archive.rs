//! Bundled archive renderer: a list of posts paged newest first

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::UiStrings;
use crate::dispatch::ContentRenderer;
use crate::protocol::SEARCH_PARAM;
use crate::state::{ArchiveQuery, PaginationState};
use crate::Result;

/// Month-year label format used for page date labels
const DATE_LABEL_FORMAT: &str = "%B, %Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub link: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub body: String,
}

impl Post {
    fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.body.to_lowercase().contains(&term)
    }
}

pub struct PostArchive {
    posts: Vec<Post>,
    per_page: usize,
    site_title: String,
    strings: UiStrings,
}

impl PostArchive {
    pub fn new(mut posts: Vec<Post>, per_page: usize) -> Self {
        // Newest first; stable so same-day posts keep file order
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Self {
            posts,
            per_page: per_page.max(1),
            site_title: "Archives".to_string(),
            strings: UiStrings::default(),
        }
    }

    pub fn with_site_title(mut self, title: impl Into<String>) -> Self {
        self.site_title = title.into();
        self
    }

    pub fn with_strings(mut self, strings: UiStrings) -> Self {
        self.strings = strings;
        self
    }

    pub fn from_json(json: &str, per_page: usize) -> Result<Self> {
        let posts: Vec<Post> = serde_json::from_str(json)?;
        Ok(Self::new(posts, per_page))
    }

    pub fn load(path: &Path, per_page: usize) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, per_page)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn matching(&self, query: &ArchiveQuery) -> Vec<&Post> {
        match query.get(SEARCH_PARAM).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(term) => self.posts.iter().filter(|p| p.matches(term)).collect(),
            None => self.posts.iter().collect(),
        }
    }

    fn page_count_for(&self, matches: usize) -> u32 {
        matches.div_ceil(self.per_page) as u32
    }

    fn page_slice<'a>(&self, matches: &'a [&'a Post], page: u32) -> &'a [&'a Post] {
        let start = (page.saturating_sub(1) as usize).saturating_mul(self.per_page);
        if start >= matches.len() {
            return &[];
        }
        let end = (start + self.per_page).min(matches.len());
        &matches[start..end]
    }

    fn render_chrome(&self, state: &PaginationState) -> String {
        let strings = &self.strings;
        let hidden = if state.is_paginated() { "" } else { " hidden" };
        let label = state.date_label(state.current_page()).unwrap_or_default();
        format!(
            concat!(
                "<nav id=\"rollingarchives\"{hidden}>",
                "<div id=\"pagetrack\" data-value=\"{value}\" data-max=\"{max}\"></div>",
                "<span id=\"rollpages\">{counter}</span>",
                "<span id=\"rolldates\">{label}</span>",
                "<a id=\"rollprevious\" href=\"#\">&laquo; {older}</a>",
                "<span id=\"rollload\" hidden>{loading}</span>",
                "<a id=\"rollnext\" href=\"#\">{newer} &raquo;</a>",
                "</nav>"
            ),
            hidden = hidden,
            value = state.slider_value(),
            max = state.page_count(),
            counter = escape_html(&strings.page_counter(state.current_page(), state.page_count())),
            label = escape_html(label),
            older = escape_html(&strings.older),
            loading = escape_html(&strings.loading),
            newer = escape_html(&strings.newer),
        )
    }
}

#[async_trait]
impl ContentRenderer for PostArchive {
    async fn render_fragment(&self, query: &ArchiveQuery, page: u32) -> Result<String> {
        let matches = self.matching(query);
        let posts = self.page_slice(&matches, page);
        if posts.is_empty() {
            return Ok("<p class=\"no-posts\">Nothing found.</p>".to_string());
        }

        let mut html = String::new();
        for post in posts {
            html.push_str(&format!(
                concat!(
                    "<article class=\"post\">",
                    "<h2 class=\"post-title\"><a href=\"{link}\" rel=\"bookmark\">{title}</a></h2>",
                    "<time datetime=\"{date}\">{pretty}</time>",
                    "<div class=\"post-body\"><p>{body}</p></div>",
                    "</article>\n"
                ),
                link = escape_html(&post.link),
                title = escape_html(&post.title),
                date = post.date,
                pretty = post.date.format("%B %-d, %Y"),
                body = escape_html(&post.body),
            ));
        }
        Ok(html)
    }

    async fn pagination_state(&self, query: &ArchiveQuery, page: u32) -> Result<PaginationState> {
        let matches = self.matching(query);
        let page_count = self.page_count_for(matches.len());
        if page_count == 0 {
            return Ok(PaginationState::empty(query.clone()));
        }

        let labels = matches
            .chunks(self.per_page)
            .map(|chunk| chunk[0].date.format(DATE_LABEL_FORMAT).to_string())
            .collect();
        PaginationState::new(page.clamp(1, page_count), page_count, query.clone(), labels)
    }

    async fn render_page(
        &self,
        query: &ArchiveQuery,
        page: u32,
        state: &PaginationState,
    ) -> Result<String> {
        let fragment = self.render_fragment(query, page).await?;
        let bootstrap = state.to_bootstrap_script()?;

        Ok(format!(
            concat!(
                "<!DOCTYPE html>\n<html>\n<head><meta charset=\"UTF-8\"><title>{title}</title></head>\n",
                "<body>\n<h1>{title}</h1>\n{chrome}\n",
                "<div id=\"rollingcontent\" aria-live=\"polite\">\n{fragment}</div>\n",
                "{bootstrap}\n</body>\n</html>\n"
            ),
            title = escape_html(&self.site_title),
            chrome = self.render_chrome(state),
            fragment = fragment,
            bootstrap = bootstrap,
        ))
    }
}

/// Escape text for element content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive() -> PostArchive {
        let posts = vec![
            ("Oldest", "2024-01-05"),
            ("Rust tips", "2024-03-10"),
            ("Newest", "2024-05-20"),
            ("Rust async", "2024-04-02"),
            ("Middle", "2024-02-14"),
        ]
        .into_iter()
        .map(|(title, date)| Post {
            title: title.to_string(),
            link: format!("/{}/", title.to_lowercase().replace(' ', "-")),
            date: date.parse().unwrap(),
            body: format!("About {}", title),
        })
        .collect();
        PostArchive::new(posts, 2)
    }

    fn search(term: &str) -> ArchiveQuery {
        let mut query = ArchiveQuery::new();
        query.insert("s".into(), term.into());
        query
    }

    #[tokio::test]
    async fn test_pages_newest_first() {
        let archive = archive();
        let first = archive.render_fragment(&ArchiveQuery::new(), 1).await.unwrap();
        assert!(first.find("Newest").unwrap() < first.find("Rust async").unwrap());
        assert!(!first.contains("Rust tips"));

        let last = archive.render_fragment(&ArchiveQuery::new(), 3).await.unwrap();
        assert!(last.contains("Oldest"));
        assert_eq!(last.matches("class=\"post\"").count(), 1);
    }

    #[tokio::test]
    async fn test_state_labels_by_first_post() {
        let archive = archive();
        let state = archive.pagination_state(&ArchiveQuery::new(), 2).await.unwrap();
        assert_eq!(state.current_page(), 2);
        assert_eq!(state.page_count(), 3);
        assert_eq!(
            state.page_date_labels(),
            &["May, 2024", "March, 2024", "January, 2024"]
        );
    }

    #[tokio::test]
    async fn test_search_filter() {
        let archive = archive();
        let query = search("rust");
        let state = archive.pagination_state(&query, 1).await.unwrap();
        assert_eq!(state.page_count(), 1);
        assert_eq!(state.query(), &query);

        let html = archive.render_fragment(&query, 1).await.unwrap();
        assert!(html.contains("Rust async") && html.contains("Rust tips"));
    }

    #[tokio::test]
    async fn test_empty_result() {
        let archive = archive();
        let query = search("nothing matches");
        let state = archive.pagination_state(&query, 1).await.unwrap();
        assert_eq!(state.page_count(), 0);
        assert!(!state.is_paginated());
        let html = archive.render_fragment(&query, 1).await.unwrap();
        assert!(html.contains("no-posts"));
    }

    #[tokio::test]
    async fn test_full_page_embeds_bootstrap() {
        let archive = archive().with_site_title("My <Blog>");
        let query = ArchiveQuery::new();
        let state = archive.pagination_state(&query, 1).await.unwrap();
        let html = archive.render_page(&query, 1, &state).await.unwrap();

        assert!(html.contains("<title>My &lt;Blog&gt;</title>"));
        assert!(html.contains("1 of 3"));
        assert_eq!(
            PaginationState::from_bootstrap_html(&html).unwrap(),
            Some(state)
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }
}
