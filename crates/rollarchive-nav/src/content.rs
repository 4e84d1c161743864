//! Archive fragment markup turned into terminal lines

use std::sync::OnceLock;

use regex::Regex;

use crate::viewport::ItemBox;

static ITEM_RE: OnceLock<Option<Regex>> = OnceLock::new();
static TITLE_LINK_RE: OnceLock<Option<Regex>> = OnceLock::new();
static ANCHOR_RE: OnceLock<Option<Regex>> = OnceLock::new();
static BODY_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn item_regex() -> Option<&'static Regex> {
    cached(
        &ITEM_RE,
        r#"(?s)<article\b[^>]*\bclass="[^"]*\bpost\b[^"]*"[^>]*>.*?</article>"#,
    )
}

fn title_link_regex() -> Option<&'static Regex> {
    cached(
        &TITLE_LINK_RE,
        r#"(?s)class="[^"]*\bpost-title\b[^"]*"[^>]*>\s*<a\b[^>]*\bhref="([^"]*)""#,
    )
}

fn anchor_tag_regex() -> Option<&'static Regex> {
    cached(&ANCHOR_RE, r"</?a\b[^>]*>")
}

fn body_regex() -> Option<&'static Regex> {
    cached(&BODY_RE, r#"(?s)<div class="post-body">.*?</div>"#)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub link: Option<String>,
    html: String,
}

/// Listing markup split into selectable items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedContent {
    html: String,
    items: Vec<ContentItem>,
}

/// Content laid out for a given width
#[derive(Debug, Clone, Default)]
pub struct ContentLayout {
    pub lines: Vec<String>,
    pub items: Vec<ItemBox>,
}

impl RenderedContent {
    pub fn parse(html: &str) -> Self {
        let Some(item_re) = item_regex() else {
            return Self {
                html: html.to_string(),
                items: Vec::new(),
            };
        };
        let items = item_re
            .find_iter(html)
            .map(|m| {
                let block = m.as_str();
                let link = title_link_regex()
                    .and_then(|re| re.captures(block))
                    .map(|caps| unescape_attr(&caps[1]));
                ContentItem {
                    link,
                    html: block.to_string(),
                }
            })
            .collect();
        Self {
            html: html.to_string(),
            items,
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render to lines; trimmed mode keeps only titles and dates
    pub fn layout(&self, width: usize, trimmed: bool) -> ContentLayout {
        let width = width.max(10);
        if self.items.is_empty() {
            return ContentLayout {
                lines: to_lines(&self.html, width),
                items: Vec::new(),
            };
        }

        let mut layout = ContentLayout::default();
        for item in &self.items {
            let html = match body_regex() {
                Some(re) if trimmed => re.replace_all(&item.html, "").into_owned(),
                _ => item.html.clone(),
            };
            let lines = to_lines(&html, width);
            layout.items.push(ItemBox {
                top: layout.lines.len() as i64,
                height: lines.len() as i64,
                link: item.link.clone(),
            });
            layout.lines.extend(lines);
            layout.lines.push(String::new());
        }
        layout
    }
}

fn to_lines(html: &str, width: usize) -> Vec<String> {
    // Links are handled by selection, so drop them to avoid footnotes
    let html = match anchor_tag_regex() {
        Some(re) => re.replace_all(html, ""),
        None => html.into(),
    };
    let text = html2text::from_read(html.as_bytes(), width).unwrap_or_else(|_| html.to_string());
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.trim().is_empty()).count();
    lines.drain(..leading);
    lines
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
