//! Address fragment codec
//!
//! The part of the URL after `#` is treated as a small ordered key/value set,
//! e.g. `#page=3&search=rust`. Keys keep their insertion order so that the
//! written fragment is stable across updates.

use std::fmt;

use url::form_urlencoded;

/// Fragment key holding the page number (omitted on page 1)
pub const PAGE_KEY: &str = "page";
/// Fragment key holding the active search term
pub const SEARCH_KEY: &str = "search";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFragment {
    entries: Vec<(String, String)>,
}

impl AddressFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw fragment, with or without the leading `#`
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        let mut fragment = Self::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            fragment.set(key.as_ref(), value.as_ref());
        }
        fragment
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a key, keeping its position if it already exists
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Remove a key; returns whether anything changed
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        before != self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Page number, ignoring malformed values
    pub fn page(&self) -> Option<u32> {
        self.get(PAGE_KEY)?.parse().ok().filter(|page| *page >= 1)
    }

    pub fn search(&self) -> Option<&str> {
        self.get(SEARCH_KEY).filter(|term| !term.is_empty())
    }

    /// Encoded form without the leading `#`
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

impl fmt::Display for AddressFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            Ok(())
        } else {
            write!(f, "#{}", self.encode())
        }
    }
}
