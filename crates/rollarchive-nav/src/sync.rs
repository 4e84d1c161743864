//! Address fragment synchronization
//!
//! The controller writes `page` and `search` into the address fragment and
//! learns about back/forward navigation by polling for fragments it did not
//! write itself.

use rollarchive_core::fragment::{PAGE_KEY, SEARCH_KEY};
use rollarchive_core::AddressFragment;
use tracing::debug;

/// The host's address bar: current fragment plus session history
pub trait AddressBar: Send {
    /// Current fragment, without the leading `#`
    fn fragment(&self) -> String;

    /// Overwrite the current history entry
    fn replace_fragment(&mut self, fragment: &str);

    /// Add a history entry
    fn push_fragment(&mut self, fragment: &str);

    /// Step back in history; false when there is nothing to go back to
    fn back(&mut self) -> bool {
        false
    }

    fn forward(&mut self) -> bool {
        false
    }
}

/// In-memory session history for hosts without a real address bar
#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: Vec<String>,
    index: usize,
}

impl SessionHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.trim_start_matches('#').to_string()],
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl AddressBar for SessionHistory {
    fn fragment(&self) -> String {
        self.entries[self.index].clone()
    }

    fn replace_fragment(&mut self, fragment: &str) {
        self.entries[self.index] = fragment.to_string();
    }

    fn push_fragment(&mut self, fragment: &str) {
        // Pushing drops any forward entries
        self.entries.truncate(self.index + 1);
        self.entries.push(fragment.to_string());
        self.index += 1;
    }

    fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }
}

/// A fragment change made outside the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentChange {
    pub page: Option<u32>,
    pub search: Option<String>,
}

impl FragmentChange {
    /// Neither key present: the default view
    pub fn is_default_view(&self) -> bool {
        self.page.is_none() && self.search.is_none()
    }
}

pub struct FragmentSync {
    address: Box<dyn AddressBar>,
    last_seen: String,
}

impl FragmentSync {
    pub fn new(address: Box<dyn AddressBar>) -> Self {
        let last_seen = address.fragment();
        Self { address, last_seen }
    }

    pub fn current(&self) -> AddressFragment {
        AddressFragment::parse(&self.address.fragment())
    }

    /// Set a key in place, e.g. for a filter term update
    pub fn set(&mut self, key: &str, value: &str) {
        let mut fragment = self.current();
        fragment.set(key, value);
        self.write(&fragment, false);
    }

    pub fn remove(&mut self, key: &str) {
        let mut fragment = self.current();
        if fragment.remove(key) {
            self.write(&fragment, false);
        }
    }

    /// Record a committed page; page 1 drops the key
    ///
    /// A page change within the same filter is a new history entry. A filter
    /// change replaces the current entry instead.
    pub fn commit_page(&mut self, page: u32, search: Option<&str>) {
        let search = search.filter(|term| !term.is_empty());
        if self.current().search() != search {
            match search {
                Some(term) => self.set(SEARCH_KEY, term),
                None => self.remove(SEARCH_KEY),
            }
            if page > 1 {
                self.set(PAGE_KEY, &page.to_string());
            } else {
                self.remove(PAGE_KEY);
            }
            return;
        }

        let mut fragment = self.current();
        if page > 1 {
            fragment.set(PAGE_KEY, &page.to_string());
        } else {
            fragment.remove(PAGE_KEY);
        }
        self.write(&fragment, true);
    }

    fn write(&mut self, fragment: &AddressFragment, push: bool) {
        let encoded = fragment.encode();
        if encoded != self.address.fragment() {
            if push {
                self.address.push_fragment(&encoded);
            } else {
                self.address.replace_fragment(&encoded);
            }
        }
        self.last_seen = encoded;
    }

    /// External change since the last write or poll
    pub fn poll(&mut self) -> Option<FragmentChange> {
        let raw = self.address.fragment();
        if raw == self.last_seen {
            return None;
        }
        debug!("Address fragment changed to {:?}", raw);
        self.last_seen = raw;

        let fragment = self.current();
        Some(FragmentChange {
            page: fragment.page(),
            search: fragment.search().map(str::to_string),
        })
    }

    pub fn back(&mut self) -> bool {
        self.address.back()
    }

    pub fn forward(&mut self) -> bool {
        self.address.forward()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_back_and_forward() {
        let mut history = SessionHistory::default();
        history.push_fragment("page=2");
        history.push_fragment("page=3");
        assert!(history.back());
        assert_eq!(history.fragment(), "page=2");
        history.push_fragment("page=5");
        assert!(!history.forward());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_own_writes_are_not_reported() {
        let mut sync = FragmentSync::new(Box::new(SessionHistory::default()));
        sync.commit_page(3, None);
        assert_eq!(sync.current().page(), Some(3));
        assert_eq!(sync.poll(), None);

        sync.commit_page(1, None);
        assert!(sync.current().is_empty());
        assert_eq!(sync.poll(), None);
    }

    #[test]
    fn test_back_is_reported() {
        let mut sync = FragmentSync::new(Box::new(SessionHistory::default()));
        sync.commit_page(2, None);
        sync.commit_page(4, None);

        assert!(sync.back());
        assert_eq!(
            sync.poll(),
            Some(FragmentChange {
                page: Some(2),
                search: None
            })
        );
        assert_eq!(sync.poll(), None);

        assert!(sync.back());
        let change = sync.poll().unwrap();
        assert!(change.is_default_view());
    }

    #[test]
    fn test_filter_change_replaces_entry() {
        let mut sync = FragmentSync::new(Box::new(SessionHistory::default()));
        sync.commit_page(2, None);
        sync.commit_page(1, Some("rust"));
        assert_eq!(sync.current().encode(), "search=rust");
        assert_eq!(sync.poll(), None);

        // Paging inside the filter pushes again
        sync.commit_page(3, Some("rust"));
        assert!(sync.back());
        assert_eq!(sync.current().encode(), "search=rust");

        // The page-2 entry was replaced by the search, only the bare address is left
        assert!(sync.back());
        assert!(sync.current().is_empty());
        assert!(!sync.back());
    }

    #[test]
    fn test_set_replaces_entry() {
        let mut sync = FragmentSync::new(Box::new(SessionHistory::new("#page=2")));
        sync.set(SEARCH_KEY, "rust");
        assert_eq!(sync.current().encode(), "page=2&search=rust");
        assert!(!sync.back());
        sync.remove(PAGE_KEY);
        assert_eq!(sync.current().encode(), "search=rust");
    }

    #[test]
    fn test_repeated_commit_does_not_grow_history() {
        let mut sync = FragmentSync::new(Box::new(SessionHistory::default()));
        sync.commit_page(2, None);
        sync.commit_page(2, None);
        assert!(sync.back());
        assert!(!sync.back());
    }
}
