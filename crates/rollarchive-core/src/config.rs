use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub strings: UiStrings,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (logs for the terminal browser live here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the archive server binds to
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    /// Declared HTML content type of the site
    #[serde(default = "default_html_type")]
    pub html_type: String,
    /// Declared charset of the site
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Posts per archive page
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    /// JSON file with the posts to serve
    #[serde(default)]
    pub posts_path: Option<PathBuf>,
    /// Site title used by the full-page template
    #[serde(default = "default_site_title")]
    pub site_title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            html_type: default_html_type(),
            charset: default_charset(),
            per_page: default_per_page(),
            posts_path: None,
            site_title: default_site_title(),
        }
    }
}

impl ServerConfig {
    /// `Content-Type` header value for fragment responses
    pub fn content_type(&self) -> String {
        format!("{}; charset={}", self.html_type, self.charset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Enable in-place archive navigation at all
    #[serde(default = "default_true")]
    pub advanced_navigation: bool,
    /// Animate page transitions and selection scrolling
    #[serde(default = "default_true")]
    pub animations: bool,
    /// Archive URL the client fetches fragments from
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    /// Fragment request timeout in seconds (0 = wait forever)
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Pixels (rows in the terminal) kept above a selected item
    #[serde(default)]
    pub scroll_offset: i64,
    /// Manual scroll distance that clears the selection
    #[serde(default = "default_scroll_tolerance")]
    pub scroll_tolerance: i64,
    /// Viewport edge the navigation chrome sticks to
    #[serde(default)]
    pub sticky_edge: StickyEdge,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            advanced_navigation: default_true(),
            animations: default_true(),
            archive_url: default_archive_url(),
            request_timeout_secs: default_timeout(),
            scroll_offset: 0,
            scroll_tolerance: default_scroll_tolerance(),
            sticky_edge: StickyEdge::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickyEdge {
    #[default]
    Top,
    Bottom,
}

/// Easing curve for transitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    None,
    Linear,
    Cubic,
    Quintic,
    #[default]
    EaseOut,
    EaseIn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Curve used to slide the old page out
    #[serde(default = "default_outgoing_easing")]
    pub outgoing_easing: EasingType,
    /// Curve used to slide the new page in and to scroll to a selection
    #[serde(default)]
    pub incoming_easing: EasingType,
    #[serde(default = "default_outgoing_ms")]
    pub outgoing_duration_ms: u64,
    #[serde(default = "default_incoming_ms")]
    pub incoming_duration_ms: u64,
    #[serde(default = "default_scroll_ms")]
    pub scroll_duration_ms: u64,
    /// Frames per second while an animation is running
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            outgoing_easing: default_outgoing_easing(),
            incoming_easing: EasingType::default(),
            outgoing_duration_ms: default_outgoing_ms(),
            incoming_duration_ms: default_incoming_ms(),
            scroll_duration_ms: default_scroll_ms(),
            fps: default_fps(),
        }
    }
}

/// Localized labels of the navigation chrome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiStrings {
    #[serde(default = "default_older")]
    pub older: String,
    #[serde(default = "default_newer")]
    pub newer: String,
    #[serde(default = "default_loading")]
    pub loading: String,
    /// Page counter template, two `%d` placeholders: page, page count
    #[serde(default = "default_page_text")]
    pub page_text: String,
    #[serde(default = "default_trim")]
    pub trim: String,
    #[serde(default = "default_untrim")]
    pub untrim: String,
}

impl Default for UiStrings {
    fn default() -> Self {
        Self {
            older: default_older(),
            newer: default_newer(),
            loading: default_loading(),
            page_text: default_page_text(),
            trim: default_trim(),
            untrim: default_untrim(),
        }
    }
}

impl UiStrings {
    /// Fill the page counter template
    pub fn page_counter(&self, page: u32, page_count: u32) -> String {
        self.page_text
            .replacen("%d", &page.to_string(), 1)
            .replacen("%d", &page_count.to_string(), 1)
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-j>" (Ctrl+j), "<S-g>" (Shift+g), "<CR>" (Enter), "<Esc>", "<Left>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the browser
    #[serde(default = "default_key_quit")]
    pub quit: String,
    /// Select the next item, crossing into the next page at the end
    #[serde(default = "default_key_next_item")]
    pub next_item: String,
    /// Select the previous item, crossing into the previous page at the start
    #[serde(default = "default_key_prev_item")]
    pub prev_item: String,
    /// Open the selected item's link
    #[serde(default = "default_key_activate")]
    pub activate: String,
    /// Clear the selection
    #[serde(default = "default_key_deselect")]
    pub deselect: String,
    /// Go back to page 1
    #[serde(default = "default_key_first_page")]
    pub first_page: String,
    /// One page older
    #[serde(default = "default_key_older_page")]
    pub older_page: String,
    /// One page newer
    #[serde(default = "default_key_newer_page")]
    pub newer_page: String,
    /// Collapse or expand post bodies
    #[serde(default = "default_key_toggle_trim")]
    pub toggle_trim: String,
    /// Return to the originally loaded view
    #[serde(default = "default_key_restore")]
    pub restore: String,
    /// Address history back
    #[serde(default = "default_key_history_back")]
    pub history_back: String,
    /// Address history forward
    #[serde(default = "default_key_history_forward")]
    pub history_forward: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            next_item: default_key_next_item(),
            prev_item: default_key_prev_item(),
            activate: default_key_activate(),
            deselect: default_key_deselect(),
            first_page: default_key_first_page(),
            older_page: default_key_older_page(),
            newer_page: default_key_newer_page(),
            toggle_trim: default_key_toggle_trim(),
            restore: default_key_restore(),
            history_back: default_key_history_back(),
            history_forward: default_key_history_forward(),
        }
    }
}

// Default keymap values (Vim-style notation)
fn default_key_quit() -> String { "q".to_string() }
fn default_key_next_item() -> String { "j".to_string() }
fn default_key_prev_item() -> String { "k".to_string() }
fn default_key_activate() -> String { "<CR>".to_string() }
fn default_key_deselect() -> String { "<Esc>".to_string() }
fn default_key_first_page() -> String { "h".to_string() }
fn default_key_older_page() -> String { "<Left>".to_string() }
fn default_key_newer_page() -> String { "<Right>".to_string() }
fn default_key_toggle_trim() -> String { "t".to_string() }
fn default_key_restore() -> String { "r".to_string() }
fn default_key_history_back() -> String { "u".to_string() }
fn default_key_history_forward() -> String { "<C-r>".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rollarchive")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_html_type() -> String {
    "text/html".to_string()
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

fn default_per_page() -> usize {
    10
}

fn default_site_title() -> String {
    "Archives".to_string()
}

fn default_archive_url() -> String {
    "http://127.0.0.1:8080/".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_scroll_tolerance() -> i64 {
    40
}

fn default_outgoing_easing() -> EasingType {
    EasingType::EaseIn
}

fn default_outgoing_ms() -> u64 {
    200
}

fn default_incoming_ms() -> u64 {
    450
}

fn default_scroll_ms() -> u64 {
    150
}

fn default_fps() -> u32 {
    60
}

fn default_older() -> String { "Older".to_string() }
fn default_newer() -> String { "Newer".to_string() }
fn default_loading() -> String { "Loading".to_string() }
fn default_page_text() -> String { "%d of %d".to_string() }
fn default_trim() -> String { "Collapse Text".to_string() }
fn default_untrim() -> String { "Expand Text".to_string() }

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults when absent
    pub fn load_from(config_path: &std::path::Path) -> crate::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a file
    pub fn save_to(&self, config_path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/rollarchive/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("rollarchive")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Log file used by the terminal browser
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("browse.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.navigation.advanced_navigation);
        assert!(config.navigation.animations);
        assert_eq!(config.navigation.scroll_tolerance, 40);
        assert_eq!(config.server.content_type(), "text/html; charset=UTF-8");
        assert_eq!(config.animation.outgoing_duration_ms, 200);
        assert_eq!(config.keymap.next_item, "j");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [navigation]
            animations = false
            sticky_edge = "bottom"

            [strings]
            older = "Older posts"
            "#,
        )
        .unwrap();
        assert!(!config.navigation.animations);
        assert!(config.navigation.advanced_navigation);
        assert_eq!(config.navigation.sticky_edge, StickyEdge::Bottom);
        assert_eq!(config.strings.older, "Older posts");
        assert_eq!(config.strings.newer, "Newer");
    }

    #[test]
    fn test_page_counter_template() {
        let strings = UiStrings::default();
        assert_eq!(strings.page_counter(2, 5), "2 of 5");

        let strings = UiStrings {
            page_text: "Seite %d von %d".to_string(),
            ..Default::default()
        };
        assert_eq!(strings.page_counter(1, 3), "Seite 1 von 3");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.server.per_page = 3;
        config.navigation.archive_url = "http://example.test/blog/".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.server.per_page, 3);
        assert_eq!(loaded.navigation.archive_url, "http://example.test/blog/");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.server.per_page, 10);
    }
}
