//! Read-only view of the user toggles the navigation core depends on

use crate::config::{AppConfig, UiStrings};

/// Settings consulted by the navigation controller; never written by it
pub trait SettingsStore: Send + Sync {
    /// Whether page transitions should be animated
    fn animations_enabled(&self) -> bool;

    /// Whether in-place archive navigation is active at all
    fn advanced_navigation_enabled(&self) -> bool;

    /// Localized labels for the navigation chrome
    fn strings(&self) -> &UiStrings;
}

impl SettingsStore for AppConfig {
    fn animations_enabled(&self) -> bool {
        self.navigation.animations
    }

    fn advanced_navigation_enabled(&self) -> bool {
        self.navigation.advanced_navigation
    }

    fn strings(&self) -> &UiStrings {
        &self.strings
    }
}
