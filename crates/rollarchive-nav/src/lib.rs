//! Client side of rolling archives: the navigation controller and a terminal
//! browser built around it.

pub mod app;
pub mod content;
pub mod controller;
pub mod direction;
pub mod event;
pub mod input;
pub mod keymap;
pub mod selection;
pub mod slider;
pub mod sync;
pub mod theme;
pub mod tracker;
pub mod transition;
pub mod viewport;
pub mod widgets;

pub use app::App;
pub use controller::{
    ChromeView, Command, ControllerOptions, ControllerState, NavigationController, Rejection,
    RequestOrigin, RequestOutcome,
};
pub use direction::Direction;
pub use sync::{AddressBar, SessionHistory};
pub use theme::Theme;
pub use viewport::{ItemBox, ScrollMetrics};
