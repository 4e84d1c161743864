mod content;
pub mod navigation;
mod status_bar;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::Frame;

use crate::app::App;

pub use content::ContentWidget;
pub use navigation::NavigationWidget;
pub use status_bar::StatusBarWidget;

/// Rows taken by the navigation bar, borders included
pub const NAV_HEIGHT: u16 = 3;

/// Screen regions of the archive browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    /// Absent while the archive has a single page
    pub nav: Option<Rect>,
    pub content: Rect,
    pub status: Rect,
}

pub fn areas(area: Rect, chrome_visible: bool) -> Areas {
    if chrome_visible {
        let [nav, content, status] = Layout::vertical([
            Constraint::Length(NAV_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);
        Areas {
            nav: Some(nav),
            content,
            status,
        }
    } else {
        let [content, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        Areas {
            nav: None,
            content,
            status,
        }
    }
}

/// Draw the whole browser
pub fn render(frame: &mut Frame, app: &App) {
    let areas = areas(frame.area(), app.controller.is_chrome_visible());
    if let Some(nav) = areas.nav {
        NavigationWidget::render(frame, nav, app);
    }
    ContentWidget::render(frame, areas.content, app);
    StatusBarWidget::render(frame, areas.status, app);
}
