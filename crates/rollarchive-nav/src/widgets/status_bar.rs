use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::controller::ControllerState;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let chrome = app.controller.chrome();

        let (status_text, fg) = if let Some(error) = &chrome.error {
            (format!(" {}", error), theme.error)
        } else if let Some(msg) = &app.status_message {
            (format!(" {}", msg), theme.fg0)
        } else {
            let state = match app.controller.state() {
                ControllerState::Idle => "READY",
                ControllerState::Loading => "LOADING",
                ControllerState::Animating => "MOVING",
                ControllerState::Error => "ERROR",
            };
            let fragment = app.controller.address_fragment().to_string();
            (format!(" {} {}", state, fragment), theme.fg0)
        };

        let help_hint = " q:quit j/k:select ←/→:page h:first r:restore t:trim ";
        let padding_len = (area.width as usize)
            .saturating_sub(status_text.chars().count() + help_hint.chars().count());

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(fg).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey1).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
