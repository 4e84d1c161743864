use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rollarchive_core::PagePosition;

use crate::app::App;
use crate::controller::ChromeView;
use crate::theme::Theme;

const LINK_WIDTH: u16 = 12;
const INFO_WIDTH: u16 = 34;

pub struct NavigationWidget;

fn columns(area: Rect) -> [Rect; 4] {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    Layout::horizontal([
        Constraint::Length(LINK_WIDTH),
        Constraint::Fill(1),
        Constraint::Length(LINK_WIDTH),
        Constraint::Length(INFO_WIDTH),
    ])
    .areas(inner)
}

/// Where the slider track is drawn inside a navigation bar at `area`
pub fn slider_track(area: Rect) -> Rect {
    let [_, track, _, _] = columns(area);
    track
}

impl NavigationWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let chrome = app.controller.chrome();
        let theme = &app.theme;
        let older_text = format!("◂ {}", chrome.older_label);
        let newer_text = format!("{} ▸", chrome.newer_label);

        let border_style = if chrome.sticky {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.grey0)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(theme.bg1));
        frame.render_widget(block, area);

        let [older, track, newer, info] = columns(area);

        // Older is meaningless on the last page, newer on the first
        let link = Style::default().fg(theme.aqua);
        if !matches!(chrome.position, PagePosition::Last | PagePosition::OnlyPage) {
            frame.render_widget(Paragraph::new(Span::styled(older_text, link)), older);
        }
        if !matches!(chrome.position, PagePosition::First | PagePosition::OnlyPage) {
            frame.render_widget(
                Paragraph::new(Span::styled(newer_text, link)).right_aligned(),
                newer,
            );
        }

        frame.render_widget(Paragraph::new(track_line(&chrome, track.width, theme)), track);
        frame.render_widget(Paragraph::new(info_line(&chrome, theme)), info);
    }
}

fn track_line(chrome: &ChromeView, width: u16, theme: &Theme) -> Line<'static> {
    let width = width as usize;
    if width == 0 {
        return Line::default();
    }
    let handle = ((width - 1) as f64 * chrome.slider_fraction).round() as usize;
    let handle = handle.min(width - 1);
    Line::from(vec![
        Span::styled("━".repeat(handle), Style::default().fg(theme.grey1)),
        Span::styled(
            "●",
            Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "━".repeat(width - handle - 1),
            Style::default().fg(theme.grey0),
        ),
    ])
}

fn info_line(chrome: &ChromeView, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!(" {}", chrome.page_counter),
        Style::default().fg(theme.fg1).add_modifier(Modifier::BOLD),
    )];

    // Dragging shows the label of the page under the handle
    let label = chrome.hover_label.as_ref().or(chrome.date_label.as_ref());
    if let Some(label) = label {
        spans.push(Span::styled(
            format!("  {}", label),
            Style::default().fg(theme.grey1),
        ));
    }
    if chrome.loading {
        spans.push(Span::styled("  …", Style::default().fg(theme.yellow)));
    }
    if chrome.position != PagePosition::First && chrome.position != PagePosition::OnlyPage {
        spans.push(Span::styled(
            format!("  [{}]", chrome.trim_label),
            Style::default().fg(theme.grey0),
        ));
    }
    Line::from(spans)
}
