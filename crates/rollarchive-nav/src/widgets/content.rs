use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app::App;

pub struct ContentWidget;

impl ContentWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let layout = app.layout();
        let selected = app
            .controller
            .selected()
            .and_then(|index| layout.items.get(index));
        let scroll = app.scroll().max(0) as usize;

        let lines: Vec<Line> = layout
            .lines
            .iter()
            .enumerate()
            .skip(scroll)
            .take(area.height as usize)
            .map(|(row, text)| {
                let row = row as i64;
                let in_selection =
                    selected.is_some_and(|item| row >= item.top && row < item.top + item.height);
                let style = if in_selection {
                    Style::default().fg(theme.fg1).bg(theme.selection)
                } else {
                    Style::default().fg(theme.fg0)
                };
                Line::from(Span::styled(text.clone(), style))
            })
            .collect();

        let (target, shift) = slide(area, app.controller.transition_frame().map(|f| f.offset));
        frame.render_widget(Paragraph::new(lines).scroll((0, shift)), target);
    }
}

/// Area and horizontal scroll for a slide offset in content widths
fn slide(area: Rect, offset: Option<f64>) -> (Rect, u16) {
    let Some(offset) = offset else {
        return (area, 0);
    };
    let columns = ((offset.abs() * area.width as f64).round() as u16).min(area.width);
    if offset < 0.0 {
        // Moving left: hide the leading columns
        (area, columns)
    } else {
        // Moving right: start further in
        let mut shifted = area;
        shifted.x += columns;
        shifted.width -= columns;
        (shifted, 0)
    }
}
