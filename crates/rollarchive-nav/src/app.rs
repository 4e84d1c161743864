use std::time::Instant;

use crossterm::event::{MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use rollarchive_core::AppConfig;
use tracing::debug;

use crate::content::{ContentLayout, RenderedContent};
use crate::controller::{Command, ControllerState, NavigationController, Rejection, RequestOutcome};
use crate::input::{slider_gesture, Action, SliderGesture};
use crate::keymap::Keymap;
use crate::theme::Theme;
use crate::transition::ScrollAnimator;
use crate::viewport::ScrollMetrics;
use crate::widgets;

/// Rows moved by one mouse wheel notch
const WHEEL_STEP: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LayoutKey {
    width: usize,
    trimmed: bool,
    state: ControllerState,
}

/// Terminal-side state around the navigation controller
pub struct App {
    pub controller: NavigationController,
    pub keymap: Keymap,
    pub theme: Theme,
    pub should_quit: bool,
    pub status_message: Option<String>,
    scroller: ScrollAnimator,
    content: RenderedContent,
    layout: ContentLayout,
    layout_key: Option<LayoutKey>,
    size: Rect,
    dragging: bool,
}

impl App {
    pub fn new(mut controller: NavigationController, config: &AppConfig) -> Self {
        // The chrome is the first row of the view
        controller.set_chrome_top(0);
        Self {
            controller,
            keymap: Keymap::from_config(&config.keymap),
            theme: Theme::default(),
            should_quit: false,
            status_message: None,
            scroller: ScrollAnimator::new(&config.animation, config.navigation.animations),
            content: RenderedContent::default(),
            layout: ContentLayout::default(),
            layout_key: None,
            size: Rect::default(),
            dragging: false,
        }
    }

    pub fn scroll(&self) -> i64 {
        self.scroller.current()
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = Rect::new(0, 0, width, height);
        self.refresh_layout();
    }

    fn content_area(&self) -> Rect {
        widgets::areas(self.size, self.controller.is_chrome_visible()).content
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.scroller.current(),
            self.content_area().height as i64,
            self.layout.lines.len() as i64,
        )
    }

    /// Re-render the displayed markup when it, the width or the trim mode changed
    fn refresh_layout(&mut self) {
        let width = self.content_area().width as usize;
        let html_changed = self.content.html() != self.controller.displayed_html();
        if html_changed {
            self.content = RenderedContent::parse(self.controller.displayed_html());
        }

        let key = LayoutKey {
            width,
            trimmed: self.controller.is_trimmed(),
            state: self.controller.state(),
        };
        if !html_changed && self.layout_key == Some(key) {
            return;
        }
        self.layout = self.content.layout(width, key.trimmed);
        self.layout_key = Some(key);
        if html_changed {
            // A new page starts at the top
            self.scroller.set_scroll(0);
        } else {
            let max = self.metrics().max_scroll();
            self.scroller.set_scroll(self.scroller.current().min(max));
        }
        let metrics = self.metrics();
        self.controller.set_layout(self.layout.items.clone(), metrics);
    }

    /// Advance animations and hand back the commands the host must carry out
    pub fn tick(&mut self, now: Instant) -> Vec<Command> {
        self.controller.tick(now);
        self.refresh_layout();

        self.scroller.update(now);
        if let Some(target) = self.scroller.take_settled() {
            self.controller.scroll_settled(target);
        }

        let mut commands = Vec::new();
        for command in self.controller.take_commands() {
            match command {
                Command::ScrollTo(target) => {
                    let target = target.min(self.metrics().max_scroll());
                    self.scroller.scroll_to(target, now);
                }
                other => commands.push(other),
            }
        }
        commands
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::NextItem => self.controller.next_item(),
            Action::PreviousItem => self.controller.previous_item(),
            Action::ActivateSelected => self.controller.activate_selected(),
            Action::Deselect => self.controller.deselect(),
            Action::JumpToFirstPage => {
                let result = self.controller.first_page();
                self.report(result);
            }
            Action::OlderPage => {
                if let Some(result) = self.controller.older() {
                    self.report(result);
                }
            }
            Action::NewerPage => {
                if let Some(result) = self.controller.newer() {
                    self.report(result);
                }
            }
            Action::ToggleTrim => self.controller.toggle_trim(),
            Action::Restore => {
                if !self.controller.restore() {
                    self.set_status("Nothing to restore");
                }
            }
            Action::HistoryBack => self.controller.history_back(),
            Action::HistoryForward => self.controller.history_forward(),
            Action::None => {}
        }
    }

    fn report(&mut self, result: Result<RequestOutcome, Rejection>) {
        match result {
            Ok(outcome) => {
                debug!("Page request: {:?}", outcome);
                self.clear_status();
            }
            Err(Rejection::SamePage(_)) => {}
            Err(rejection) => self.set_status(rejection.to_string()),
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let areas = widgets::areas(self.size, self.controller.is_chrome_visible());
        if let Some(track) = areas.nav.map(widgets::navigation::slider_track) {
            if let Some(gesture) = slider_gesture(mouse, track, self.dragging) {
                self.handle_slider(gesture);
                return;
            }
        }

        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(WHEEL_STEP),
            MouseEventKind::ScrollUp => self.scroll_by(-WHEEL_STEP),
            _ => {}
        }
    }

    fn handle_slider(&mut self, gesture: SliderGesture) {
        match gesture {
            SliderGesture::Press(fraction) => {
                self.dragging = true;
                self.controller.slider_begin_drag();
                self.controller.slider_drag_to(fraction);
            }
            SliderGesture::Drag(fraction) => self.controller.slider_drag_to(fraction),
            SliderGesture::Release => {
                self.dragging = false;
                if let Some(result) = self.controller.slider_end_drag() {
                    self.report(result);
                }
            }
        }
    }

    /// Manual scroll
    pub fn scroll_by(&mut self, delta: i64) {
        let max = self.metrics().max_scroll();
        let position = (self.scroller.current() + delta).clamp(0, max);
        self.scroller.set_scroll(position);
        let metrics = self.metrics();
        self.controller.on_scroll(metrics);
    }
}
