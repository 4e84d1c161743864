//! Navigation controller
//!
//! Owns the committed `PaginationState` and the displayed content, and drives
//! the slider, fragment sync, selection and transitions. It performs no I/O:
//! fetches, link opening and scrolling go out as `Command`s, and results come
//! back through `on_fragment_loaded` and `tick`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rollarchive_core::config::{AnimationConfig, AppConfig};
use rollarchive_core::protocol::SEARCH_PARAM;
use rollarchive_core::{
    AddressFragment, ArchiveQuery, Error as CoreError, Fragment, FragmentRequest, PagePosition, PaginationState,
    RequestId, SettingsStore, StickyEdge,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::selection::{SelectionNavigator, StepOutcome};
use crate::slider::{PageSlider, SliderEvent, SliderOptions};
use crate::sync::{AddressBar, FragmentChange, FragmentSync};
use crate::tracker::ScrollPositionTracker;
use crate::transition::{PageTransition, TransitionFrame, TransitionPhase};
use crate::viewport::{ItemBox, ScrollMetrics};
use crate::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Loading,
    Animating,
    Error,
}

/// Work the host performs on the controller's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch a fragment and report back through `on_fragment_loaded`
    Fetch(FragmentRequest),
    /// Open a link outside the archive view
    Open(String),
    /// Scroll the archive view; report completion through `scroll_settled`
    ScrollTo(i64),
}

/// Why a page request was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("advanced navigation is disabled")]
    Disabled,
    #[error("archive state not loaded")]
    NotReady,
    #[error("archive has a single page")]
    NotPaginated,
    #[error("page {0} is out of range")]
    OutOfRange(i64),
    #[error("already on page {0}")]
    SamePage(u32),
}

/// What an accepted page request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Issued(RequestId),
    /// Went back to the committed page, dropping the request in flight
    Cancelled,
}

/// Where a page request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    Slider,
    Hotkey,
    /// Selection ran off the page in this direction
    Overflow(Direction),
    Fragment,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub animation: AnimationConfig,
    /// `None` waits forever
    pub request_timeout: Option<Duration>,
    pub scroll_offset: i64,
    pub scroll_tolerance: i64,
    pub sticky_edge: StickyEdge,
}

impl ControllerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let nav = &config.navigation;
        Self {
            animation: config.animation.clone(),
            request_timeout: (nav.request_timeout_secs > 0)
                .then(|| Duration::from_secs(nav.request_timeout_secs)),
            scroll_offset: nav.scroll_offset,
            scroll_tolerance: nav.scroll_tolerance,
            sticky_edge: nav.sticky_edge,
        }
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Everything the navigation chrome needs to draw itself
#[derive(Debug, Clone, PartialEq)]
pub struct ChromeView {
    pub visible: bool,
    pub position: PagePosition,
    pub page_counter: String,
    pub date_label: Option<String>,
    /// Date of the page under the slider handle while dragging
    pub hover_label: Option<String>,
    pub loading: bool,
    pub slider_fraction: f64,
    pub trim_label: String,
    pub older_label: String,
    pub newer_label: String,
    pub sticky: bool,
    pub error: Option<String>,
}

struct ActiveRequest {
    id: RequestId,
    target: u32,
    origin: RequestOrigin,
    /// Query change: the response must carry fresh state
    needs_state: bool,
    issued: Instant,
}

struct ActiveTransition {
    animation: PageTransition,
    frame: Option<TransitionFrame>,
    state: PaginationState,
    html: String,
    seed: Option<Direction>,
    from_bootstrap: bool,
}

struct Snapshot {
    state: PaginationState,
    html: String,
}

pub struct NavigationController {
    settings: Arc<dyn SettingsStore>,
    options: ControllerOptions,
    state: ControllerState,
    committed: Option<PaginationState>,
    content: String,
    slider: PageSlider,
    sync: FragmentSync,
    selection: SelectionNavigator,
    tracker: Option<ScrollPositionTracker>,
    snapshot: Option<Snapshot>,
    active: Option<ActiveRequest>,
    transition: Option<ActiveTransition>,
    outbox: VecDeque<Command>,
    items: Vec<ItemBox>,
    metrics: ScrollMetrics,
    /// Cursor to place once the next page's layout is known
    pending_seed: Option<Direction>,
    trimmed: bool,
    hover_label: Option<String>,
    sticky: bool,
    last_error: Option<String>,
}

impl NavigationController {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        options: ControllerOptions,
        address: Box<dyn AddressBar>,
    ) -> Self {
        let selection = SelectionNavigator::new(options.scroll_offset, options.scroll_tolerance);
        Self {
            settings,
            options,
            state: ControllerState::Idle,
            committed: None,
            content: String::new(),
            slider: PageSlider::new(SliderOptions {
                minimum: 1,
                maximum: 1,
                initial_value: 1,
            }),
            sync: FragmentSync::new(address),
            selection,
            tracker: None,
            snapshot: None,
            active: None,
            transition: None,
            outbox: VecDeque::new(),
            items: Vec::new(),
            metrics: ScrollMetrics::default(),
            pending_seed: None,
            trimmed: false,
            hover_label: None,
            sticky: false,
            last_error: None,
        }
    }

    /// Take over the initial page and follow an address fragment that points elsewhere
    pub fn bootstrap(&mut self, state: PaginationState, html: String) {
        info!(
            "Archive loaded at page {} of {}",
            state.current_page(),
            state.page_count()
        );
        self.capture_snapshot(&state, &html);
        self.install(state, html);
        self.state = ControllerState::Idle;

        let fragment = self.sync.current();
        let change = FragmentChange {
            page: fragment.page(),
            search: fragment.search().map(str::to_string),
        };
        if !change.is_default_view() {
            self.follow_fragment(change);
        }
    }

    // --- Queries ---

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn committed(&self) -> Option<&PaginationState> {
        self.committed.as_ref()
    }

    pub fn current_page(&self) -> Option<u32> {
        self.committed.as_ref().map(PaginationState::current_page)
    }

    pub fn slider(&self) -> &PageSlider {
        &self.slider
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.selected()
    }

    pub fn is_loading(&self) -> bool {
        self.state == ControllerState::Loading
    }

    pub fn is_trimmed(&self) -> bool {
        self.trimmed
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn address_fragment(&self) -> AddressFragment {
        self.sync.current()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Markup currently on screen: the incoming page during the second half of a transition
    pub fn displayed_html(&self) -> &str {
        match &self.transition {
            Some(t) if t.animation.phase() == TransitionPhase::Incoming => &t.html,
            _ => &self.content,
        }
    }

    pub fn transition_frame(&self) -> Option<TransitionFrame> {
        self.transition.as_ref().and_then(|t| t.frame)
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        self.outbox.drain(..).collect()
    }

    /// Chrome is shown only for a paginated archive with the feature enabled
    pub fn is_chrome_visible(&self) -> bool {
        self.settings.advanced_navigation_enabled()
            && self.committed.as_ref().is_some_and(PaginationState::is_paginated)
    }

    pub fn chrome(&self) -> ChromeView {
        let strings = self.settings.strings();
        let (position, page_counter, date_label) = match &self.committed {
            Some(state) => {
                let page = state.page_for_slider(self.slider.value());
                (
                    state.position(page),
                    strings.page_counter(page, state.page_count()),
                    state.date_label(page).map(str::to_string),
                )
            }
            None => (PagePosition::OnlyPage, String::new(), None),
        };
        ChromeView {
            visible: self.is_chrome_visible(),
            position,
            page_counter,
            date_label,
            hover_label: self.hover_label.clone(),
            loading: self.is_loading(),
            slider_fraction: self.slider.fraction(),
            trim_label: if self.trimmed {
                strings.untrim.clone()
            } else {
                strings.trim.clone()
            },
            older_label: strings.older.clone(),
            newer_label: strings.newer.clone(),
            sticky: self.sticky,
            error: self.last_error.clone(),
        }
    }

    // --- Page requests ---

    /// Go to a page; out-of-range targets are refused
    pub fn go_to_page(&mut self, target: u32) -> Result<RequestOutcome, Rejection> {
        self.request_page(target as i64, RequestOrigin::Hotkey)
    }

    pub fn first_page(&mut self) -> Result<RequestOutcome, Rejection> {
        self.go_to_page(1)
    }

    /// One page towards older posts
    pub fn older(&mut self) -> Option<Result<RequestOutcome, Rejection>> {
        let event = self.slider.set_value_by(-1)?;
        self.handle_slider_event(event, RequestOrigin::Hotkey)
    }

    /// One page towards newer posts
    pub fn newer(&mut self) -> Option<Result<RequestOutcome, Rejection>> {
        let event = self.slider.set_value_by(1)?;
        self.handle_slider_event(event, RequestOrigin::Hotkey)
    }

    pub fn request_page(
        &mut self,
        target: i64,
        origin: RequestOrigin,
    ) -> Result<RequestOutcome, Rejection> {
        // A fragment-driven request already has its target in the address
        self.finish_transition(origin != RequestOrigin::Fragment);

        let result = self.validate(target, origin).map(|target| {
            let committed_page = self.current_page().unwrap_or(1);
            if self.active.is_some() && target == committed_page {
                self.cancel_active();
                RequestOutcome::Cancelled
            } else {
                RequestOutcome::Issued(self.issue(target, origin, None))
            }
        });

        if let Err(ref rejection) = result {
            debug!("Page request refused: {}", rejection);
            self.sync_slider();
        }
        result
    }

    fn validate(&self, target: i64, origin: RequestOrigin) -> Result<u32, Rejection> {
        if !self.settings.advanced_navigation_enabled() {
            return Err(Rejection::Disabled);
        }
        let state = self.committed.as_ref().ok_or(Rejection::NotReady)?;
        if !state.is_paginated() {
            return Err(Rejection::NotPaginated);
        }

        let target = match origin {
            RequestOrigin::Overflow(_) => state.clamp_page(target).ok_or(Rejection::NotPaginated)?,
            _ if target < 1 || target > state.page_count() as i64 => {
                return Err(Rejection::OutOfRange(target))
            }
            _ => target as u32,
        };

        let effective = self
            .active
            .as_ref()
            .map(|active| active.target)
            .unwrap_or(state.current_page());
        if target == effective {
            return Err(Rejection::SamePage(target));
        }
        Ok(target)
    }

    /// Change the search filter; the response brings a fresh state for the new query
    pub fn search(&mut self, term: Option<&str>, page: u32) -> Result<RequestOutcome, Rejection> {
        self.search_from(term, page, RequestOrigin::Hotkey)
    }

    fn search_from(
        &mut self,
        term: Option<&str>,
        page: u32,
        origin: RequestOrigin,
    ) -> Result<RequestOutcome, Rejection> {
        if !self.settings.advanced_navigation_enabled() {
            return Err(Rejection::Disabled);
        }
        self.finish_transition(origin != RequestOrigin::Fragment);
        let mut query = self
            .committed
            .as_ref()
            .ok_or(Rejection::NotReady)?
            .query()
            .clone();
        match term.map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => query.insert(SEARCH_PARAM.to_string(), term.to_string()),
            None => query.remove(SEARCH_PARAM),
        };
        Ok(RequestOutcome::Issued(self.issue(page.max(1), origin, Some(query))))
    }

    fn issue(&mut self, target: u32, origin: RequestOrigin, query: Option<ArchiveQuery>) -> RequestId {
        let needs_state = query.is_some();
        let request = match query {
            Some(query) => FragmentRequest::with_state(target, query),
            None => {
                let query = self
                    .committed
                    .as_ref()
                    .map(|s| s.query().clone())
                    .unwrap_or_default();
                FragmentRequest::new(target, query)
            }
        };
        let id = request.request_id;
        debug!("Requesting page {} ({:?})", target, origin);

        self.active = Some(ActiveRequest {
            id,
            target,
            origin,
            needs_state,
            issued: Instant::now(),
        });
        self.state = ControllerState::Loading;
        self.last_error = None;
        self.pending_seed = None;
        if !needs_state {
            if let Some(state) = &self.committed {
                self.slider.set_value(state.slider_value_for(target));
            }
        }
        self.outbox.push_back(Command::Fetch(request));
        id
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("Dropped request for page {}", active.target);
        }
        self.state = ControllerState::Idle;
        self.hover_label = None;
        self.sync_slider();
    }

    /// Put the slider back on the page being shown or fetched
    fn sync_slider(&mut self) {
        if let Some(state) = &self.committed {
            let page = self
                .active
                .as_ref()
                .filter(|active| !active.needs_state)
                .map(|active| active.target)
                .unwrap_or(state.current_page());
            self.slider.set_value(state.slider_value_for(page));
        }
    }

    // --- Slider ---

    pub fn slider_begin_drag(&mut self) {
        self.slider.begin_drag();
    }

    pub fn slider_drag_to(&mut self, fraction: f64) {
        if let Some(event) = self.slider.drag_to(fraction) {
            self.handle_slider_event(event, RequestOrigin::Slider);
        }
    }

    pub fn slider_end_drag(&mut self) -> Option<Result<RequestOutcome, Rejection>> {
        match self.slider.end_drag() {
            Some(event) => self.handle_slider_event(event, RequestOrigin::Slider),
            None => {
                self.hover_label = None;
                None
            }
        }
    }

    pub fn slider_click(&mut self, fraction: f64) -> Option<Result<RequestOutcome, Rejection>> {
        let event = self.slider.click_at(fraction)?;
        self.handle_slider_event(event, RequestOrigin::Slider)
    }

    fn handle_slider_event(
        &mut self,
        event: SliderEvent,
        origin: RequestOrigin,
    ) -> Option<Result<RequestOutcome, Rejection>> {
        let state = self.committed.as_ref()?;
        match event {
            SliderEvent::Slide(value) => {
                let page = state.page_for_slider(value);
                self.hover_label = state.date_label(page).map(str::to_string);
                None
            }
            SliderEvent::Change(value) => {
                let page = state.page_for_slider(value);
                Some(self.request_page(page as i64, origin))
            }
        }
    }

    // --- Responses and time ---

    /// Deliver a fetch result; results for superseded requests are dropped
    pub fn on_fragment_loaded(&mut self, id: RequestId, result: rollarchive_core::Result<Fragment>) {
        if !self.active.as_ref().is_some_and(|active| active.id == id) {
            debug!("Discarding stale response {}", id);
            return;
        }
        let Some(active) = self.active.take() else {
            return;
        };
        self.hover_label = None;

        let fragment = match result {
            Ok(fragment) => fragment,
            Err(e) => return self.fail(&active, e),
        };

        let from_bootstrap = fragment.state.is_some();
        let new_state = match fragment.state {
            Some(state) => state,
            None if active.needs_state => return self.fail(&active, CoreError::MissingBootstrap),
            None => match self.committed.as_ref().map(|s| s.with_page(active.target)) {
                Some(Ok(state)) => state,
                Some(Err(e)) => return self.fail(&active, e),
                None => return self.fail(&active, CoreError::MissingBootstrap),
            },
        };

        let seed = match active.origin {
            RequestOrigin::Overflow(direction) => Some(direction),
            _ => None,
        };

        if self.settings.animations_enabled() {
            let previous = self.current_page().unwrap_or(1);
            let direction = Direction::between(previous, new_state.current_page());
            self.transition = Some(ActiveTransition {
                animation: PageTransition::new(direction, &self.options.animation, Instant::now()),
                frame: None,
                state: new_state,
                html: fragment.html,
                seed,
                from_bootstrap,
            });
            self.state = ControllerState::Animating;
        } else {
            self.commit(new_state, fragment.html, seed, from_bootstrap, true);
        }
    }

    fn fail(&mut self, active: &ActiveRequest, error: CoreError) {
        warn!("Loading page {} failed: {}", active.target, error);
        self.state = ControllerState::Error;
        self.last_error = Some(error.to_string());
        self.hover_label = None;
        self.sync_slider();
    }

    /// Advance transitions and expire requests that outlived the timeout
    pub fn tick(&mut self, now: Instant) {
        if let (Some(active), Some(timeout)) = (&self.active, self.options.request_timeout) {
            if now.saturating_duration_since(active.issued) >= timeout {
                if let Some(active) = self.active.take() {
                    self.fail(&active, CoreError::Timeout(timeout.as_millis() as u64));
                }
            }
        }

        if let Some(transition) = self.transition.as_mut() {
            transition.frame = transition.animation.update(now);
            if transition.frame.is_none() {
                self.finish_transition(true);
            }
        }
    }

    /// Commit a running transition at once; `record` writes its page to the address
    fn finish_transition(&mut self, record: bool) {
        if let Some(t) = self.transition.take() {
            self.commit(t.state, t.html, t.seed, t.from_bootstrap, record);
        }
    }

    fn commit(
        &mut self,
        state: PaginationState,
        html: String,
        seed: Option<Direction>,
        from_bootstrap: bool,
        record: bool,
    ) {
        info!(
            "Showing page {} of {}",
            state.current_page(),
            state.page_count()
        );
        if state.current_page() == 1 {
            self.trimmed = false;
        }
        if from_bootstrap {
            self.capture_snapshot(&state, &html);
        }
        if record {
            self.sync.commit_page(
                state.current_page(),
                state.query().get(SEARCH_PARAM).map(String::as_str),
            );
        }
        self.install(state, html);
        self.pending_seed = seed;
        self.state = ControllerState::Idle;
    }

    fn install(&mut self, state: PaginationState, html: String) {
        self.slider.set_bounds(1, state.page_count().max(1));
        self.slider.set_value(state.slider_value());
        self.committed = Some(state);
        self.content = html;
        self.items.clear();
        self.selection.clear();
    }

    fn capture_snapshot(&mut self, state: &PaginationState, html: &str) {
        if self.snapshot.is_none() && state.current_page() == 1 && !state.has_filter() {
            debug!("Captured original archive view");
            self.snapshot = Some(Snapshot {
                state: state.clone(),
                html: html.to_string(),
            });
        }
    }

    // --- Restore and address fragment ---

    /// Return to the originally loaded view; false without a snapshot
    pub fn restore(&mut self) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return false;
        };
        let (state, html) = (snapshot.state.clone(), snapshot.html.clone());
        info!("Restoring original archive view");

        self.active = None;
        self.transition = None;
        self.hover_label = None;
        self.last_error = None;
        self.state = ControllerState::Idle;
        self.commit(state, html, None, false, true);
        true
    }

    /// Check for back/forward navigation of the address fragment
    pub fn poll_fragment(&mut self) {
        if let Some(change) = self.sync.poll() {
            self.follow_fragment(change);
        }
    }

    pub fn history_back(&mut self) {
        if self.sync.back() {
            self.poll_fragment();
        }
    }

    pub fn history_forward(&mut self) {
        if self.sync.forward() {
            self.poll_fragment();
        }
    }

    fn follow_fragment(&mut self, change: FragmentChange) {
        if change.is_default_view() {
            if !self.restore() {
                let filtered = self.committed.as_ref().is_some_and(PaginationState::has_filter);
                let result = if filtered {
                    self.search_from(None, 1, RequestOrigin::Fragment)
                } else {
                    self.request_page(1, RequestOrigin::Fragment)
                };
                if let Err(rejection) = result {
                    debug!("Fragment change ignored: {}", rejection);
                }
            }
            return;
        }

        let current_term = self
            .committed
            .as_ref()
            .and_then(|s| s.query().get(SEARCH_PARAM).cloned());
        let result = if change.search != current_term {
            self.search_from(
                change.search.as_deref(),
                change.page.unwrap_or(1),
                RequestOrigin::Fragment,
            )
        } else {
            self.request_page(change.page.unwrap_or(1) as i64, RequestOrigin::Fragment)
        };
        if let Err(rejection) = result {
            debug!("Fragment change ignored: {}", rejection);
        }
    }

    // --- Selection and viewport ---

    /// Host laid out the displayed content
    pub fn set_layout(&mut self, items: Vec<ItemBox>, metrics: ScrollMetrics) {
        self.items = items;
        self.metrics = metrics;
        if let Some(direction) = self.pending_seed.take() {
            if let Some(outcome) = self.selection.seed(direction, &self.items) {
                self.apply_step(outcome);
            }
        }
    }

    /// Place the sticky-edge tracker at the chrome's position
    pub fn set_chrome_top(&mut self, element_top: i64) {
        self.tracker = Some(ScrollPositionTracker::new(element_top, self.options.sticky_edge));
        self.sticky = false;
    }

    /// Manual scroll or resize
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        self.metrics = metrics;
        let visible = self.is_chrome_visible();
        if let Some(tracker) = self.tracker.as_mut() {
            if let Some(sticky) = tracker.update(&metrics, visible) {
                self.sticky = sticky;
            }
        }
        self.selection.on_user_scroll(&metrics);
    }

    /// A programmatic scroll finished
    pub fn scroll_settled(&mut self, target: i64) {
        self.metrics.scroll_top = target;
        self.selection.scroll_settled(target);
    }

    pub fn next_item(&mut self) {
        self.step_selection(Direction::Forward);
    }

    pub fn previous_item(&mut self) {
        self.step_selection(Direction::Backward);
    }

    pub fn step_selection(&mut self, direction: Direction) {
        let outcome = self.selection.step(direction, &self.items, &self.metrics);
        match outcome {
            StepOutcome::Selected { .. } => self.apply_step(outcome),
            StepOutcome::Overflow(direction) => {
                // Overflow moves the slider like the older/newer buttons would
                let Some(SliderEvent::Change(value)) = self.slider.set_value_by(-direction.delta())
                else {
                    return;
                };
                let Some(state) = self.committed.as_ref() else {
                    return;
                };
                let page = state.page_for_slider(value) as i64;
                if let Err(rejection) = self.request_page(page, RequestOrigin::Overflow(direction)) {
                    debug!("Overflow request refused: {}", rejection);
                }
            }
        }
    }

    fn apply_step(&mut self, outcome: StepOutcome) {
        if let StepOutcome::Selected { scroll_to, .. } = outcome {
            self.outbox.push_back(Command::ScrollTo(scroll_to));
        }
    }

    pub fn deselect(&mut self) {
        self.selection.clear();
    }

    pub fn activate_selected(&mut self) {
        let link = self
            .selection
            .selected()
            .and_then(|index| self.items.get(index))
            .and_then(|item| item.link.clone());
        if let Some(link) = link {
            self.outbox.push_back(Command::Open(link));
        }
    }

    pub fn toggle_trim(&mut self) {
        self.trimmed = !self.trimmed;
    }
}
