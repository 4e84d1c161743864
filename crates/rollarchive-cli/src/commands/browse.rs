use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use rollarchive_core::{AppConfig, Fragment, FragmentFetcher, FragmentRequest, HttpFragmentClient, RequestId};
use rollarchive_nav::{
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    transition::AnimationConfigExt,
    widgets, App, Command, ControllerOptions, NavigationController, SessionHistory,
};

use super::search_query;

/// Completed fragment fetch, tagged with the request it answers
type FetchResult = (RequestId, rollarchive_core::Result<Fragment>);

pub async fn run(config: Arc<AppConfig>, search: Option<String>, fragment: Option<String>) -> Result<()> {
    let client = Arc::new(HttpFragmentClient::new(&config.navigation)?);

    // Load the first page before taking over the terminal so failures print normally
    let query = search_query(search.as_deref());
    let initial = client.fetch_bootstrap(&query, 1).await?;
    let state = initial
        .state
        .ok_or_else(|| anyhow!("{} did not return archive state", client.archive_url()))?;

    let history = SessionHistory::new(fragment.as_deref().unwrap_or(""));
    let mut controller = NavigationController::new(
        config.clone(),
        ControllerOptions::from_config(&config),
        Box::new(history),
    );
    controller.bootstrap(state, initial.html);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Rolling Archives"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller, &config);
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    let result = event_loop(&mut terminal, &mut app, &config, client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &AppConfig,
    client: Arc<HttpFragmentClient>,
) -> Result<()> {
    let tick_ms = config.animation.tick_duration().as_millis() as u64;
    let event_handler = EventHandler::new(tick_ms);
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchResult>();

    loop {
        // Completed fetches (non-blocking)
        while let Ok((id, result)) = fetch_rx.try_recv() {
            app.controller.on_fragment_loaded(id, result);
        }

        for command in app.tick(Instant::now()) {
            match command {
                Command::Fetch(request) => spawn_fetch(client.clone(), request, fetch_tx.clone()),
                Command::Open(link) => open_link(app, &client, &link),
                Command::ScrollTo(_) => {}
            }
        }

        terminal.draw(|frame| widgets::render(frame, app))?;

        if let Some(event) = event_handler.next()? {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &app.keymap);
                    app.handle_action(action);
                }
                AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
                AppEvent::Resize(width, height) => app.resize(width, height),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            info!("Leaving archive browser");
            return Ok(());
        }
    }
}

fn spawn_fetch(
    client: Arc<HttpFragmentClient>,
    request: FragmentRequest,
    tx: mpsc::UnboundedSender<FetchResult>,
) {
    tokio::spawn(async move {
        debug!("Fetching page {} ({})", request.target_page, request.request_id);
        let result = client.fetch(&request).await;
        if let Err(e) = &result {
            warn!("Fetch of page {} failed: {}", request.target_page, e);
        }
        // The receiver is gone only after the browser quit
        let _ = tx.send((request.request_id, result));
    });
}

fn open_link(app: &mut App, client: &HttpFragmentClient, link: &str) {
    let url = match client.archive_url().join(link) {
        Ok(url) => url,
        Err(e) => {
            app.set_status(format!("Invalid link {}: {}", link, e));
            return;
        }
    };
    info!("Opening {}", url);
    if let Err(e) = open::that(url.as_str()) {
        app.set_status(format!("Failed to open {}: {}", url, e));
    }
}
