//! Presentation view
//!
//! Full-screen reader for one saved sermon with a speaking timer.
//!
//! ## Layout
//!
//! - Header: title, passage, clock and save/generation indicators
//! - Progress bar labelled with the current section
//! - Section markers
//! - Document: presentation lines (or the full outline) following the timer
//! - Status bar / edit input
//!
//! ## Keys
//!
//! - space: start / pause the timer
//! - r: reset the timer
//! - j/k, ↑/↓, PgUp/PgDn: scroll (stops following)
//! - f: follow the current section again
//! - p: toggle presentation lines and full outline
//! - t: next theme (persisted)
//! - e: edit a field as `<path> <value>`
//! - ?: help
//! - q, Esc: quit
//!
//! Missing presentation data is generated in the background when a model key
//! is configured; edits re-trigger it after a short debounce. Repository
//! writes also run in the background, one at a time, so the clock keeps
//! redrawing while a save is in flight.

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use sermon_core::draft::PresentationTicket;
use sermon_core::{
    Config, GeminiBackend, GenerationResult, HttpCollection, OutlineGenerator,
    PresentationOutline, RepositoryResult, SermonOutline, SermonRepository, ThemeStore,
};

use crate::commands::{open_generator, open_repository};
use app::{App, InputMode};

type Generator = Arc<OutlineGenerator<GeminiBackend>>;
type SharedRepository = Arc<Mutex<SermonRepository<HttpCollection>>>;

/// Completion of a spawned task
enum Background {
    /// A presentation rewrite finished
    Presentation {
        ticket: PresentationTicket,
        result: GenerationResult<PresentationOutline>,
    },
    /// A repository write finished
    Saved(RepositoryResult<()>),
}

/// Everything the event loop needs besides the view state
struct Session {
    repo: SharedRepository,
    generator: Option<Generator>,
    themes: ThemeStore,
    events_tx: mpsc::UnboundedSender<Background>,
}

/// Run the presentation view for one sermon
pub async fn run(config: Config, id: i64) -> Result<()> {
    init_present_logging(&config);

    let repo = open_repository(&config).await?;
    let sermon = repo
        .get(id)
        .cloned()
        .with_context(|| format!("Sermon not found: {}. Run `sermon list` to see IDs.", id))?;

    let generator = match open_generator(&config) {
        Ok(generator) => Some(Arc::new(generator)),
        Err(e) => {
            warn!("Presentation data cannot be generated: {:#}", e);
            None
        }
    };

    let themes = ThemeStore::new(&config.data_dir);
    let mut app = App::new(sermon, themes.load(), config.timer.budget());
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let session = Session {
        repo: Arc::new(Mutex::new(repo)),
        generator,
        themes,
        events_tx,
    };

    if app.draft.presentation().is_none() {
        if session.generator.is_some() {
            spawn_presentation(&mut app, &session);
        } else {
            app.set_status("No presentation data, showing the full outline");
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_app(&mut terminal, &mut app, &session, events_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &Session,
    mut events_rx: mpsc::UnboundedReceiver<Background>,
) -> Result<()> {
    loop {
        let now = Instant::now();
        app.tick(now);
        app.check_status_timeout();
        // Locked only while a write is in flight; keep the last value then
        if let Ok(repo) = session.repo.try_lock() {
            app.saved_indicator = repo.show_saved_indicator(now);
        }
        if app.follow {
            if let Some(scroll) = ui::follow_scroll(app, terminal.size()?.width) {
                app.scroll = scroll;
            }
        }

        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            Some(event) = events_rx.recv() => match event {
                Background::Presentation { ticket, result } => {
                    finish_presentation(app, session, ticket, result);
                }
                Background::Saved(result) => finish_save(app, session, result),
            },

            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if app.draft.regeneration_due(Instant::now()) && session.generator.is_some() {
                    spawn_presentation(app, session);
                }

                // Check for terminal events (non-blocking)
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        // If error modal is showing, any key dismisses it
                        if app.has_error() {
                            app.clear_error();
                            continue;
                        }

                        // If help is showing, any key dismisses it
                        if app.show_help {
                            app.show_help = false;
                            continue;
                        }

                        let page = terminal.size()?.height.saturating_sub(6).max(1);
                        match app.input_mode {
                            InputMode::Normal => {
                                handle_normal_mode(app, session, key.code, key.modifiers, page)
                            }
                            InputMode::Edit => handle_edit_mode(app, session, key.code),
                        }
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    flush_saves(terminal, app, session, &mut events_rx).await
}

/// Wait for the in-flight write and any queued one before leaving
async fn flush_saves<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &Session,
    events_rx: &mut mpsc::UnboundedReceiver<Background>,
) -> Result<()> {
    let mut last_error = None;
    while app.is_saving() {
        app.set_status("Saving...");
        terminal.draw(|frame| ui::draw(frame, app))?;

        match events_rx.recv().await {
            Some(Background::Saved(result)) => {
                if let Err(e) = result {
                    warn!("Failed to save sermon on exit: {}", e);
                    last_error = Some(e);
                }
                if app.finish_save() {
                    spawn_save(app, session);
                }
            }
            // Late rewrites are dropped on exit
            Some(Background::Presentation { .. }) => {}
            None => break,
        }
    }

    match last_error {
        Some(e) => Err(anyhow!("Failed to save sermon: {}", e)),
        None => Ok(()),
    }
}

fn handle_normal_mode(
    app: &mut App,
    session: &Session,
    code: KeyCode,
    modifiers: KeyModifiers,
    page: u16,
) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char(' ') => app.toggle_timer(Instant::now()),
        KeyCode::Char('r') => app.reset_timer(),

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::PageDown => app.page_down(page),
        KeyCode::PageUp => app.page_up(page),
        KeyCode::Char('f') => app.toggle_follow(),
        KeyCode::Char('p') => app.toggle_view(),

        KeyCode::Char('t') => {
            let theme = app.cycle_theme();
            match session.themes.save(theme) {
                Ok(()) => app.set_status(format!("Theme: {}", theme)),
                Err(e) => {
                    warn!("Failed to persist theme: {}", e);
                    app.set_status(format!("Theme: {} (not saved)", theme));
                }
            }
        }

        KeyCode::Char('e') => app.enter_edit_mode(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

fn handle_edit_mode(app: &mut App, session: &Session, code: KeyCode) {
    match code {
        KeyCode::Esc => app.exit_edit_mode(),
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.exit_edit_mode();
            if input.trim().is_empty() {
                return;
            }
            match app.apply_command_edit(&input, Instant::now()) {
                Ok(field) => {
                    info!("Edited {} in presentation view", field);
                    save_draft(app, session);
                }
                Err(e) => app.set_error(e),
            }
        }
        KeyCode::Backspace => app.delete_char_before(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Start a background rewrite of the current outline
fn spawn_presentation(app: &mut App, session: &Session) {
    let Some(generator) = session.generator.clone() else {
        return;
    };
    let Some(ticket) = app.draft.begin_presentation() else {
        return;
    };

    let outline: SermonOutline = app.draft.outline().clone();
    let events_tx = session.events_tx.clone();
    debug!("Spawning presentation generation");
    tokio::spawn(async move {
        let result = generator.generate_presentation(&outline).await;
        // The view may already be gone
        let _ = events_tx.send(Background::Presentation { ticket, result });
    });
}

fn finish_presentation(
    app: &mut App,
    session: &Session,
    ticket: PresentationTicket,
    result: GenerationResult<PresentationOutline>,
) {
    match result {
        Ok(presentation) => {
            if app.draft.complete_presentation(ticket, presentation) {
                app.set_status("Presentation data ready");
                save_draft(app, session);
            }
        }
        Err(e) => {
            app.draft.abandon_presentation(ticket);
            warn!("Presentation generation failed: {}", e);
            let hint = e
                .recovery_suggestion()
                .map(|h| format!(" ({})", h))
                .unwrap_or_default();
            app.set_status(format!("Presentation data unavailable: {}{}", e, hint));
        }
    }
}

/// Persist the draft, or queue it behind the write already in flight
fn save_draft(app: &mut App, session: &Session) {
    if app.request_save() {
        spawn_save(app, session);
    }
}

/// Write the current draft from a background task
///
/// The repository rolls back its snapshot if the write fails.
fn spawn_save(app: &App, session: &Session) {
    let repo = Arc::clone(&session.repo);
    let sermon = app.draft.to_saved();
    let events_tx = session.events_tx.clone();
    debug!("Spawning save of sermon {}", sermon.id);
    tokio::spawn(async move {
        let result = repo.lock().await.replace_sermon(sermon).await;
        let _ = events_tx.send(Background::Saved(result));
    });
}

fn finish_save(app: &mut App, session: &Session, result: RepositoryResult<()>) {
    if let Err(e) = result {
        warn!("Failed to save sermon: {}", e);
        let message = match e.recovery_suggestion() {
            Some(hint) => format!("Failed to save: {}\n{}", e, hint),
            None => format!("Failed to save: {}", e),
        };
        app.set_error(message);
    }
    if app.finish_save() {
        spawn_save(app, session);
    }
}

/// File logging for the presentation view
///
/// The terminal belongs to the view, so logs go to `present_log_path`.
/// Level comes from SERMON_LOG (default: info).
fn init_present_logging(config: &Config) {
    let level = std::env::var("SERMON_LOG").unwrap_or_else(|_| "info".to_string());
    let log_path = config.present_log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::try_new(format!("sermon_core={},sermon_cli={}", level, level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Presentation logging initialized to {:?}", log_path);
}
