//! Presentation view state and logic

use std::time::{Duration, Instant};

use sermon_core::document::FieldPath;
use sermon_core::timer::{build_sections, current_section, CurrentSection};
use sermon_core::view::{self, ViewBlock};
use sermon_core::{
    Draft, InvalidPathError, SavedSermon, SectionTimer, SermonOutline, Theme, TimeBudget,
    TimerSection,
};

/// How long status messages stay visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Input mode for the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Timer and scrolling keys
    Normal,
    /// Typing `<path> <value>` to edit a field
    Edit,
}

/// Which version of the outline is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Short presentation lines when available
    Presentation,
    /// Full source outline
    Outline,
}

/// Presentation view state
pub struct App {
    /// Whether the view should exit
    pub should_quit: bool,
    /// Working copy of the sermon
    pub draft: Draft,
    /// Injected display theme
    pub theme: Theme,
    pub timer: SectionTimer,
    budget: TimeBudget,
    pub sections: Vec<TimerSection>,
    /// Elapsed time as of the last tick
    pub elapsed: Duration,
    pub view_mode: ViewMode,
    /// Keep the current section in view
    pub follow: bool,
    /// Scroll offset of the document pane
    pub scroll: u16,
    pub input_mode: InputMode,
    /// Edit input buffer
    pub command_input: String,
    /// Cursor position in the edit input (in chars)
    pub command_cursor: usize,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Error shown in a modal until a key is pressed
    pub error_message: Option<String>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Whether the "saved" indicator is lit
    pub saved_indicator: bool,
    /// A repository write is in flight
    saving: bool,
    /// Another write is wanted once the current one finishes
    save_queued: bool,
}

impl App {
    pub fn new(sermon: SavedSermon, theme: Theme, budget: TimeBudget) -> Self {
        let draft = Draft::from_saved(sermon);
        let sections = build_sections(draft.outline(), &budget);
        Self {
            should_quit: false,
            draft,
            theme,
            timer: SectionTimer::new(budget.total),
            budget,
            sections,
            elapsed: Duration::ZERO,
            view_mode: ViewMode::Presentation,
            follow: true,
            scroll: 0,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            command_cursor: 0,
            status_message: None,
            status_message_time: None,
            error_message: None,
            show_help: false,
            saved_indicator: false,
            saving: false,
            save_queued: false,
        }
    }

    /// Advance the clock to `now`
    pub fn tick(&mut self, now: Instant) {
        let was_running = self.timer.is_running();
        self.elapsed = self.timer.tick(now);
        if was_running && self.timer.is_completed() {
            self.set_status("Tempo esgotado");
        }
    }

    /// Section the speaker is in
    pub fn current_section(&self) -> Option<CurrentSection<'_>> {
        current_section(&self.sections, self.elapsed, self.timer.total())
    }

    /// Anchor the document should follow
    pub fn current_anchor(&self) -> Option<&str> {
        self.current_section().and_then(|s| s.anchor_id())
    }

    /// Outline shown for the current view mode
    ///
    /// Falls back to the source outline while no presentation data exists.
    pub fn displayed_outline(&self) -> &SermonOutline {
        match (self.view_mode, self.draft.presentation()) {
            (ViewMode::Presentation, Some(presentation)) => &presentation.outline,
            _ => self.draft.outline(),
        }
    }

    pub fn blocks(&self) -> Vec<ViewBlock> {
        view::layout(self.displayed_outline())
    }

    /// Start or pause the timer; a completed timer restarts from zero
    pub fn toggle_timer(&mut self, now: Instant) {
        if self.timer.is_completed() {
            self.timer.reset();
        }
        self.timer.toggle(now);
        self.elapsed = self.timer.elapsed(now);
        self.follow = true;
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
        self.elapsed = Duration::ZERO;
        self.scroll = 0;
        self.set_status("Timer reset");
    }

    pub fn scroll_down(&mut self) {
        self.follow = false;
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn page_down(&mut self, rows: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_add(rows);
    }

    pub fn page_up(&mut self, rows: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(rows);
    }

    pub fn toggle_follow(&mut self) {
        self.follow = !self.follow;
        self.set_status(if self.follow {
            "Following the timer"
        } else {
            "Free scrolling"
        });
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Presentation => ViewMode::Outline,
            ViewMode::Outline => ViewMode::Presentation,
        };
        if self.view_mode == ViewMode::Presentation && self.draft.presentation().is_none() {
            self.set_status("No presentation data yet, showing the outline");
        }
    }

    /// Switch to the next theme and return it
    pub fn cycle_theme(&mut self) -> Theme {
        let all = Theme::ALL;
        let index = all.iter().position(|t| *t == self.theme).unwrap_or(0);
        self.theme = all[(index + 1) % all.len()];
        self.theme
    }

    /// Apply a `<path> <value>` edit typed in edit mode
    pub fn apply_command_edit(&mut self, input: &str, now: Instant) -> Result<FieldPath, String> {
        let (path, value) = input
            .trim_start()
            .split_once(char::is_whitespace)
            .ok_or_else(|| "Usage: <path> <value>".to_string())?;
        let field =
            FieldPath::parse(self.draft.outline(), path).map_err(|e: InvalidPathError| e.to_string())?;
        self.draft
            .apply_edit(field, value.trim().replace("\\n", "\n"), now)
            .map_err(|e| e.to_string())?;
        // Titles feed the timer captions
        self.sections = build_sections(self.draft.outline(), &self.budget);
        Ok(field)
    }

    // Edit input handling

    pub fn enter_edit_mode(&mut self) {
        self.input_mode = InputMode::Edit;
        self.command_input.clear();
        self.command_cursor = 0;
    }

    pub fn exit_edit_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command_input.clear();
        self.command_cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_index = self.cursor_byte_index();
        self.command_input.insert(byte_index, c);
        self.command_cursor += 1;
    }

    pub fn delete_char_before(&mut self) {
        if self.command_cursor == 0 {
            return;
        }
        self.command_cursor -= 1;
        let byte_index = self.cursor_byte_index();
        self.command_input.remove(byte_index);
    }

    pub fn cursor_left(&mut self) {
        self.command_cursor = self.command_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.command_cursor = (self.command_cursor + 1).min(self.command_input.chars().count());
    }

    fn cursor_byte_index(&self) -> usize {
        self.command_input
            .char_indices()
            .nth(self.command_cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.command_input.len())
    }

    // Saving

    /// Ask for the draft to be written; true if a write should start now
    ///
    /// Only one write runs at a time. Requests made meanwhile collapse into
    /// a single follow-up write of the latest draft.
    pub fn request_save(&mut self) -> bool {
        if self.saving {
            self.save_queued = true;
            return false;
        }
        self.saving = true;
        true
    }

    /// Record a finished write; true if a queued write should start now
    pub fn finish_save(&mut self) -> bool {
        if std::mem::take(&mut self.save_queued) {
            return true;
        }
        self.saving = false;
        false
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    // Messages

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sermon_core::document::PointField;
    use sermon_core::{PresentationOutline, SermonOutline};
    use sermon_core::models::{
        Conclusion, ContextSection, DevelopmentPoint, IconTag, Introduction,
    };

    fn outline() -> SermonOutline {
        let point = |n: u32| DevelopmentPoint {
            point_number: n,
            title: format!("Ponto {}", n),
            icon: IconTag::Tent,
            argument: "Argumento longo".to_string(),
            subsections: Vec::new(),
            application: "Aplicação".to_string(),
        };
        SermonOutline {
            title: "Título".to_string(),
            theme_and_subtitle: "Tema".to_string(),
            context: ContextSection {
                title: "Contexto".to_string(),
                content: "Texto".to_string(),
            },
            introduction: Introduction {
                title: "Introdução".to_string(),
                hook: "Gancho".to_string(),
            },
            development: vec![point(1), point(2), point(3)],
            conclusion: Conclusion {
                title: "Conclusão".to_string(),
                recap: "Resumo".to_string(),
                appeal_to_believers: "Crentes".to_string(),
                appeal_to_unbelievers: "Descrentes".to_string(),
            },
        }
    }

    fn app() -> App {
        App::new(
            SavedSermon::with_id(1, "Sl 1", outline()),
            Theme::Classic,
            TimeBudget::default(),
        )
    }

    #[test]
    fn test_timer_follows_sections() {
        let mut app = app();
        let t0 = Instant::now();
        assert_eq!(app.current_anchor(), Some("introduction"));

        app.toggle_timer(t0);
        app.tick(t0 + Duration::from_secs(301));
        assert_eq!(app.current_anchor(), Some("point-1"));

        app.tick(t0 + Duration::from_secs(2100));
        assert_eq!(app.current_anchor(), Some("conclusion"));

        app.tick(t0 + Duration::from_secs(2400));
        assert!(app.timer.is_completed());
        assert_eq!(app.current_anchor(), None);
        assert_eq!(app.status_message.as_deref(), Some("Tempo esgotado"));
    }

    #[test]
    fn test_toggle_after_completion_restarts() {
        let mut app = app();
        let t0 = Instant::now();
        app.toggle_timer(t0);
        app.tick(t0 + Duration::from_secs(2500));
        assert!(app.timer.is_completed());

        let t1 = t0 + Duration::from_secs(2600);
        app.toggle_timer(t1);
        assert!(app.timer.is_running());
        assert_eq!(app.elapsed, Duration::ZERO);
    }

    #[test]
    fn test_scrolling_stops_following() {
        let mut app = app();
        assert!(app.follow);
        app.scroll_down();
        assert!(!app.follow);
        assert_eq!(app.scroll, 1);
        app.page_up(10);
        assert_eq!(app.scroll, 0);
        app.toggle_follow();
        assert!(app.follow);
    }

    #[test]
    fn test_view_falls_back_to_outline() {
        let mut app = app();
        assert_eq!(app.displayed_outline().title, "Título");

        let mut short = outline();
        short.title = "Curto".to_string();
        let ticket = app.draft.begin_presentation().unwrap();
        app.draft
            .complete_presentation(ticket, PresentationOutline::new(short));
        assert_eq!(app.displayed_outline().title, "Curto");

        app.toggle_view();
        assert_eq!(app.displayed_outline().title, "Título");
    }

    #[test]
    fn test_cycle_theme() {
        let mut app = app();
        assert_eq!(app.cycle_theme(), Theme::Dark);
        assert_eq!(app.cycle_theme(), Theme::Sepia);
        assert_eq!(app.cycle_theme(), Theme::Classic);
    }

    #[test]
    fn test_command_edit() {
        let mut app = app();
        let t0 = Instant::now();

        let field = app
            .apply_command_edit("development.1.title Novo ponto", t0)
            .unwrap();
        assert_eq!(field, FieldPath::Development(1, PointField::Title));
        assert_eq!(app.draft.outline().development[1].title, "Novo ponto");
        assert_eq!(app.sections[2].title, "Novo ponto");
        assert!(app.draft.regeneration_pending());

        assert!(app.apply_command_edit("development.7.title X", t0).is_err());
        assert!(app.apply_command_edit("title", t0).is_err());
    }

    #[test]
    fn test_saves_run_one_at_a_time() {
        let mut app = app();
        assert!(!app.is_saving());

        assert!(app.request_save());
        assert!(app.is_saving());
        // Edits made during the write collapse into one follow-up
        assert!(!app.request_save());
        assert!(!app.request_save());

        assert!(app.finish_save());
        assert!(app.is_saving());
        assert!(!app.finish_save());
        assert!(!app.is_saving());

        assert!(app.request_save());
    }

    #[test]
    fn test_edit_input_cursor() {
        let mut app = app();
        app.enter_edit_mode();
        for c in "ação".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.delete_char_before();
        assert_eq!(app.command_input, "aço");
        app.cursor_right();
        app.insert_char('!');
        assert_eq!(app.command_input, "aço!");
        app.exit_edit_mode();
        assert!(app.command_input.is_empty());
    }
}
