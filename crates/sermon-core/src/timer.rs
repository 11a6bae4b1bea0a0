//! Speaker timer for presentation mode
//!
//! A sermon has a fixed speaking budget split across its sections: the
//! introduction takes the opening minutes, each development point a fixed
//! slot in order, and the conclusion the closing minutes. [`SectionTimer`]
//! tracks elapsed time against that budget.
//!
//! The timer never counts ticks. Every call takes the current monotonic
//! instant and elapsed time is `now - activated_at + accumulated`, so a host
//! that redraws irregularly still reports accurate time.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::models::SermonOutline;

pub const INTRODUCTION_LABEL: &str = "Introdução";
pub const CONCLUSION_LABEL: &str = "Conclusão";
pub const COMPLETED_LABEL: &str = "Concluído";

pub const INTRODUCTION_ANCHOR: &str = "introduction";
pub const CONCLUSION_ANCHOR: &str = "conclusion";

/// Anchor id of a development point
pub fn point_anchor(point_number: u32) -> String {
    format!("point-{}", point_number)
}

/// How the speaking time is divided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBudget {
    pub total: Duration,
    pub introduction: Duration,
    pub point: Duration,
    pub conclusion: Duration,
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self {
            total: Duration::from_secs(40 * 60),
            introduction: Duration::from_secs(5 * 60),
            point: Duration::from_secs(10 * 60),
            conclusion: Duration::from_secs(5 * 60),
        }
    }
}

impl TimeBudget {
    /// Build a budget from whole minutes
    pub fn from_minutes(total: u64, introduction: u64, point: u64, conclusion: u64) -> Self {
        Self {
            total: minutes(total),
            introduction: minutes(introduction),
            point: minutes(point),
            conclusion: minutes(conclusion),
        }
    }
}

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(60))
}

/// A slice of the speaking time mapped to a document anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSection {
    /// Start offset in seconds
    pub start: u64,
    /// End offset in seconds
    pub end: u64,
    pub label: String,
    pub title: String,
    pub anchor_id: String,
}

impl TimerSection {
    /// Marker caption, e.g. `Ponto 1: A tenda`
    pub fn caption(&self) -> String {
        format!("{}: {}", self.label, self.title)
    }
}

/// Divide the budget across the sections of an outline
///
/// Points run back to back after the introduction; any point that would
/// overlap the conclusion is clamped to the conclusion's start.
pub fn build_sections(outline: &SermonOutline, budget: &TimeBudget) -> Vec<TimerSection> {
    let total = budget.total.as_secs();
    let intro_end = budget.introduction.as_secs().min(total);
    let conclusion_start = total.saturating_sub(budget.conclusion.as_secs()).max(intro_end);
    let point_len = budget.point.as_secs();

    let mut sections = Vec::with_capacity(outline.development.len() + 2);
    sections.push(TimerSection {
        start: 0,
        end: intro_end,
        label: INTRODUCTION_LABEL.to_string(),
        title: outline.introduction.title.clone(),
        anchor_id: INTRODUCTION_ANCHOR.to_string(),
    });

    let mut start = intro_end;
    for point in &outline.development {
        let start_clamped = start.min(conclusion_start);
        let end = start.saturating_add(point_len).min(conclusion_start);
        sections.push(TimerSection {
            start: start_clamped,
            end,
            label: format!("Ponto {}", point.point_number),
            title: point.title.clone(),
            anchor_id: point_anchor(point.point_number),
        });
        start = start.saturating_add(point_len);
    }

    sections.push(TimerSection {
        start: conclusion_start,
        end: total,
        label: CONCLUSION_LABEL.to_string(),
        title: outline.conclusion.title.clone(),
        anchor_id: CONCLUSION_ANCHOR.to_string(),
    });
    sections
}

/// What the speaker should be on at a given moment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentSection<'a> {
    Section(&'a TimerSection),
    Completed,
}

impl<'a> CurrentSection<'a> {
    pub fn label(&self) -> &'a str {
        match self {
            CurrentSection::Section(s) => s.label.as_str(),
            CurrentSection::Completed => COMPLETED_LABEL,
        }
    }

    pub fn anchor_id(&self) -> Option<&'a str> {
        match self {
            CurrentSection::Section(s) => Some(s.anchor_id.as_str()),
            CurrentSection::Completed => None,
        }
    }
}

/// Find the section for an elapsed time
///
/// The current section is the last one whose start is not after `elapsed`.
/// At or past `total` the sermon is completed.
pub fn current_section<'a>(
    sections: &'a [TimerSection],
    elapsed: Duration,
    total: Duration,
) -> Option<CurrentSection<'a>> {
    if elapsed >= total {
        return Some(CurrentSection::Completed);
    }
    if elapsed.is_zero() {
        return sections.first().map(CurrentSection::Section);
    }
    let secs = elapsed.as_secs_f64();
    sections
        .iter()
        .rev()
        .find(|s| s.start as f64 <= secs)
        .map(CurrentSection::Section)
}

/// Share of the budget already spoken, in percent
pub fn progress_percent(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 100.0;
    }
    (100.0 * elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 100.0)
}

/// A point on the progress bar where a section ends
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerMarker {
    /// Offset in seconds
    pub at: u64,
    pub caption: String,
    pub passed: bool,
}

/// Markers for every section end
pub fn markers(sections: &[TimerSection], elapsed: Duration) -> Vec<TimerMarker> {
    sections
        .iter()
        .map(|s| TimerMarker {
            at: s.end,
            caption: s.caption(),
            passed: elapsed >= Duration::from_secs(s.end),
        })
        .collect()
}

/// Render a duration as `MM:SS`
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Timer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Elapsed is zero and the clock is stopped
    Idle,
    /// The clock advances from `activated_at`
    Running {
        activated_at: Instant,
        accumulated: Duration,
    },
    /// Elapsed is frozen until resumed
    Paused { elapsed: Duration },
    /// The full budget has been used; only reset leaves this state
    Completed,
}

/// Elapsed-time tracker for one presentation
#[derive(Debug, Clone)]
pub struct SectionTimer {
    total: Duration,
    state: TimerState,
}

impl SectionTimer {
    pub fn new(total: Duration) -> Self {
        Self {
            total,
            state: TimerState::Idle,
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, TimerState::Completed)
    }

    /// Start from idle or resume from pause
    ///
    /// Has no effect while running or completed.
    pub fn start(&mut self, now: Instant) {
        let accumulated = match self.state {
            TimerState::Idle => Duration::ZERO,
            TimerState::Paused { elapsed } => elapsed,
            TimerState::Running { .. } | TimerState::Completed => return,
        };
        self.state = TimerState::Running {
            activated_at: now,
            accumulated,
        };
    }

    /// Freeze elapsed time
    pub fn pause(&mut self, now: Instant) {
        if let TimerState::Running { .. } = self.state {
            let elapsed = self.elapsed(now);
            self.state = if elapsed >= self.total {
                TimerState::Completed
            } else {
                TimerState::Paused { elapsed }
            };
        }
    }

    /// Start or pause depending on the current state
    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.pause(now);
        } else {
            self.start(now);
        }
    }

    /// Back to idle with zero elapsed
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
    }

    /// Elapsed time at `now`, capped at the total
    pub fn elapsed(&self, now: Instant) -> Duration {
        let elapsed = match self.state {
            TimerState::Idle => Duration::ZERO,
            TimerState::Running {
                activated_at,
                accumulated,
            } => now.saturating_duration_since(activated_at) + accumulated,
            TimerState::Paused { elapsed } => elapsed,
            TimerState::Completed => self.total,
        };
        elapsed.min(self.total)
    }

    /// Advance the state machine and return the elapsed time
    ///
    /// Switches to completed once the total is reached.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let elapsed = self.elapsed(now);
        if self.is_running() && elapsed >= self.total {
            tracing::debug!("Section timer completed");
            self.state = TimerState::Completed;
        }
        elapsed
    }

    /// Remaining time at `now`
    pub fn remaining(&self, now: Instant) -> Duration {
        self.total.saturating_sub(self.elapsed(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_outline;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn label_at(sections: &[TimerSection], elapsed: u64) -> String {
        current_section(sections, secs(elapsed), secs(2400))
            .unwrap()
            .label()
            .to_string()
    }

    /// Anchor borrowed from the section slice, not from the lookup result
    fn anchor_at(sections: &[TimerSection], elapsed: u64) -> Option<&str> {
        current_section(sections, secs(elapsed), secs(2400)).and_then(|s| s.anchor_id())
    }

    #[test]
    fn test_anchor_outlives_lookup() {
        let sections = build_sections(&sample_outline(), &TimeBudget::default());
        assert_eq!(anchor_at(&sections, 0), Some("introduction"));
        assert_eq!(anchor_at(&sections, 950), Some("point-2"));
        assert_eq!(anchor_at(&sections, 2400), None);

        let label: &str = current_section(&sections, secs(2400), secs(2400))
            .unwrap()
            .label();
        assert_eq!(label, "Concluído");
    }

    #[test]
    fn test_budget_from_huge_minutes_saturates() {
        let budget = TimeBudget::from_minutes(u64::MAX, 5, u64::MAX / 2, 5);
        assert_eq!(budget.total, Duration::from_secs(u64::MAX));
        assert_eq!(budget.point, Duration::from_secs(u64::MAX));
        assert_eq!(budget.introduction, Duration::from_secs(300));

        let sections = build_sections(&sample_outline(), &budget);
        assert_eq!(sections.len(), 5);
        assert_eq!(sections[3].end, sections[4].start);
    }

    #[test]
    fn test_build_sections_three_points() {
        let sections = build_sections(&sample_outline(), &TimeBudget::default());
        let bounds: Vec<(u64, u64)> = sections.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(
            bounds,
            vec![(0, 300), (300, 900), (900, 1500), (1500, 2100), (2100, 2400)]
        );
        assert_eq!(sections[0].label, "Introdução");
        assert_eq!(sections[2].label, "Ponto 2");
        assert_eq!(sections[2].anchor_id, "point-2");
        assert_eq!(sections[4].anchor_id, "conclusion");
        assert_eq!(sections[1].title, "Ponto 1 título");
    }

    #[test]
    fn test_points_clamped_to_conclusion() {
        let mut outline = sample_outline();
        let mut extra = outline.development[0].clone();
        extra.point_number = 4;
        outline.development.push(extra);

        let sections = build_sections(&outline, &TimeBudget::default());
        assert_eq!(sections[4].label, "Ponto 4");
        assert_eq!((sections[4].start, sections[4].end), (2100, 2100));
        assert_eq!(label_at(&sections, 2200), "Conclusão");
    }

    #[test]
    fn test_section_lookup() {
        let sections = build_sections(&sample_outline(), &TimeBudget::default());
        assert_eq!(label_at(&sections, 0), "Introdução");
        assert_eq!(label_at(&sections, 299), "Introdução");
        assert_eq!(label_at(&sections, 301), "Ponto 1");
        assert_eq!(label_at(&sections, 1500), "Ponto 3");
        assert_eq!(label_at(&sections, 2099), "Ponto 3");
        assert_eq!(label_at(&sections, 2100), "Conclusão");
        assert_eq!(label_at(&sections, 2399), "Conclusão");
        assert_eq!(
            current_section(&sections, secs(2400), secs(2400)),
            Some(CurrentSection::Completed)
        );
    }

    #[test]
    fn test_lookup_fractional_elapsed() {
        let sections = build_sections(&sample_outline(), &TimeBudget::default());
        let current =
            current_section(&sections, Duration::from_millis(299_999), secs(2400)).unwrap();
        assert_eq!(current.anchor_id(), Some("introduction"));
    }

    #[test]
    fn test_lookup_empty_sections() {
        assert_eq!(current_section(&[], secs(0), secs(2400)), None);
        assert_eq!(
            current_section(&[], secs(2400), secs(2400)),
            Some(CurrentSection::Completed)
        );
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(secs(1200), secs(2400)), 50.0);
        assert_eq!(progress_percent(secs(0), secs(2400)), 0.0);
        assert_eq!(progress_percent(secs(5000), secs(2400)), 100.0);
    }

    #[test]
    fn test_markers() {
        let sections = build_sections(&sample_outline(), &TimeBudget::default());
        let marks = markers(&sections, secs(900));
        assert_eq!(marks.len(), 5);
        assert_eq!(marks[0].at, 300);
        assert_eq!(marks[0].caption, "Introdução: Introdução");
        assert!(marks[0].passed);
        assert!(marks[1].passed);
        assert!(!marks[2].passed);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(secs(0)), "00:00");
        assert_eq!(format_clock(secs(65)), "01:05");
        assert_eq!(format_clock(secs(2400)), "40:00");
    }

    #[test]
    fn test_timer_start_pause_resume() {
        let t0 = Instant::now();
        let mut timer = SectionTimer::new(secs(2400));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.elapsed(t0), Duration::ZERO);

        timer.start(t0);
        assert_eq!(timer.tick(t0 + secs(10)), secs(10));

        timer.pause(t0 + secs(10));
        assert_eq!(timer.state(), TimerState::Paused { elapsed: secs(10) });
        // Time passing while paused is not counted
        assert_eq!(timer.tick(t0 + secs(100)), secs(10));

        timer.start(t0 + secs(100));
        assert_eq!(timer.tick(t0 + secs(105)), secs(15));
    }

    #[test]
    fn test_elapsed_uses_clock_not_ticks() {
        let t0 = Instant::now();
        let mut timer = SectionTimer::new(secs(2400));
        timer.start(t0);
        // A single late tick still sees the full wall-clock delta
        assert_eq!(timer.tick(t0 + secs(600)), secs(600));
    }

    #[test]
    fn test_timer_completes() {
        let t0 = Instant::now();
        let mut timer = SectionTimer::new(secs(2400));
        timer.start(t0);

        assert_eq!(timer.tick(t0 + secs(2500)), secs(2400));
        assert!(timer.is_completed());
        assert!(!timer.is_running());

        // Not resumable without reset
        timer.start(t0 + secs(2600));
        assert!(timer.is_completed());
        assert_eq!(timer.remaining(t0 + secs(2600)), Duration::ZERO);

        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.elapsed(t0 + secs(2700)), Duration::ZERO);
    }

    #[test]
    fn test_reset_from_running() {
        let t0 = Instant::now();
        let mut timer = SectionTimer::new(secs(60));
        timer.toggle(t0);
        assert!(timer.is_running());
        timer.reset();
        assert_eq!(timer.tick(t0 + secs(30)), Duration::ZERO);
    }
}
