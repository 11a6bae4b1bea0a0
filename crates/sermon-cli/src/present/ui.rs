//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use sermon_core::markup;
use sermon_core::timer::{format_clock, markers, progress_percent};
use sermon_core::view::BlockKind;
use sermon_core::Theme;

use super::app::{App, InputMode, ViewMode};

/// Colors for one theme
#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    emphasis: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Classic => Palette {
            background: Color::Reset,
            text: Color::Reset,
            muted: Color::DarkGray,
            accent: Color::Blue,
            emphasis: Color::Yellow,
        },
        Theme::Dark => Palette {
            background: Color::Black,
            text: Color::Gray,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            emphasis: Color::LightYellow,
        },
        Theme::Sepia => Palette {
            background: Color::Rgb(244, 236, 216),
            text: Color::Rgb(91, 70, 54),
            muted: Color::Rgb(160, 140, 115),
            accent: Color::Rgb(140, 90, 40),
            emphasis: Color::Rgb(170, 60, 30),
        },
    }
}

/// Document text with the line index each anchor starts at
struct Document {
    lines: Vec<Line<'static>>,
    anchors: Vec<(String, usize)>,
}

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let colors = palette(app.theme);
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.background).fg(colors.text)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, &colors, chunks[0]);
    draw_progress(frame, app, &colors, chunks[1]);
    draw_markers(frame, app, &colors, chunks[2]);
    draw_document(frame, app, &colors, chunks[3]);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, &colors, chunks[4]),
        InputMode::Edit => draw_edit_input(frame, app, &colors, chunks[4]),
    }

    if app.show_help {
        draw_help_overlay(frame, &colors);
    }
    if let Some(error) = &app.error_message {
        draw_error_modal(frame, &colors, error);
    }
}

/// Scroll offset that puts the current section at the top of the document pane
///
/// `width` is the full terminal width; the pane border is subtracted here.
pub fn follow_scroll(app: &App, width: u16) -> Option<u16> {
    let anchor = app.current_anchor()?;
    let document = build_document(app, &palette(app.theme));
    let line = document
        .anchors
        .iter()
        .find(|(id, _)| id == anchor)
        .map(|(_, line)| *line)?;
    let inner_width = width.saturating_sub(2).max(1) as usize;
    let rows: usize = document.lines[..line]
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    Some(rows.min(u16::MAX as usize) as u16)
}

fn draw_header(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let clock = format!(
        "{} / {}",
        format_clock(app.elapsed),
        format_clock(app.timer.total())
    );

    let mut spans = vec![Span::styled(
        format!(" {} ", app.draft.outline().title),
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::styled(
        format!("({})", app.draft.passage()),
        Style::default().fg(colors.muted),
    ));
    if app.draft.is_generating() {
        spans.push(Span::styled(
            "  ↻ preparing",
            Style::default().fg(colors.emphasis),
        ));
    }
    if app.saved_indicator {
        spans.push(Span::styled("  ✓ saved", Style::default().fg(Color::Green)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    let clock_width = clock.chars().count() as u16 + 1;
    if area.width > clock_width {
        let clock_area = Rect::new(area.x + area.width - clock_width, area.y, clock_width, 1);
        let style = if app.timer.is_running() {
            Style::default().fg(colors.text).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.muted)
        };
        frame.render_widget(Paragraph::new(Span::styled(clock, style)), clock_area);
    }
}

fn draw_progress(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let percent = progress_percent(app.elapsed, app.timer.total());
    let label = app
        .current_section()
        .map(|s| s.label().to_string())
        .unwrap_or_default();

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(colors.accent).bg(colors.background))
        .ratio(percent / 100.0)
        .label(Span::styled(
            label,
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(gauge, area);
}

/// Tick marks at each section end, dimmed once passed
fn draw_markers(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let width = area.width as usize;
    if width == 0 {
        return;
    }
    let total = app.timer.total().as_secs().max(1);

    let mut cells: Vec<Option<bool>> = vec![None; width];
    for marker in markers(&app.sections, app.elapsed) {
        let column = (marker.at * (width as u64 - 1) / total) as usize;
        cells[column.min(width - 1)] = Some(marker.passed);
    }

    let spans: Vec<Span> = cells
        .into_iter()
        .map(|cell| match cell {
            Some(true) => Span::styled("┴", Style::default().fg(colors.muted)),
            Some(false) => Span::styled("┴", Style::default().fg(colors.accent)),
            None => Span::styled("─", Style::default().fg(colors.muted)),
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_document(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let title = match (app.view_mode, app.draft.presentation().is_some()) {
        (ViewMode::Presentation, true) => " Presentation ",
        _ => " Outline ",
    };
    let border_style = if app.follow {
        Style::default().fg(colors.accent)
    } else {
        Style::default().fg(colors.muted)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let document = build_document(app, colors);
    let paragraph = Paragraph::new(document.lines)
        .block(block)
        .style(Style::default().fg(colors.text))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    frame.render_widget(paragraph, area);
}

fn build_document(app: &App, colors: &Palette) -> Document {
    let current = app.current_anchor();
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut anchors = Vec::new();

    for block in app.blocks() {
        if let Some(anchor) = &block.anchor {
            anchors.push((anchor.clone(), lines.len()));
        }
        let is_current = block.anchor.is_some() && block.anchor.as_deref() == current;

        match &block.kind {
            BlockKind::Title => {
                lines.push(Line::from(Span::styled(
                    block.text.to_uppercase(),
                    Style::default()
                        .fg(colors.accent)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            BlockKind::Subtitle => {
                lines.push(styled_markup(
                    &block.text,
                    "",
                    Style::default().add_modifier(Modifier::ITALIC),
                    colors,
                ));
                lines.push(Line::from(""));
            }
            BlockKind::Heading(icon) => {
                lines.push(Line::from(""));
                let text = match icon {
                    Some(icon) => format!("{} {}", icon.glyph(), block.text),
                    None => block.text.clone(),
                };
                let mut style = Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD);
                if is_current {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                lines.push(Line::from(Span::styled(text, style)));
            }
            BlockKind::Subheading => {
                lines.push(Line::from(Span::styled(
                    block.text.clone(),
                    Style::default()
                        .fg(colors.muted)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                )));
            }
            BlockKind::Body(paragraphs) => {
                for text in paragraphs {
                    lines.push(styled_markup(text, "", Style::default(), colors));
                }
            }
            BlockKind::Bullets(items) => {
                for item in items {
                    lines.push(styled_markup(item, "  • ", Style::default(), colors));
                }
            }
        }
    }

    Document { lines, anchors }
}

/// Render `**emphasis**` spans in the emphasis color
fn styled_markup(text: &str, prefix: &str, base: Style, colors: &Palette) -> Line<'static> {
    let mut spans = Vec::new();
    if !prefix.is_empty() {
        spans.push(Span::styled(prefix.to_string(), base.fg(colors.muted)));
    }
    for segment in markup::segments(text) {
        let style = if segment.emphasized {
            base.fg(colors.emphasis).add_modifier(Modifier::BOLD)
        } else {
            base
        };
        spans.push(Span::styled(segment.text.to_string(), style));
    }
    Line::from(spans)
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        let timer = if app.timer.is_running() { "pause" } else { "start" };
        format!(
            "space:{}  r:reset  j/k:scroll  f:follow  p:view  t:theme({})  e:edit  ?:help  q:quit",
            timer, app.theme
        )
    };

    let paragraph = Paragraph::new(content).style(
        Style::default()
            .fg(colors.muted)
            .add_modifier(Modifier::DIM),
    );
    frame.render_widget(paragraph, area);
}

/// Draw edit input at the bottom
fn draw_edit_input(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let prefix = "edit ";
    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(colors.emphasis)),
        Span::raw(app.command_input.clone()),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let cursor_x = area.x + prefix.len() as u16 + app.command_cursor as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame, colors: &Palette) {
    let popup_area = centered(frame.area(), 54, 20);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Timer:"),
        Line::from("  space       Start / pause"),
        Line::from("  r           Reset to zero"),
        Line::from(""),
        Line::from("Reading:"),
        Line::from("  j/k, ↑/↓    Scroll"),
        Line::from("  PgUp/PgDn   Scroll a page"),
        Line::from("  f           Follow the current section"),
        Line::from("  p           Presentation / full outline"),
        Line::from("  t           Next theme"),
        Line::from(""),
        Line::from("  e           Edit a field: <path> <value>"),
        Line::from("  q, Esc      Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent).add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .style(Style::default().bg(colors.background).fg(colors.text));
    frame.render_widget(paragraph, popup_area);
}

fn draw_error_modal(frame: &mut Frame, colors: &Palette, message: &str) {
    let popup_area = centered(frame.area(), 60, 8);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));

    let lines = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(colors.background).fg(colors.text))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use sermon_core::models::{
        Conclusion, ContextSection, DevelopmentPoint, IconTag, Introduction,
    };
    use sermon_core::{SavedSermon, SermonOutline, TimeBudget};
    use std::time::{Duration, Instant};

    fn app() -> App {
        let point = |n: u32| DevelopmentPoint {
            point_number: n,
            title: format!("Ponto {}", n),
            icon: IconTag::Dove,
            argument: "Argumento **forte**".to_string(),
            subsections: Vec::new(),
            application: "- um\n- dois".to_string(),
        };
        let outline = SermonOutline {
            title: "Bem-aventurado".to_string(),
            theme_and_subtitle: "Os dois caminhos".to_string(),
            context: ContextSection {
                title: "Contexto".to_string(),
                content: "Salmo sapiencial".to_string(),
            },
            introduction: Introduction {
                title: "Introdução".to_string(),
                hook: "Gancho".to_string(),
            },
            development: vec![point(1), point(2)],
            conclusion: Conclusion {
                title: "Conclusão".to_string(),
                recap: "Resumo".to_string(),
                appeal_to_believers: "Permaneçam".to_string(),
                appeal_to_unbelievers: "Venham".to_string(),
            },
        };
        App::new(
            SavedSermon::with_id(7, "Sl 1", outline),
            Theme::Dark,
            TimeBudget::default(),
        )
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_document_anchors_follow_blocks() {
        let app = app();
        let document = build_document(&app, &palette(app.theme));
        let ids: Vec<&str> = document.anchors.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["introduction", "point-1", "point-2", "conclusion"]);

        let lines: Vec<usize> = document.anchors.iter().map(|(_, line)| *line).collect();
        assert!(lines.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_follow_scroll_moves_with_timer() {
        let mut app = app();
        let at_start = follow_scroll(&app, 80).unwrap();

        let t0 = Instant::now();
        app.toggle_timer(t0);
        app.tick(t0 + Duration::from_secs(1000));
        assert_eq!(app.current_anchor(), Some("point-2"));
        let later = follow_scroll(&app, 80).unwrap();
        assert!(later > at_start);

        app.tick(t0 + Duration::from_secs(2400));
        assert_eq!(follow_scroll(&app, 80), None);
    }

    #[test]
    fn test_emphasis_is_split_into_spans() {
        let colors = palette(Theme::Classic);
        let line = styled_markup("Argumento **forte**", "", Style::default(), &colors);
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[1].content, "forte");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_draw_shows_title_clock_and_section() {
        let app = app();
        let screen = render(&app);
        assert!(screen.contains("Bem-aventurado"));
        assert!(screen.contains("00:00 / 40:00"));
        assert!(screen.contains("Introdução"));
        assert!(screen.contains("Presentation") || screen.contains("Outline"));
    }

    #[test]
    fn test_draw_help_overlay() {
        let mut app = app();
        app.toggle_help();
        let screen = render(&app);
        assert!(screen.contains("Keyboard Shortcuts"));
    }
}
