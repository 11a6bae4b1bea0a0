//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use sermon_core::document::FieldPath;
use sermon_core::markup;
use sermon_core::timer::format_clock;
use sermon_core::view::{self, BlockKind};
use sermon_core::{SavedSermon, SermonOutline, TimerSection};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print any serializable value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: failed to serialize output: {}", e),
        }
    }

    /// Print one saved sermon, optionally its presentation rewrite
    pub fn print_sermon(&self, sermon: &SavedSermon, presentation: bool) {
        let outline = if presentation {
            sermon.presentation_data.as_ref().map(|p| &p.outline)
        } else {
            Some(&sermon.data)
        };

        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", sermon.id);
                println!("Passage:  {}", sermon.passage);
                if let Some(created) = sermon.created_at() {
                    println!("Created:  {}", created.format("%Y-%m-%d %H:%M"));
                }
                println!(
                    "Prepared: {}",
                    if sermon.presentation_data.is_some() {
                        "yes"
                    } else {
                        "no"
                    }
                );
                println!();
                match outline {
                    Some(outline) => print_outline(outline),
                    None => println!("No presentation data. Run `sermon prepare {}`.", sermon.id),
                }
            }
            OutputFormat::Json => match outline {
                Some(outline) if presentation => self.print_json(outline),
                _ => self.print_json(sermon),
            },
            OutputFormat::Quiet => {
                println!("{}", sermon.id);
            }
        }
    }

    /// Print a freshly generated outline that has not been saved
    pub fn print_outline(&self, passage: &str, outline: &SermonOutline) {
        match self.format {
            OutputFormat::Human => {
                println!("Passage:  {}", passage);
                println!();
                print_outline(outline);
            }
            OutputFormat::Json => self.print_json(outline),
            OutputFormat::Quiet => println!("{}", outline.title),
        }
    }

    /// Print the saved sermon list
    pub fn print_sermons(&self, sermons: &[SavedSermon]) {
        match self.format {
            OutputFormat::Human => {
                if sermons.is_empty() {
                    println!("No saved sermons.");
                    return;
                }
                for sermon in sermons {
                    let created = sermon
                        .created_at()
                        .map(|c| c.format("%Y-%m-%d").to_string())
                        .unwrap_or_default();
                    let prepared = if sermon.presentation_data.is_some() {
                        " ▶"
                    } else {
                        ""
                    };
                    println!(
                        "{} | {} | {} | {}{}",
                        sermon.id,
                        created,
                        truncate(&sermon.passage, 20),
                        truncate(&sermon.data.title, 45),
                        prepared
                    );
                }
                println!("\n{} sermon(s)", sermons.len());
            }
            OutputFormat::Json => {
                let rows: Vec<_> = sermons
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "id": s.id,
                            "passage": s.passage,
                            "title": s.data.title,
                            "prepared": s.presentation_data.is_some(),
                        })
                    })
                    .collect();
                self.print_json(&rows);
            }
            OutputFormat::Quiet => {
                for sermon in sermons {
                    println!("{}", sermon.id);
                }
            }
        }
    }

    /// Print every editable field path with its current value
    pub fn print_fields(&self, outline: &SermonOutline) {
        let fields: Vec<(String, &str)> = FieldPath::leaves(outline)
            .into_iter()
            .map(|path| (path.to_string(), path.get(outline).unwrap_or_default()))
            .collect();

        match self.format {
            OutputFormat::Human => {
                let width = fields.iter().map(|(p, _)| p.len()).max().unwrap_or(0);
                for (path, value) in &fields {
                    println!("{:width$}  {}", path, truncate_line(value, 60), width = width);
                }
            }
            OutputFormat::Json => {
                let map: serde_json::Map<String, serde_json::Value> = fields
                    .into_iter()
                    .map(|(path, value)| (path, serde_json::Value::from(value)))
                    .collect();
                self.print_json(&map);
            }
            OutputFormat::Quiet => {
                for (path, _) in &fields {
                    println!("{}", path);
                }
            }
        }
    }

    /// Print the section schedule
    pub fn print_timeline(&self, sections: &[TimerSection]) {
        match self.format {
            OutputFormat::Human => {
                for section in sections {
                    println!(
                        "{} - {}  {}",
                        format_clock(std::time::Duration::from_secs(section.start)),
                        format_clock(std::time::Duration::from_secs(section.end)),
                        section.caption()
                    );
                }
            }
            OutputFormat::Json => self.print_json(sections),
            OutputFormat::Quiet => {
                for section in sections {
                    println!("{}", section.anchor_id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Plain-text rendering of an outline for the terminal
fn print_outline(outline: &SermonOutline) {
    for block in view::layout(outline) {
        match block.kind {
            BlockKind::Title => println!("{}", block.text.to_uppercase()),
            BlockKind::Subtitle => println!("{}\n", block.text),
            BlockKind::Heading(icon) => {
                let glyph = icon.map(|i| format!("{} ", i.glyph())).unwrap_or_default();
                println!("\n── {}{} ──", glyph, block.text);
            }
            BlockKind::Subheading => println!("\n  {}", block.text),
            BlockKind::Body(lines) => {
                for line in lines {
                    println!("    {}", plain(&line));
                }
            }
            BlockKind::Bullets(items) => {
                for item in items {
                    println!("    • {}", plain(&item));
                }
            }
        }
    }
}

/// Drop emphasis delimiters, keeping unpaired ones literal
fn plain(text: &str) -> String {
    markup::segments(text).into_iter().map(|s| s.text).collect()
}

/// Truncate a string to max chars, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
