//! Terminal output formatting.
//!
//! Human-readable output uses colored symbols and aligned fields. With
//! `--json` every helper emits one JSON line instead, so command output can
//! be piped into other tools.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use serde_json::json;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// What a print helper does under the current flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Render {
    Json,
    Human,
    Silent,
}

impl OutputConfig {
    /// `essential` lines (warnings, errors) still print with `--quiet`.
    fn render(self, essential: bool) -> Render {
        match (self.json, self.quiet && !essential) {
            (true, _) => Render::Json,
            (false, true) => Render::Silent,
            (false, false) => Render::Human,
        }
    }
}

fn record(kind: &str, payload: serde_json::Value) -> String {
    json!({ "type": kind, "payload": payload }).to_string()
}

/// Route one output line. `payload` is `None` for purely decorative lines,
/// which have no JSON form.
fn emit(kind: &str, essential: bool, payload: Option<serde_json::Value>, human: impl FnOnce()) {
    match read_config().render(essential) {
        Render::Json => {
            if let Some(payload) = payload {
                println!("{}", record(kind, payload));
            }
        }
        Render::Human => human(),
        Render::Silent => {}
    }
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    write_config(config);
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

#[must_use]
pub fn is_quiet() -> bool {
    read_config().quiet
}

pub fn header(version: &str) {
    emit("header", false, None, || {
        println!("{} {}\n", "oddsync".bold(), version.dimmed());
    });
}

pub fn section(title: &str) {
    emit("section", false, None, || {
        println!("\n{}", title.bold());
    });
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        "field",
        false,
        Some(json!({ "label": label, "value": &value })),
        || println!("  {:<16} {}", label.dimmed(), value),
    );
}

pub fn success(message: &str) {
    emit("success", false, Some(json!({ "message": message })), || {
        println!("  {} {}", "✓".green(), message);
    });
}

pub fn warning(message: &str) {
    emit("warning", true, Some(json!({ "message": message })), || {
        println!("  {} {}", "⚠".yellow(), message);
    });
}

/// Errors go to stderr in both modes.
pub fn error(message: &str) {
    match read_config().render(true) {
        Render::Json => eprintln!("{}", record("error", json!({ "message": message }))),
        _ => eprintln!("  {} {}", "×".red(), message),
    }
}

/// Print a timestamped line from a streaming command.
pub fn info(timestamp: &str, label: &str, message: &str) {
    emit(
        "info",
        false,
        Some(json!({ "timestamp": timestamp, "label": label, "message": message })),
        || println!("  {} {} {}", timestamp.dimmed(), label.cyan(), message),
    );
}

#[must_use]
pub fn positive(value: impl Display) -> String {
    value.to_string().green().to_string()
}

#[must_use]
pub fn negative(value: impl Display) -> String {
    value.to_string().red().to_string()
}

#[must_use]
pub fn highlight(value: impl Display) -> String {
    value.to_string().cyan().to_string()
}

#[must_use]
pub fn muted(value: impl Display) -> String {
    value.to_string().dimmed().to_string()
}

pub fn hint(message: &str) {
    emit("hint", false, None, || println!("  {} {}", "hint:".dimmed(), message));
}

/// Print pre-rendered content, such as a table, indented. Callers emit
/// their own JSON document instead.
pub fn lines(content: &str) {
    emit("lines", false, None, || {
        content.lines().for_each(|line| println!("  {line}"));
    });
}

/// Print a complete JSON document.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}
