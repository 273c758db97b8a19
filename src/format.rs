//! Formatting helpers: timestamps, padded level labels, colorization, and
//! the decorative banner block. All functions here are pure apart from
//! reading the clock and the locale environment.

use crate::level::Level;
use crate::sink::LogRecord;
use chrono::Local;
use console::{Color, Style};

/// Width of the padded level label, the length of `"emergency"`.
pub const LABEL_WIDTH: usize = 9;

/// Current local time as a human-readable timestamp.
///
/// Day-first (`DD/MM/YYYY HH:MM:SS`) by default; month-first when the
/// locale environment (`LC_ALL`, `LC_MESSAGES`, `LANG`, `LANGUAGE`) points
/// at a `en_US` locale.
pub fn timestamp() -> String {
    if locale_is_month_first() {
        Local::now().format("%m/%d/%Y %H:%M:%S").to_string()
    } else {
        Local::now().format("%d/%m/%Y %H:%M:%S").to_string()
    }
}

fn locale_is_month_first() -> bool {
    ["LC_ALL", "LC_MESSAGES", "LANG", "LANGUAGE"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .is_some_and(|locale| locale.starts_with("en_US"))
}

/// Pad a canonical level name to a fixed-width uppercase label.
///
/// Unrecognized input passes through unchanged.
pub fn label(name: &str) -> String {
    match Level::from_name(name) {
        Some(level) => format!("{:<LABEL_WIDTH$}", level.name().to_uppercase()),
        None => name.to_string(),
    }
}

/// Terminal color associated with a level name. Unrecognized names get a
/// neutral white.
pub fn color_for(name: &str) -> Color {
    match Level::from_name(name) {
        Some(Level::Emergency | Level::Alert | Level::Critical | Level::Error) => Color::Red,
        Some(Level::Warning) => Color::Yellow,
        Some(Level::Notice) => Color::Cyan,
        Some(Level::Info) => Color::Green,
        Some(Level::Debug) => Color::Blue,
        None => Color::White,
    }
}

/// Render a record to a single log line: `[timestamp] LABEL : message meta`.
///
/// The metadata segment is omitted when the record carries none. With
/// `colorize` the label is styled for terminal output.
pub fn render_line(record: &LogRecord, colorize: bool) -> String {
    let level_label = if colorize {
        Style::new()
            .fg(color_for(record.level.name()))
            .apply_to(label(record.level.name()))
            .to_string()
    } else {
        label(record.level.name())
    };

    let mut line = format!("[{}] {} : {}", timestamp(), level_label, record.message);

    if let Some(meta) = &record.metadata {
        line.push(' ');
        line.push_str(&meta.to_string());
    }

    line
}

/// Styling for the three-line banner block.
#[derive(Debug, Clone)]
pub struct BannerStyle {
    /// Foreground color name, e.g. `"white"`.
    pub foreground: String,
    /// Background color name with the `bg` prefix convention, e.g.
    /// `"bgBlue"`. A bare color name is normalized on use.
    pub background: String,
    /// Character repeated for the top rule.
    pub top_rule: char,
    /// Character repeated for the bottom rule.
    pub bottom_rule: char,
    /// Left message delimiter.
    pub left: char,
    /// Right message delimiter.
    pub right: char,
}

impl Default for BannerStyle {
    fn default() -> Self {
        Self {
            foreground: "white".to_string(),
            background: "bgBlue".to_string(),
            top_rule: '-',
            bottom_rule: '-',
            left: '|',
            right: '|',
        }
    }
}

/// Padding on each side of the banner message.
const BANNER_STEP: usize = 20;

/// Build the three plain banner lines: top rule, delimited uppercased
/// message, bottom rule.
pub fn render_banner(message: &str, style: &BannerStyle) -> [String; 3] {
    let width = message.chars().count() + BANNER_STEP * 2;
    let pad = " ".repeat((BANNER_STEP * 2 - 2) / 2);

    [
        style.top_rule.to_string().repeat(width),
        format!(
            "{}{}{}{}{}",
            style.left,
            pad,
            message.to_uppercase(),
            pad,
            style.right
        ),
        style.bottom_rule.to_string().repeat(width),
    ]
}

/// Resolve a banner style into a terminal style, if the color pair is
/// supported. Returns `None` for any unrecognized color name; the caller
/// falls back to plain output.
pub fn resolve_banner_style(style: &BannerStyle) -> Option<Style> {
    let fg = color_from_name(&style.foreground)?;
    let bg = background_from_name(&normalize_background(&style.background))?;
    Some(Style::new().fg(fg).bg(bg))
}

/// Normalize a background color name to the `bg` prefix convention:
/// `"blue"` becomes `"bgBlue"`. Names already carrying the prefix pass
/// through unchanged.
pub fn normalize_background(name: &str) -> String {
    if name.starts_with("bg") {
        return name.to_string();
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("bg{}{}", first.to_uppercase(), chars.as_str()),
        None => name.to_string(),
    }
}

fn color_from_name(name: &str) -> Option<Color> {
    match name.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        _ => None,
    }
}

fn background_from_name(name: &str) -> Option<Color> {
    color_from_name(name.strip_prefix("bg")?)
}
