use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::fmt::Write;
use std::time::Duration;

use crate::history::HistoricalChangelogEntry;
use crate::notifications::{AppNotification, NotificationLevel};
use crate::studio::{ChatMessage, ChatRole};
use crate::types::ChangelogCategory;
use strum::IntoEnumIterator;

// RGB tuple constants for use with the `colored` crate's `.truecolor()` method
pub mod rgb {
    pub const ELECTRIC_PURPLE: (u8, u8, u8) = (225, 53, 255);
    pub const NEON_CYAN: (u8, u8, u8) = (128, 255, 234);
    pub const CORAL: (u8, u8, u8) = (255, 106, 193);
    pub const ELECTRIC_YELLOW: (u8, u8, u8) = (241, 250, 140);
    pub const SUCCESS_GREEN: (u8, u8, u8) = (80, 250, 123);
    pub const ERROR_RED: (u8, u8, u8) = (255, 99, 99);
    pub const DIM_WHITE: (u8, u8, u8) = (180, 180, 190);
}

/// Track quiet mode state
static QUIET_MODE: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));

/// Enable or disable quiet mode
pub fn set_quiet_mode(enabled: bool) {
    *QUIET_MODE.lock() = enabled;
}

pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("✦✧✶✷✸✹✺✻✼✽")
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.cyan().bold());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.yellow().bold());
    }
}

pub fn print_error(message: &str) {
    // Always print errors, even in quiet mode
    eprintln!("{}", message.red().bold());
}

pub fn print_success(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.green().bold());
    }
}

pub fn print_version(version: &str) {
    if !is_quiet_mode() {
        println!(
            "{} {} {}",
            create_gradient_text("Aria Changelog").bold(),
            "version".cyan(),
            version.green()
        );
    }
}

/// Print content with decorative borders
pub fn print_bordered_content(content: &str) {
    if !is_quiet_mode() {
        println!("{}", "━".repeat(50).bright_purple());
        println!("{content}");
        println!("{}", "━".repeat(50).bright_purple());
    }
}

/// Print a simple message (respects quiet mode)
pub fn print_message(message: &str) {
    if !is_quiet_mode() {
        println!("{message}");
    }
}

/// Gradient text Electric Purple -> Neon Cyan
pub fn create_gradient_text(text: &str) -> String {
    let gradient = [
        rgb::ELECTRIC_PURPLE,
        (200, 100, 255),
        (180, 150, 250),
        (150, 200, 245),
        rgb::NEON_CYAN,
    ];

    apply_gradient(text, &gradient)
}

fn apply_gradient(text: &str, gradient: &[(u8, u8, u8)]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let chars_len = chars.len();
    let gradient_len = gradient.len();

    let mut result = String::new();

    if chars_len == 0 || gradient_len == 0 {
        return result;
    }

    for (i, c) in chars.iter().enumerate() {
        let index = if chars_len == 1 {
            0
        } else {
            i * (gradient_len - 1) / (chars_len - 1)
        };
        let (r, g, b) = gradient[index];
        let _ = write!(result, "{}", c.to_string().truecolor(r, g, b));
    }

    result
}

/// Colored terminal rendering of one history entry
pub fn format_changelog_entry(entry: &HistoricalChangelogEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}  {}",
        create_gradient_text(&entry.version).bold(),
        entry.date.format("%Y-%m-%d %H:%M UTC").to_string().dimmed(),
        format!("{} PRs", entry.pull_request_ids.len()).truecolor(
            rgb::DIM_WHITE.0,
            rgb::DIM_WHITE.1,
            rgb::DIM_WHITE.2
        )
    );

    for category in ChangelogCategory::iter() {
        let items = entry.changelog.items(category);
        if items.is_empty() {
            continue;
        }
        let (r, g, b) = match category {
            ChangelogCategory::Features => rgb::SUCCESS_GREEN,
            ChangelogCategory::Fixes => rgb::CORAL,
            ChangelogCategory::Improvements => rgb::NEON_CYAN,
        };
        let _ = writeln!(out, "\n{}", category.to_string().truecolor(r, g, b).bold());
        for item in items {
            let _ = writeln!(out, "  • {item}");
        }
    }

    if entry.changelog.is_empty() {
        let _ = writeln!(out, "\n{}", "(no entries)".dimmed());
    }

    out.trim_end().to_string()
}

pub fn format_notification(notification: &AppNotification) -> String {
    let (r, g, b) = match notification.level {
        NotificationLevel::Success => rgb::SUCCESS_GREEN,
        NotificationLevel::Error => rgb::ERROR_RED,
        NotificationLevel::Warning => rgb::ELECTRIC_YELLOW,
        NotificationLevel::Info => rgb::NEON_CYAN,
    };
    let marker = if notification.read { " " } else { "●" };
    format!(
        "{} [{}] {} {}  {}",
        marker.truecolor(r, g, b),
        notification.id,
        notification.title.truecolor(r, g, b).bold(),
        notification.message,
        notification
            .timestamp
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .dimmed()
    )
}

pub fn format_chat_message(message: &ChatMessage) -> String {
    match message.role {
        ChatRole::User => format!("{} {}", "you ›".cyan().bold(), message.text),
        ChatRole::Model => format!("{} {}", create_gradient_text("aria ›"), message.text),
    }
}
