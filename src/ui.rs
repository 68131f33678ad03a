use console::{strip_ansi_codes, Term};
use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

use std::default::Default;

/// Terminal output for human-facing commands
///
/// In quiet mode (used by `gen --json`) everything except warnings and errors
/// is suppressed, and those go to stderr so stdout carries only the JSON.
pub struct UI {
    term: Term,
    quiet: bool,
}

impl UI {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            quiet: false,
        }
    }

    /// Silence normal output for machine-readable runs
    pub fn quiet() -> Self {
        Self {
            term: Term::stderr(),
            quiet: true,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Helper method to conditionally apply color based on terminal support
    fn colorize<F>(&self, text: &str, color_fn: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        if self.supports_color() {
            color_fn(text)
        } else {
            text.to_string()
        }
    }

    fn emit(&self, line: &str) {
        if !self.quiet {
            println!("{}", line);
        }
    }

    /// Print a success message (color only if supported)
    pub fn success(&self, message: &str) {
        let output = self.colorize(message, |m| m.green().bold().to_string());
        self.emit(&output);
    }

    /// Print an error message (color only if supported)
    pub fn error(&self, message: &str) {
        let output = self.colorize(message, |m| m.red().bold().to_string());
        eprintln!("{}", output);
    }

    /// Print a warning message; goes to stderr when quiet
    pub fn warning(&self, message: &str) {
        let output = self.colorize(message, |m| m.yellow().bold().to_string());
        if self.quiet {
            eprintln!("{}", output);
        } else {
            println!("{}", output);
        }
    }

    /// Print an info message (color only if supported)
    pub fn info(&self, message: &str) {
        let output = self.colorize(message, |m| m.blue().bold().to_string());
        self.emit(&output);
    }

    /// Secondary detail line, indented and dimmed
    pub fn detail(&self, message: &str) {
        let output = self.colorize(message, |m| m.dimmed().to_string());
        self.emit(&format!("  {}", output));
    }

    /// Print raw text with no styling (tokens, so they copy cleanly)
    pub fn plain(&self, text: &str) {
        self.emit(text);
    }

    /// Print a blank line for spacing
    pub fn blank_line(&self) {
        self.emit("");
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        let term_width = self.width();
        let title_len = title.width() + 4; // 2 spaces on each side
        let line_len = if term_width > title_len {
            ((term_width - title_len) / 2).min(30)
        } else {
            0
        };

        let line = "═".repeat(line_len);
        self.blank_line();
        if self.supports_color() {
            self.emit(&format!(
                "{} {} {}",
                line.cyan(),
                title.cyan().bold(),
                line.cyan()
            ));
        } else {
            self.emit(&format!("{} {} {}", line, title, line));
        }
        self.blank_line();
    }

    /// Green when good, red otherwise
    pub fn format_status(&self, text: &str, is_good: bool) -> String {
        if is_good {
            self.colorize(text, |t| t.green().to_string())
        } else {
            self.colorize(text, |t| t.red().to_string())
        }
    }

    /// Yellow highlight for values that need attention
    pub fn format_attention(&self, text: &str) -> String {
        self.colorize(text, |t| t.yellow().to_string())
    }

    /// Create a card-style display for information
    pub fn card(&self, title: &str, content: Vec<(&str, String)>) {
        if self.quiet {
            return;
        }

        let term_width = self.width();
        let card_width = term_width
            .saturating_sub(4) // Leave more space for terminal margins
            .clamp(50, 100);

        let supports_color = self.supports_color();

        println!("╭{}╮", "─".repeat(card_width - 2));
        let title_spaces = card_width.saturating_sub(title.width() + 4);
        if supports_color {
            println!("│ {} {}│", title.cyan().bold(), " ".repeat(title_spaces));
        } else {
            println!("│ {} {}│", title, " ".repeat(title_spaces));
        }
        println!("├{}┤", "─".repeat(card_width - 2));

        for (label, value) in content {
            // Strip ANSI codes for width calculations
            let label_plain = strip_ansi_codes(label);
            let value_plain = strip_ansi_codes(&value);

            let content_width = label_plain.width() + value_plain.width() + 4; // ": " + 2 spaces padding
            let spaces = if content_width < card_width - 1 {
                card_width - content_width - 1
            } else {
                1
            };

            if supports_color {
                println!("│ {}: {}{}│", label.dimmed(), value, " ".repeat(spaces));
            } else {
                println!("│ {}: {}{}│", label, value, " ".repeat(spaces));
            }
        }

        println!("╰{}╯", "─".repeat(card_width - 2));
        println!();
    }

    /// Pretty-print a JSON value under a colored label
    pub fn json_block(&self, label: &str, value: &serde_json::Value) {
        let rendered =
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        let title = self.colorize(label, |l| l.cyan().bold().to_string());
        self.emit(&title);
        for line in rendered.lines() {
            self.emit(line);
        }
    }

    /// Get terminal width for responsive layout
    pub fn width(&self) -> usize {
        self.term.size().1 as usize
    }

    /// Check if terminal supports color
    pub fn supports_color(&self) -> bool {
        self.term.features().colors_supported()
    }
}

impl Default for UI {
    fn default() -> Self {
        Self::new()
    }
}

/// Spinner for work with no measurable progress (key generation)
///
/// Hidden when quiet so JSON runs stay clean.
pub fn create_spinner(ui: &UI, message: &str) -> indicatif::ProgressBar {
    if ui.is_quiet() {
        return indicatif::ProgressBar::hidden();
    }

    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg} [{elapsed:.dim}]")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Render a POSIX mode as three octal digits
pub fn format_mode(mode: u32) -> String {
    format!("{:03o}", mode & 0o777)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mode() {
        assert_eq!(format_mode(0o600), "600");
        assert_eq!(format_mode(0o100644), "644");
        assert_eq!(format_mode(0o7), "007");
    }

    #[test]
    fn test_quiet_ui_hides_spinner() {
        let ui = UI::quiet();
        assert!(ui.is_quiet());
        assert!(create_spinner(&ui, "Generating").is_hidden());
    }

    #[test]
    fn test_status_text_survives_without_color() {
        let ui = UI::new();
        let text = ui.format_status("Found", true);
        assert_eq!(strip_ansi_codes(&text), "Found");
    }
}
