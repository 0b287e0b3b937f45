//! Terminal output helpers shared by the commands.

use colored::Colorize;

pub fn status(message: &str) {
    println!("{}", message.blue());
}

pub fn success(message: &str) {
    println!("{}", format!("✅ {}", message).green());
}

pub fn error(message: &str) {
    println!("{}", format!("❌ {}", message).red());
}

pub fn warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).yellow());
}

pub fn highlight(message: &str) {
    println!("{}", message.yellow());
}

pub fn banner(title: &str) {
    let width = 63;
    println!("{}", format!("╔{}╗", "═".repeat(width)).blue());
    println!("{}", format!("║{:^width$}║", title, width = width).blue());
    println!("{}", format!("╚{}╝", "═".repeat(width)).blue());
}

/// Status marker used in the listing tables.
pub fn check_mark(flag: bool) -> &'static str {
    if flag { "✅" } else { "❌" }
}

/// Left-align `value` in a column of `width` characters.
///
/// Emoji markers count as one character, matching how the tables have always
/// been laid out.
pub fn cell(value: &str, width: usize) -> String {
    format!("{:<width$}", value, width = width)
}

/// Horizontal rule for table headers.
pub fn rule(width: usize) -> String {
    "─".repeat(width)
}
