//! Output formatting for the CLI.

use clap::ValueEnum;
use nuvault_api::VaultEntry;
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "status": "success", "message": message })
            );
        }
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => {
            eprintln!(
                "{}",
                serde_json::json!({ "status": "error", "message": message })
            );
        }
    }
}

/// Print a table row.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", label), value);
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(60));
}

/// Print a heading.
pub fn print_heading(text: &str) {
    println!("\n{}", text);
    print_divider();
}

/// Mask a secret for display.
pub fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "•".repeat(secret.chars().count().clamp(6, 12))
    }
}

/// Render one entry as a single table line.
pub fn entry_line(entry: &VaultEntry, show_secret: bool) -> String {
    let star = if entry.is_favorite { "*" } else { " " };
    let secret = if show_secret {
        entry.password.clone()
    } else {
        mask(&entry.password)
    };
    format!(
        "{} {:<6} {:<24} {:<28} {}",
        star,
        truncate(entry.id.as_str(), 6),
        truncate(&entry.service, 24),
        truncate(&entry.username, 28),
        secret
    )
}

/// Cut `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuvault_api::EntryId;

    fn entry(password: &str, is_favorite: bool) -> VaultEntry {
        VaultEntry {
            id: EntryId::from(7),
            service: "Gmail".to_string(),
            username: "a@b.com".to_string(),
            password: password.to_string(),
            is_favorite,
            category_id: None,
            tags: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn test_mask_bounds_length() {
        assert_eq!(mask(""), "");
        assert_eq!(mask("ab").chars().count(), 6);
        assert_eq!(mask("a-very-long-password-indeed").chars().count(), 12);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        assert_eq!(truncate("much-too-long", 5), "much…");
    }

    #[test]
    fn test_entry_line_hides_secret_by_default() {
        let line = entry_line(&entry("hunter2", true), false);
        assert!(line.starts_with('*'));
        assert!(line.contains("Gmail"));
        assert!(!line.contains("hunter2"));

        let line = entry_line(&entry("hunter2", false), true);
        assert!(line.starts_with(' '));
        assert!(line.ends_with("hunter2"));
    }
}
