//! Styled terminal output utilities.

use owo_colors::OwoColorize;

use tally_migrate::{MigrationSet, MigrationStatus, StatusCounts};

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a success message
pub fn success(text: &str) {
    println!("{} {}", "✔".green().bold(), text.green());
}

/// Print an info message
pub fn info(text: &str) {
    println!("{} {}", "ℹ".blue().bold(), text);
}

/// Print a warning message
pub fn warn(text: &str) {
    println!("{} {}", "⚠".yellow().bold(), text.yellow());
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print a newline
pub fn newline() {
    println!();
}

/// Style text as success (green)
pub fn style_success(text: &str) -> String {
    text.green().to_string()
}

/// Style text as pending (yellow)
pub fn style_pending(text: &str) -> String {
    text.yellow().to_string()
}

/// Style text as error (red)
pub fn style_error(text: &str) -> String {
    text.red().to_string()
}

/// Colour a (possibly padded) status cell
pub fn style_status(status: MigrationStatus, text: &str) -> String {
    match status {
        MigrationStatus::Pending => style_pending(text),
        MigrationStatus::Errored => style_error(text),
        MigrationStatus::Completed => style_success(text),
    }
}

/// Ask for confirmation
pub fn confirm(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} {} ", prompt, "[y/N]".dimmed());
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Render the migration status table.
///
/// The error column only appears when at least one migration is errored.
/// Cells are padded before colouring so ANSI codes do not skew alignment.
pub fn status_table(set: &MigrationSet) -> String {
    let show_error = set.has_errors();

    let mut headers = vec!["Name", "Status"];
    if show_error {
        headers.push("Error");
    }

    let rows: Vec<(MigrationStatus, Vec<String>)> = set
        .iter()
        .map(|m| {
            let mut cells = vec![m.name.clone(), m.status.to_string()];
            if show_error {
                cells.push(
                    m.error
                        .as_deref()
                        .map(|e| e.replace('\n', " "))
                        .unwrap_or_default(),
                );
            }
            (m.status, cells)
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (_, cells) in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };

    let mut out = String::new();
    out.push_str(&border("┌", "┬", "┐"));
    out.push('\n');

    let header_cells: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!(" {} ", center(h, *w)).bold().to_string())
        .collect();
    out.push_str(&format!("│{}│\n", header_cells.join("│")));
    out.push_str(&border("├", "┼", "┤"));
    out.push('\n');

    for (status, cells) in &rows {
        let rendered: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                let padded = format!(" {} ", center(cell, *w));
                if i == 1 {
                    style_status(*status, &padded)
                } else {
                    padded
                }
            })
            .collect();
        out.push_str(&format!("│{}│\n", rendered.join("│")));
    }

    out.push_str(&border("└", "┴", "┘"));
    out
}

/// One-line summary of status counts
pub fn counts_summary(counts: &StatusCounts) -> String {
    format!(
        "{} migrations: {} completed, {} errored, {} pending",
        counts.total(),
        counts.completed,
        counts.errored,
        counts.pending
    )
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let total = width.saturating_sub(len);
    let left = total / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(total - left))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_migrate::{LocalMigration, ReconciledMigration};

    fn set(entries: &[(&str, MigrationStatus, Option<&str>)]) -> MigrationSet {
        MigrationSet::new(
            entries
                .iter()
                .map(|(name, status, error)| {
                    let mut m =
                        ReconciledMigration::untracked(LocalMigration::new(*name, *name, ""));
                    m.status = *status;
                    m.error = error.map(str::to_string);
                    m
                })
                .collect(),
        )
    }

    #[test]
    fn test_center() {
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("abc", 6), " abc  ");
        assert_eq!(center("toolong", 3), "toolong");
    }

    #[test]
    fn test_table_hides_error_column_without_errors() {
        let table = status_table(&set(&[
            ("1_a", MigrationStatus::Completed, None),
            ("2_b", MigrationStatus::Pending, None),
        ]));

        assert!(table.contains("Name"));
        assert!(!table.contains("Error"));
        assert!(table.contains("completed"));
        assert!(table.contains("2_b"));
    }

    #[test]
    fn test_table_shows_error_column() {
        let table = status_table(&set(&[(
            "1_a",
            MigrationStatus::Errored,
            Some("no such table:\nusers"),
        )]));

        assert!(table.contains("Error"));
        assert!(table.contains("no such table: users"));
    }

    #[test]
    fn test_counts_summary() {
        let counts = StatusCounts {
            pending: 1,
            errored: 0,
            completed: 2,
        };
        assert_eq!(
            counts_summary(&counts),
            "3 migrations: 2 completed, 0 errored, 1 pending"
        );
    }
}
