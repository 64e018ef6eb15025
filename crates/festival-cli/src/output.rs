//! Terminal output formatting.

use colored::Colorize;
use festival_core::chronicle::upload::{
    CompletionAction, HiddenField, UploadCompletion, UploadStatus,
};
use festival_core::notification::{Counter, CounterSlot, Counters};
use festival_core::table::Table;
use unicode_width::UnicodeWidthStr;

/// Print one badge change as it happens.
pub fn print_counter_change(slot: CounterSlot, counter: &Counter) {
    let time = chrono::Local::now().format("%H:%M:%S");
    println!(
        "{} {:<16} {}",
        time.to_string().dimmed(),
        slot.element_id(),
        counter_text(counter)
    );
}

/// Print all badges.
pub fn print_counters(counters: &Counters) {
    println!("{}", "Badges".bold());
    for (slot, counter) in counters.iter() {
        println!("  {:<16} {}", slot.element_id(), counter_text(counter));
    }
}

fn counter_text(counter: &Counter) -> colored::ColoredString {
    if counter.visible {
        counter.text.yellow().bold()
    } else {
        "hidden".dimmed()
    }
}

/// Print the result of each upload with its follow-up action.
pub fn print_upload_completions(completions: &[UploadCompletion]) {
    for completion in completions {
        match &completion.status {
            UploadStatus::Uploaded { reference } => println!(
                "{} {} {}",
                "✓".green().bold(),
                completion.file_name.cyan(),
                format!("({})", reference).dimmed()
            ),
            UploadStatus::Failed { reason } => println!(
                "{} {} {}",
                "✗".red().bold(),
                completion.file_name.cyan(),
                reason.red()
            ),
        }

        match &completion.action {
            CompletionAction::CopySnippet(action) => {
                println!("    {} {}", format!("[{}]", action.label()).dimmed(), action.snippet());
            }
            CompletionAction::ReloadPage => {
                println!("    {}", "reload the chronicle page".dimmed());
            }
        }
    }
}

/// Print hidden form fields for a surrounding form.
pub fn print_form_fields(fields: &[HiddenField]) {
    if fields.is_empty() {
        return;
    }
    println!();
    println!("{}", "Form fields".bold());
    for field in fields {
        println!("{}", field.to_html());
    }
}

/// Print the visible rows of a table, fitting columns to the terminal.
pub fn print_table(table: &Table) {
    let rows: Vec<_> = table.visible_rows().collect();
    if rows.is_empty() {
        println!("{}", "No matching rows.".dimmed());
        return;
    }

    let columns = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in &rows {
        for (i, cell) in row.cells.iter().enumerate() {
            widths[i] = widths[i].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    // Shrink the widest column until the row fits.
    let available = term_width().saturating_sub(2 * columns.saturating_sub(1));
    while widths.iter().sum::<usize>() > available {
        match widths.iter_mut().max() {
            Some(widest) if *widest > 4 => *widest -= 1,
            _ => break,
        }
    }

    for row in &rows {
        let line: Vec<String> = row
            .cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad_right(&truncate_visual(cell, *width), *width))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }

    println!();
    println!("{} of {} row(s) shown", rows.len(), table.rows.len());
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_visual() {
        assert_eq!(truncate_visual("Pilsner", 10), "Pilsner");
        assert_eq!(truncate_visual("Apple Juice", 7), "Apple..");
        assert_eq!(truncate_visual("Apple Juice", 3), "...");
    }

    #[test]
    fn test_pad_right() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("abcdef", 4), "abcdef");
    }
}
