//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::auth::Identity;
use crate::cli::OutputFormat;

/// Columns shown for list results before the rest are dropped
const MAX_COLUMNS: usize = 8;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Show a spinner while `fut` is pending
pub async fn pending<F, T>(message: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = fut.await;
    pb.finish_and_clear();
    result
}

/// Print a backend payload in the requested format
pub fn print_value(value: &Value, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Table => print_table(value),
    }
    Ok(())
}

/// Render a payload as a table: arrays of objects as rows, objects as fields
pub fn print_table(value: &Value) {
    match value {
        Value::Array(items) if items.is_empty() => info("No records found"),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            println!("{}", rows_table(items));
        }
        Value::Array(items) => {
            for item in items {
                println!("  - {}", cell_text(item));
            }
        }
        Value::Object(_) => println!("{}", fields_table(value)),
        Value::Null => info("No content"),
        other => println!("{}", cell_text(other)),
    }
}

fn rows_table(items: &[Value]) -> Table {
    let mut columns: Vec<String> = Vec::new();
    for item in items {
        if let Some(obj) = item.as_object() {
            for (key, value) in obj {
                if is_scalar(value) && !columns.contains(key) && columns.len() < MAX_COLUMNS {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            columns
                .iter()
                .map(|c| Cell::new(c).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );

    for item in items {
        let row = columns
            .iter()
            .map(|c| {
                let value = item.get(c).unwrap_or(&Value::Null);
                status_cell(c, value)
            })
            .collect::<Vec<_>>();
        table.add_row(row);
    }

    table
}

fn fields_table(value: &Value) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Field").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    if let Some(obj) = value.as_object() {
        for (key, field) in obj {
            table.add_row(vec![Cell::new(key), status_cell(key, field)]);
        }
    }
    table
}

fn status_cell(column: &str, value: &Value) -> Cell {
    let text = cell_text(value);
    let color = match (column, text.as_str()) {
        ("status", "ACTIVE") | ("status", "PRESENT") => Some(Color::Green),
        ("status", "INACTIVE") | ("status", "ABSENT") => Some(Color::Red),
        ("status", "LATE") => Some(Color::Yellow),
        _ => None,
    };
    match color {
        Some(color) => Cell::new(text).fg(color),
        None => Cell::new(text),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Text shown for a single JSON value
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(obj) => obj
            .get("name")
            .or_else(|| obj.get("id"))
            .map(cell_text)
            .unwrap_or_else(|| "{...}".to_string()),
    }
}

/// Print the stored identity
pub fn print_identity(identity: &Identity) {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    println!("{}", "Signed in".bold().underline());
    println!();
    println!("  {} {}", "Name:".bold(), show(&identity.name));
    println!("  {} {}", "Email:".bold(), show(&identity.email));
    println!(
        "  {} {}",
        "Role:".bold(),
        identity
            .role
            .map(|r| r.to_string().cyan().to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    if let Some(id) = &identity.institute_id {
        println!("  {} {}", "Institute:".bold(), id);
    }
    if let Some(id) = &identity.manager_id {
        println!("  {} {}", "Manager:".bold(), id);
    }
}

/// Confirm an action with the user
pub fn confirm(message: &str) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Prompt for a password without echo
pub fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    Ok(dialoguer::Password::new().with_prompt(prompt).interact()?)
}
