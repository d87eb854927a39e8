//! Terminal rendering helpers for the replay report.
//!
//! `--json` output is colourised by walking the [`serde_json::Value`] tree,
//! so escaping always matches `serde_json` and no string scanning is needed.

use std::fmt::Write as _;

use colored::Colorize;
use serde_json::Value;

const INDENT: &str = "  ";

/// Print `value` as indented, colourised JSON.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
pub fn print_highlighted_json(value: &Value) {
    println!("{}", highlight_json(value));
}

/// Render `value` the way [`print_highlighted_json`] prints it.
#[must_use]
pub fn highlight_json(value: &Value) -> String {
    let mut out = String::new();
    render(value, 0, &mut out);
    out
}

fn render(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Null => push(out, "null".magenta()),
        Value::Bool(b) => push(out, b.to_string().magenta()),
        Value::Number(n) => push(out, n.to_string().yellow()),
        Value::String(s) => push(out, quoted(s).green()),
        Value::Array(items) if items.is_empty() => push(out, "[]".white().bold()),
        Value::Object(map) if map.is_empty() => push(out, "{}".white().bold()),
        Value::Array(items) => {
            push(out, "[".white().bold());
            for (i, item) in items.iter().enumerate() {
                separator(out, i, depth + 1);
                render(item, depth + 1, out);
            }
            close(out, depth, "]");
        }
        Value::Object(map) => {
            push(out, "{".white().bold());
            for (i, (key, item)) in map.iter().enumerate() {
                separator(out, i, depth + 1);
                push(out, quoted(key).cyan());
                push(out, ": ".white());
                render(item, depth + 1, out);
            }
            close(out, depth, "}");
        }
    }
}

fn quoted(s: &str) -> String { serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\"")) }

fn push(out: &mut String, token: colored::ColoredString) { let _ = write!(out, "{token}"); }

fn separator(out: &mut String, index: usize, depth: usize) {
    if index > 0 {
        push(out, ",".white());
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
}

fn close(out: &mut String, depth: usize, bracket: &str) {
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
    push(out, bracket.white().bold());
}

/// Cut `s` to at most `max_chars` characters, ending in `…` when shortened.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Tick or cross for table cells.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}
