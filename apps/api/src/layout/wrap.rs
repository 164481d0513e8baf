//! Greedy line wrapping.
//!
//! One algorithm, two measures: a column pass (every char is 1 wide) and a
//! printed-width pass (chars measured in em from the font table). Both keep
//! interior whitespace, drop whitespace at line ends, and break words that are
//! longer than a whole line.

use crate::layout::font_metrics::{FontMetricTable, PageConfig};

/// Wraps `line` to at most `columns` characters per line.
///
/// A whitespace-only or empty input yields no lines. Leading indentation of the
/// first line is preserved; on continuation lines it is dropped.
pub fn wrap_columns(line: &str, columns: usize) -> Vec<String> {
    wrap_with(line, columns.max(1) as f32, |_| 1.0)
}

/// Wraps `line` so that each piece fits the printable width of `config`.
pub fn wrap_to_width(line: &str, metrics: &FontMetricTable, config: &PageConfig) -> Vec<String> {
    wrap_with(line, config.text_width_em(), |c| metrics.char_width(c))
}

/// Splits into alternating runs of whitespace and non-whitespace.
/// Every whitespace char becomes a plain space.
fn chunks(line: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_space = false;

    for c in line.chars() {
        let is_space = c.is_whitespace();
        if !current.is_empty() && is_space != in_space {
            out.push(std::mem::take(&mut current));
        }
        in_space = is_space;
        current.push(if is_space { ' ' } else { c });
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn is_blank(chunk: &str) -> bool {
    chunk.chars().all(|c| c == ' ')
}

fn wrap_with<F>(line: &str, max_width: f32, char_width: F) -> Vec<String>
where
    F: Fn(char) -> f32,
{
    let measure = |s: &str| -> f32 { s.chars().map(&char_width).sum() };

    let mut pending = chunks(line);
    pending.reverse();
    let mut lines: Vec<String> = Vec::new();

    while !pending.is_empty() {
        let mut current: Vec<String> = Vec::new();
        let mut current_width = 0.0_f32;

        if !lines.is_empty() && pending.last().is_some_and(|c| is_blank(c)) {
            pending.pop();
        }

        while let Some(chunk) = pending.last() {
            let w = measure(chunk);
            if current_width + w <= max_width {
                current_width += w;
                current.push(pending.pop().unwrap_or_default());
            } else {
                break;
            }
        }

        // A chunk wider than a whole line is split at whatever room is left.
        if let Some(chunk) = pending.last_mut() {
            if measure(chunk) > max_width {
                let room = max_width - current_width;
                let mut split_at = 0usize;
                let mut used = 0.0_f32;
                for (idx, c) in chunk.char_indices() {
                    let w = char_width(c);
                    if used + w > room {
                        break;
                    }
                    used += w;
                    split_at = idx + c.len_utf8();
                }
                if split_at == 0 && current.is_empty() {
                    // Always make progress, even if one glyph is wider than the line.
                    split_at = chunk.chars().next().map(char::len_utf8).unwrap_or(0);
                }
                if split_at > 0 {
                    let rest = chunk.split_off(split_at);
                    current.push(std::mem::replace(chunk, rest));
                }
            }
        }

        if current.last().is_some_and(|c| is_blank(c)) {
            current.pop();
        }
        if !current.is_empty() {
            lines.push(current.concat());
        }
    }

    lines
}
