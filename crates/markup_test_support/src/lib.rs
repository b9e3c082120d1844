//! Shared helpers for the markup integration tests: readable line diffs, TOML case files,
//! and (with `dom-snapshot`) the full diff/serialize/read/apply pipeline.

use std::fmt::Write;

pub mod cases;

#[cfg(feature = "dom-snapshot")]
pub mod pipeline;

/// Escapes control characters so snapshot lines stay on one line in failure output.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the first differing line between two snapshots with two lines of context.
/// Returns an empty string when the inputs are equal.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    fn line(lines: &[String], i: usize) -> &str {
        lines.get(i).map_or("<missing>", String::as_str)
    }

    let len = expected.len().max(actual.len());
    let Some(first) = (0..len).find(|&i| line(expected, i) != line(actual, i)) else {
        return String::new();
    };

    let mut out = String::new();
    let start = first.saturating_sub(2);
    let end = (first + 3).min(len);
    let _ = writeln!(&mut out, "first mismatch at line {}:", first + 1);
    for i in start..end {
        let marker = if i == first { ">" } else { " " };
        let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", i + 1, line(expected, i));
        let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", i + 1, line(actual, i));
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}
