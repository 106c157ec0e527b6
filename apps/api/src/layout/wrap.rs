//! Greedy word wrap against a caller-supplied width function.

/// Splits `text` into display lines no wider than `max_width`.
///
/// Words are separated on single spaces, so a run of spaces produces empty words
/// that still take up a space's width. A word that is wider than `max_width` on its
/// own is placed alone on a line and allowed to overflow. `measure` returns the
/// rendered width of a string in the same unit as `max_width`.
pub fn wrap<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split(' ') {
        let candidate = format!("{line}{word} ");
        if measure(&candidate) < max_width {
            line = candidate;
        } else {
            if !line.is_empty() {
                lines.push(line.trim().to_string());
            }
            line = format!("{word} ");
        }
    }
    if !line.is_empty() {
        lines.push(line.trim().to_string());
    }

    lines
}
