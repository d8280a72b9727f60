// Output formatting — terminal display, JSON summary and SVG charts.

pub mod plot;
pub mod summary;
pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries; plot summaries are full of accented
/// names and curly quotes.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Amélie", 10), "Amélie");
        assert_eq!(truncate_chars("Amélie", 3), "Amé...");
    }
}
