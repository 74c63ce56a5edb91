// Slightly adjusted macro from https://docs.rs/once_cell/latest/once_cell/#lazily-compiled-regex:
#[macro_export]
macro_rules! once_cell_regex {
    ($re:expr $(,)?) => {{
        static RE: std::sync::OnceLock<regex_lite::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex_lite::Regex::new($re).unwrap())
    }};
}

// Counts leading whitespace in chars, not bytes: KIF headers are full-width Japanese.
pub fn leading_whitespace_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

// Drops the first `width` chars if the line is at least that long; shorter lines
// pass through unchanged.
pub fn strip_chars(line: &str, width: usize) -> &str {
    match line.char_indices().nth(width) {
        Some((pos, _)) => &line[pos..],
        None if line.chars().count() == width => "",
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn strip_chars_multibyte() {
        assert_eq!(strip_chars("  先手：A", 2), "先手：A");
        assert_eq!(strip_chars("先手", 2), "");
        assert_eq!(strip_chars("短", 2), "短");
        assert_eq!(strip_chars("", 0), "");
    }

    #[test]
    fn leading_width_counts_chars() {
        assert_eq!(leading_whitespace_width("    x"), 4);
        assert_eq!(leading_whitespace_width("x"), 0);
        assert_eq!(leading_whitespace_width(""), 0);
    }
}
