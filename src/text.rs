//! Cell-width measurement and word wrapping.
//!
//! The feed lays out play descriptions itself instead of letting the
//! paragraph widget wrap them, so the height it budgets for a play is exactly
//! the height that gets drawn.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn width(text: &str) -> usize {
    text.width()
}

/// Wraps `text` at word boundaries to lines of at most `width` cells.
///
/// Words wider than a whole line are split mid-word. Always returns at least
/// one line, so empty text still occupies a row.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if line_width > 0 && line_width + 1 + word_width <= width {
            line.push(' ');
            line.push_str(word);
            line_width += 1 + word_width;
            continue;
        }

        if line_width > 0 {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }

        if word_width <= width {
            line.push_str(word);
            line_width = word_width;
            continue;
        }

        for c in word.chars() {
            let w = c.width().unwrap_or(0);
            if line_width + w > width && line_width > 0 {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            line.push(c);
            line_width += w;
        }
    }

    if line_width > 0 || lines.is_empty() {
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_at_word_boundaries() {
        let lines = wrap("J.Allen pass short left to K.Shakir for 7 yards", 20);
        assert_eq!(
            lines,
            vec!["J.Allen pass short", "left to K.Shakir for", "7 yards"]
        );
        assert!(lines.iter().all(|l| width(l) <= 20));
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        assert_eq!(wrap("END GAME", 40), vec!["END GAME"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
    }

    #[test]
    fn test_wrap_empty_text_is_one_line() {
        assert_eq!(wrap("", 10), vec![String::new()]);
        assert_eq!(wrap("   ", 10), vec![String::new()]);
    }

    #[test]
    fn test_wrap_zero_width_still_terminates() {
        assert_eq!(wrap("ab", 0), vec!["a", "b"]);
    }
}
