use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Display width of a string in terminal columns (CJK and emoji count as 2).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Drop control characters from provider-supplied text before it reaches a
/// terminal. Escape sequences lose their ESC byte and become inert.
///
/// Returns `Cow::Borrowed` when nothing needs removing.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|c| !c.is_control()).collect())
}

/// Fit `s` into exactly `width` columns: truncated with an ellipsis when too
/// long, padded with spaces when too short.
pub fn fit_column(s: &str, width: usize) -> String {
    let clean = strip_control_chars(s);
    let mut out = String::with_capacity(width);
    let mut used = 0;

    if display_width(&clean) <= width {
        out.push_str(&clean);
        used = display_width(&clean);
    } else if width > 0 {
        // Leave one column for the ellipsis
        let budget = width - 1;
        for c in clean.chars() {
            let w = UnicodeWidthChar::width(c).unwrap_or(0);
            if used + w > budget {
                break;
            }
            out.push(c);
            used += w;
        }
        out.push(ELLIPSIS);
        used += 1;
    }

    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_pads_short_text() {
        assert_eq!(fit_column("Cafe", 6), "Cafe  ");
    }

    #[test]
    fn test_fit_truncates_long_text() {
        assert_eq!(fit_column("Blue Door Bakery", 8), "Blue Do…");
        assert_eq!(display_width(&fit_column("Blue Door Bakery", 8)), 8);
    }

    #[test]
    fn test_fit_wide_chars_never_overflow() {
        // Each CJK char is 2 columns; 5 columns fits two chars + ellipsis
        let fitted = fit_column("你好世界", 5);
        assert_eq!(fitted, "你好…");
        assert!(display_width(&fitted) <= 5);
    }

    #[test]
    fn test_fit_zero_width() {
        assert_eq!(fit_column("anything", 0), "");
    }

    #[test]
    fn test_strip_control_chars() {
        assert_eq!(strip_control_chars("plain"), Cow::Borrowed("plain"));
        assert_eq!(strip_control_chars("evil\x1b[31mred\x07"), "evil[31mred");
    }
}
