use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Terminal column width of `s`.
///
/// CJK characters and most emoji take two columns, combining marks none.
///
/// # Arguments
///
/// * `s` - The string to measure
///
/// # Examples
///
/// ```
/// use blogdesk::util::display_width;
///
/// assert_eq!(display_width("Rust"), 4);
/// assert_eq!(display_width("草稿"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Shorten `s` to at most `max_width` columns, ending in `...` when cut.
///
/// # Arguments
///
/// * `s` - The string to truncate
/// * `max_width` - Maximum display width in terminal columns
///
/// # Returns
///
/// `s` borrowed when it already fits. Otherwise an owned prefix plus `...`.
/// Widths of 3 or less leave no room for the ellipsis, so only the prefix
/// that fits is returned.
///
/// # Examples
///
/// ```
/// use blogdesk::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..end].to_owned())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}

/// Remove ANSI escape sequences and control characters from server-supplied text.
///
/// Titles and filenames come from the API and end up printed verbatim, so an
/// embedded `ESC [ ... m` or OSC sequence could restyle or retitle the
/// terminal. CSI sequences are dropped up to their final byte, OSC sequences
/// up to BEL or `ESC \`. Tab and newline survive.
///
/// # Arguments
///
/// * `s` - Untrusted text from the API
///
/// # Returns
///
/// `s` borrowed when it is already clean, otherwise a cleaned copy.
///
/// # Examples
///
/// ```
/// use blogdesk::util::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("plain"), "plain");
/// assert_eq!(sanitize_for_terminal("\x1b[31mred\x1b[0m"), "red");
/// assert_eq!(sanitize_for_terminal("a\x07b"), "ab");
/// ```
pub fn sanitize_for_terminal(s: &str) -> Cow<'_, str> {
    let is_unsafe = |c: char| c == '\x1b' || (c.is_control() && c != '\t' && c != '\n');
    if !s.chars().any(is_unsafe) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
        } else if !is_unsafe(c) {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("12345", 5), "12345");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each of these is two columns
        assert_eq!(truncate_to_width("技术分类", 7), "技术...");
        assert_eq!(truncate_to_width("技术分类", 8), "技术分类");
        assert_eq!(truncate_to_width("技术", 3), "技");
    }

    #[test]
    fn test_truncate_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
        assert_eq!(truncate_to_width("Testing", 4), "T...");
    }

    #[test]
    fn test_truncate_borrows_when_fits() {
        assert!(matches!(truncate_to_width("fits", 10), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_clean_text_borrowed() {
        let input = "Plain title\twith tab";
        assert!(matches!(sanitize_for_terminal(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_strips_csi_and_controls() {
        assert_eq!(sanitize_for_terminal("\x1b[1;31mBold\x1b[0m"), "Bold");
        assert_eq!(sanitize_for_terminal("a\x00b\x07c\x7fd"), "abcd");
    }

    #[test]
    fn test_sanitize_strips_osc() {
        assert_eq!(sanitize_for_terminal("\x1b]0;pwned\x07safe"), "safe");
        assert_eq!(sanitize_for_terminal("\x1b]0;pwned\x1b\\safe"), "safe");
    }

    #[test]
    fn test_sanitize_keeps_unicode() {
        assert_eq!(sanitize_for_terminal("生活\x1b[2A随笔"), "生活随笔");
    }
}
