//! Visible-text normalization for prompt matching.
//!
//! Terminal output is run through a `vte` parser so escape sequences (CSI,
//! OSC, DCS, charset selectors) never reach the matcher. Printable characters
//! are kept along with `\n`, `\r` and `\t`; every other control byte is
//! dropped. Afterwards each line is reduced to the text after its last
//! carriage return, which is what a terminal would show after an overwrite.

use memchr::memrchr;
use vte::{Parser, Perform};

/// Collects the printable output of the parser.
struct VisibleText {
    output: String,
}

impl Perform for VisibleText {
    fn print(&mut self, c: char) {
        self.output.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' | b'\r' | b'\t' => self.output.push(byte as char),
            _ => {}
        }
    }
}

/// Strip escape sequences and control bytes, then resolve carriage returns.
///
/// Invalid UTF-8 is replaced with `U+FFFD`. An escape sequence cut off at the
/// end of `raw` produces no output.
pub fn clean(raw: &[u8]) -> String {
    let mut parser = Parser::new();
    let mut visible = VisibleText {
        output: String::with_capacity(raw.len()),
    };
    parser.advance(&mut visible, raw);
    resolve_overwrites(&visible.output)
}

/// [`clean`] for text that is already a string.
pub fn clean_str(raw: &str) -> String {
    clean(raw.as_bytes())
}

/// Keep only the final carriage-return segment of every line.
fn resolve_overwrites(text: &str) -> String {
    let mut resolved = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            resolved.push('\n');
        }
        match memrchr(b'\r', line.as_bytes()) {
            // '\r' is ASCII so `pos + 1` is a char boundary
            Some(pos) => resolved.push_str(&line[pos + 1..]),
            None => resolved.push_str(line),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(clean(b"hello world"), "hello world");
    }

    #[test]
    fn test_strips_color_codes() {
        assert_eq!(clean(b"\x1b[1;33mContinue? [y/n]\x1b[0m"), "Continue? [y/n]");
    }

    #[test]
    fn test_strips_cursor_movement() {
        assert_eq!(clean(b"\x1b[2K\x1b[1Gready"), "ready");
    }

    #[test]
    fn test_strips_window_title() {
        assert_eq!(clean(b"\x1b]0;my title\x07prompt"), "prompt");
        assert_eq!(clean(b"\x1b]2;title\x1b\\prompt"), "prompt");
    }

    #[test]
    fn test_strips_charset_selectors() {
        assert_eq!(clean(b"\x1b(Bplain\x1b)0"), "plain");
    }

    #[test]
    fn test_drops_control_bytes_but_keeps_newlines() {
        assert_eq!(clean(b"a\x07b\x08c\nd"), "abc\nd");
    }

    #[test]
    fn test_carriage_return_overwrite() {
        assert_eq!(clean_str("old text\rnew text"), "new text");
    }

    #[test]
    fn test_carriage_return_per_line() {
        assert_eq!(
            clean_str("10%\r50%\r100%\ndone\rDONE"),
            "100%\nDONE"
        );
    }

    #[test]
    fn test_trailing_carriage_return_clears_line() {
        assert_eq!(clean_str("progress\r"), "");
        assert_eq!(clean_str("line\r\nnext"), "\nnext");
    }

    #[test]
    fn test_unicode_preserved() {
        assert_eq!(clean_str("❯ 1. Yes"), "❯ 1. Yes");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean(b""), "");
    }
}
