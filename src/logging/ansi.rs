use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("valid escape regex"));

/// Removes terminal color/style escape sequences (`ESC [ {digit|;}* letter`).
pub fn strip(input: &str) -> Cow<'_, str> {
    let mut out = ANSI_ESCAPE.replace_all(input, "");

    // Removing one sequence can splice the halves of another together ("\x1b[\x1b[0mm").
    while ANSI_ESCAPE.is_match(&out) {
        out = Cow::Owned(ANSI_ESCAPE.replace_all(&out, "").into_owned());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_colors() {
        assert_eq!(strip("\x1b[31mERROR\x1b[0m hello"), "ERROR hello");
        assert_eq!(
            strip("\x1b[1;34m==>\x1b[0m \x1b[1mstage\x1b[0m"),
            "==> stage"
        );
    }

    #[test]
    fn test_strip_leaves_plain_text_alone() {
        let plain = "no codes here [0;31m, just brackets";
        assert!(matches!(strip(plain), Cow::Borrowed(_)));
        assert_eq!(strip(plain), plain);
    }

    #[test]
    fn test_strip_interleaved_sequences() {
        let input = "a\x1b[0mb\x1b[38;5;208mc\x1b[Kd\x1b[2Je";
        assert_eq!(strip(input), "abcde");
    }

    #[test]
    fn test_strip_keeps_incomplete_sequences() {
        // A lone escape or an unterminated one is not part of the grammar.
        assert_eq!(strip("\x1b"), "\x1b");
        assert_eq!(strip("\x1b[12;"), "\x1b[12;");
        assert_eq!(strip("\x1b]0;title"), "\x1b]0;title");
    }

    #[test]
    fn test_strip_spliced_sequence() {
        assert_eq!(strip("\x1b[\x1b[31mm"), "");
        assert_eq!(strip("keep\x1b[\x1b[0m1mthis"), "keepthis");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let inputs = [
            "",
            "plain",
            "\x1b[31mred\x1b[0m",
            "\x1b[\x1b[31mm",
            "x\x1b[1;2;3;4Ay\x1b",
        ];

        for input in inputs {
            let once = strip(input).into_owned();
            assert_eq!(strip(&once), once, "input {:?}", input);
        }
    }
}
