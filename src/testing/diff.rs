//! Line diffs between expected and actual text

use similar::{ChangeTag, TextDiff};

const NO_NEWLINE: &str = "\\ No newline at end of file";

/// Render a line diff of `expected` against `actual`
///
/// Each line is prefixed with `-` (expected only), `+` (actual only) or a
/// space (both), in input order, joined with `\n`. When only one side ends
/// with a newline, its unterminated last line is followed by a
/// `\ No newline at end of file` marker.
pub fn line_diff(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mark_missing = expected.ends_with('\n') != actual.ends_with('\n');
    let mut lines = Vec::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => ' ',
        };
        let value = change.value();
        let value = value.strip_suffix('\n').unwrap_or(value);
        let value = value.strip_suffix('\r').unwrap_or(value);
        lines.push(format!("{}{}", sign, value));
        if mark_missing && change.missing_newline() {
            lines.push(NO_NEWLINE.to_string());
        }
    }

    lines.join("\n")
}
