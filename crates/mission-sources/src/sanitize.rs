//! Scrubbing of caller text before it is forwarded to an external process.
//!
//! Commands are always spawned in argument-vector form, so no shell ever
//! sees the text. Stripping still applies so a value stays a single inert
//! argument for whatever the receiving tool does with it.

/// Characters removed wherever they appear.
const STRIPPED: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '\\', '<', '>',
];

/// Strip shell metacharacters, control characters and newlines, then any
/// leading dashes so the value can never be read as a flag.
pub fn sanitize_arg(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !STRIPPED.contains(c) && !c.is_control())
        .collect();
    cleaned
        .trim_start_matches(|c: char| c == '-' || c.is_whitespace())
        .trim_end()
        .to_string()
}
