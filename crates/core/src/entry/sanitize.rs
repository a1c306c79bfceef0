//! File name sanitization for template fields.

/// Characters that are invalid in a path component on at least one
/// supported platform.
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Device names Windows refuses as file names, with or without extension.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Longest component most filesystems accept, in bytes.
const MAX_COMPONENT_BYTES: usize = 255;

/// Makes `value` usable as a single path component.
///
/// Forbidden and control characters are dropped, surrounding whitespace and
/// trailing dots are trimmed, and the result is truncated on a character
/// boundary. An empty result becomes `"_"`, and reserved device names
/// such as `CON` get a `_` prefix.
pub fn sanitize_file_name(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !FORBIDDEN.contains(c) && !c.is_control())
        .collect();

    let trimmed = cleaned.trim().trim_end_matches('.').trim_end();

    let mut end = trimmed.len().min(MAX_COMPONENT_BYTES);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    let truncated = &trimmed[..end];

    if truncated.is_empty() || truncated == "." || truncated == ".." {
        return "_".to_string();
    }
    if is_reserved(truncated) {
        return format!("_{truncated}");
    }
    truncated.to_string()
}

fn is_reserved(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name).trim_end();
    RESERVED_NAMES
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
}
