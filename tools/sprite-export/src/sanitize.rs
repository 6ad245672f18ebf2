//! Identifier sanitizing for generated C names
//!
//! Converts file name fragments like `"Agumon (v2)"` into identifier
//! fragments like `"Agumon_v2"`. Case is preserved; callers pick the case
//! transform for the identifier role (`capitalize` for variable/file names,
//! `to_uppercase` for macros).

/// Token returned when nothing usable survives sanitizing
pub const FALLBACK_IDENTIFIER: &str = "_";

/// Sanitize arbitrary text into a C identifier fragment.
///
/// Never returns an empty string, never has leading/trailing underscores
/// (except for the bare fallback) and never contains `__`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut replaced: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if replaced.starts_with(|c: char| c.is_ascii_digit()) {
        replaced.insert(0, '_');
    }

    // Collapse consecutive underscores after trimming leading/trailing ones
    let mut result = String::with_capacity(replaced.len());
    let mut prev_was_underscore = false;

    for c in replaced.trim_matches('_').chars() {
        if c == '_' {
            if !prev_was_underscore {
                result.push(c);
            }
            prev_was_underscore = true;
        } else {
            result.push(c);
            prev_was_underscore = false;
        }
    }

    if result.is_empty() {
        return FALLBACK_IDENTIFIER.to_string();
    }

    result
}

/// Upper-case the first character and lower-case the rest (`"aGUMON"` -> `"Agumon"`).
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
