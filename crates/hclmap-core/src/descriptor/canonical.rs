//! Canonical property names
//!
//! Identifiers are turned into lowercase snake case keys: camel-case humps,
//! acronym runs and letter/digit boundaries are split with `_`. A single
//! leading capital stays attached to the word after it (`UInt8` is
//! `uint_8`).

use regex::{Captures, Regex};
use std::sync::OnceLock;

struct Patterns {
    acronym: Regex,
    hump: Regex,
    letter_digit: Regex,
    digit_letter: Regex,
    separators: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        acronym: Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("Valid regex pattern"),
        hump: Regex::new(r"([a-z])([A-Z])").expect("Valid regex pattern"),
        letter_digit: Regex::new(r"([A-Za-z])([0-9])").expect("Valid regex pattern"),
        digit_letter: Regex::new(r"([0-9])([A-Za-z])").expect("Valid regex pattern"),
        separators: Regex::new(r"[^A-Za-z0-9]+").expect("Valid regex pattern"),
    })
}

/// Canonical property key for an identifier
///
/// ```
/// use hclmap_core::descriptor::canonicalize;
///
/// assert_eq!(canonicalize("Float32"), "float_32");
/// assert_eq!(canonicalize("HTTPServer"), "http_server");
/// assert_eq!(canonicalize("base_property"), "base_property");
/// ```
pub fn canonicalize(ident: &str) -> String {
    let p = patterns();
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    let s = p.acronym.replace_all(ident, |caps: &Captures<'_>| {
        let run = &caps[1];
        if run.len() == 1 && caps.get(1).map_or(false, |m| m.start() == 0) {
            caps[0].to_string()
        } else {
            format!("{}_{}", run, &caps[2])
        }
    });
    let s = p.hump.replace_all(&s, "${1}_${2}");
    let s = p.letter_digit.replace_all(&s, "${1}_${2}");
    let s = p.digit_letter.replace_all(&s, "${1}_${2}");
    let s = p.separators.replace_all(&s, "_");
    s.trim_matches('_').to_lowercase()
}
