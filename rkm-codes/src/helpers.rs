//! Helper functions shared by the parser and the finder

use regex::Regex;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::ParseError;

/// Letters that may make up a base code or units
pub const LETTERS: &str = r"[A-Za-zΩ℧μµ]";

/// Symbolic signs accepted in front of a code, besides the configured minus sign
pub const SIGNS: &str = "+-−";

/// Regex cache for compiled patterns
static REGEX_CACHE: OnceLock<RwLock<HashMap<String, Regex>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, Regex>> {
    REGEX_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Get or compile a regex pattern with caching
///
/// Patterns depend on the configured minus sign, so they are built at run
/// time and cached per distinct pattern.
pub fn get_regex(pattern: &str) -> Result<Regex, ParseError> {
    let cache = get_cache();

    // Try read lock first
    if let Ok(read_guard) = cache.read() {
        if let Some(re) = read_guard.get(pattern) {
            return Ok(re.clone());
        }
    }

    let re = Regex::new(pattern).map_err(|e| ParseError::Malformed(e.to_string()))?;

    // Try to cache it (don't fail if we can't)
    if let Ok(mut write_guard) = cache.write() {
        write_guard.insert(pattern.to_string(), re.clone());
    }

    Ok(re)
}

/// Character class body matching every symbolic sign, including `minus_sign`
/// when it is a single non-letter character
pub fn sign_class(minus_sign: &str) -> String {
    let mut class = String::from(r"+\-−");
    let mut chars = minus_sign.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if !SIGNS.contains(c) && !c.is_alphanumeric() {
            class.push_str(&regex::escape(&c.to_string()));
        }
    }
    class
}

/// Alternation matching a symbolic sign: the class above, plus a
/// multi-character minus sign when one is configured
pub fn sign_pattern(minus_sign: &str) -> String {
    let class = format!("[{}]", sign_class(minus_sign));
    let is_word = minus_sign.chars().all(|c| c.is_alphanumeric());
    if minus_sign.chars().count() > 1 && !is_word {
        format!("(?:{}|{})", regex::escape(minus_sign), class)
    } else {
        class
    }
}
