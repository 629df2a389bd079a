//! Finder - RKM codes embedded in free text
//!
//! Candidates are located with one of two patterns and handed to the
//! parser; anything the parser rejects is skipped.

use regex::{Match, Regex};
use rkm_core::Quantity;
use std::borrow::Cow;
use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;
use tracing::trace;

use crate::helpers::{get_regex, sign_pattern, LETTERS};
use crate::{ParseError, Preferences};

/// Which kind of code to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FindMode {
    /// Either kind, leftmost first
    #[default]
    Any,
    /// Codes that start with a digit: `4K7`, `200nA`
    LeadingDigits,
    /// Codes that end with a digit: `R47`, `sink200`
    TrailingDigits,
}

impl FromStr for FindMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(FindMode::Any),
            "ld" => Ok(FindMode::LeadingDigits),
            "td" => Ok(FindMode::TrailingDigits),
            other => Err(ParseError::UnknownFindMode(other.to_string())),
        }
    }
}

impl fmt::Display for FindMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindMode::Any => write!(f, ""),
            FindMode::LeadingDigits => write!(f, "ld"),
            FindMode::TrailingDigits => write!(f, "td"),
        }
    }
}

fn leading_pattern(minus_sign: &str) -> String {
    format!(
        r"(?:[pnm]\d+|{sign}?\d+){l}+(?:\d+{l}*)?",
        sign = sign_pattern(minus_sign),
        l = LETTERS,
    )
}

fn trailing_pattern(minus_sign: &str) -> String {
    format!(
        r"(?:[pnm]\d+{l}+\d+|{sign}?\d*{l}+\d+)",
        sign = sign_pattern(minus_sign),
        l = LETTERS,
    )
}

/// Lazy iterator over the quantities found in a text
///
/// Matches never overlap and come out left to right. Cloning a finder
/// gives an independent cursor over the same text.
#[derive(Debug, Clone)]
pub struct Finder<'a> {
    text: &'a str,
    pos: usize,
    mode: FindMode,
    prefs: Cow<'a, Preferences>,
    patterns: Option<(Regex, Regex)>,
}

impl<'a> Finder<'a> {
    pub fn new(text: &'a str, mode: FindMode, prefs: Cow<'a, Preferences>) -> Self {
        let patterns = get_regex(&leading_pattern(&prefs.minus_sign))
            .and_then(|ld| Ok((ld, get_regex(&trailing_pattern(&prefs.minus_sign))?)))
            .map_err(|err| trace!(%err, "finder patterns unavailable"))
            .ok();
        Finder { text, pos: 0, mode, prefs, patterns }
    }

    /// Next match of `re`, passing over a sign letter that ends a word
    ///
    /// In `gain2n5` the `n` belongs to `gain`, so the code is `2n5`.
    fn find(&self, re: &Regex) -> Option<Match<'a>> {
        let mut pos = self.pos;
        loop {
            let found = re.find_at(self.text, pos)?;
            if !self.starts_inside_word(&found) {
                return Some(found);
            }
            pos = found.start() + 1;
        }
    }

    fn starts_inside_word(&self, found: &Match<'a>) -> bool {
        let mut chars = found.as_str().chars();
        let letter_sign = matches!(chars.next(), Some('p' | 'n' | 'm'))
            && chars.next().is_some_and(|c| c.is_ascii_digit());
        letter_sign
            && self.text[..found.start()]
                .chars()
                .next_back()
                .is_some_and(char::is_alphabetic)
    }

    fn candidate(&self, leading: &Regex, trailing: &Regex) -> Option<Match<'a>> {
        match self.mode {
            FindMode::LeadingDigits => self.find(leading),
            FindMode::TrailingDigits => self.find(trailing),
            FindMode::Any => {
                match (self.find(leading), self.find(trailing)) {
                    (Some(ld), Some(td)) => {
                        let td_first = td.start() < ld.start()
                            || (td.start() == ld.start() && td.end() > ld.end());
                        Some(if td_first { td } else { ld })
                    }
                    (ld, td) => ld.or(td),
                }
            }
        }
    }
}

impl<'a> Iterator for Finder<'a> {
    type Item = Quantity;

    fn next(&mut self) -> Option<Quantity> {
        let (leading, trailing) = self.patterns.clone()?;

        while self.pos <= self.text.len() {
            let Some(candidate) = self.candidate(&leading, &trailing) else {
                self.pos = self.text.len() + 1;
                return None;
            };

            match self.prefs.from_rkm(candidate.as_str()) {
                Ok(quantity) => {
                    self.pos = candidate.end();
                    return Some(quantity);
                }
                Err(err) => {
                    trace!(candidate = candidate.as_str(), %err, "skipping candidate");
                    let width = self.text[candidate.start()..].chars().next().map_or(1, char::len_utf8);
                    self.pos = candidate.start() + width;
                }
            }
        }
        None
    }
}

impl FusedIterator for Finder<'_> {}

impl Preferences {
    /// Find every RKM code in `text`
    pub fn find_rkm<'a>(&'a self, text: &'a str, mode: FindMode) -> Finder<'a> {
        Finder::new(text, mode, Cow::Borrowed(self))
    }
}
