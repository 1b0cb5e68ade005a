//! Text search over labelled items
//!
//! Two matching modes are supported. `Substring` is a case-insensitive
//! containment test. `Regex` compiles the term as a case-insensitive
//! pattern; when the term is not a valid pattern the filter degrades to
//! substring matching and highlighting leaves the text untouched. Typing a
//! half-finished pattern must never blank the list, so this degraded mode is
//! intentional.
//!
//! Highlighting is deliberately asymmetric: regex mode marks every
//! non-overlapping match, substring mode marks only the first occurrence.

use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// How a search term is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Substring,
    Regex,
}

impl From<bool> for MatchMode {
    fn from(regex: bool) -> Self {
        if regex {
            MatchMode::Regex
        } else {
            MatchMode::Substring
        }
    }
}

/// Markers wrapped around highlighted matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightMarker {
    pub open: String,
    pub close: String,
}

impl Default for HighlightMarker {
    fn default() -> Self {
        Self {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        }
    }
}

enum Matcher {
    Pattern(Regex),
    Substring(String),
}

impl Matcher {
    fn new(term: &str, mode: MatchMode) -> Self {
        if mode == MatchMode::Regex {
            match compile(term) {
                Ok(re) => return Matcher::Pattern(re),
                Err(e) => debug!("Invalid search pattern {:?}, using substring match: {}", term, e),
            }
        }
        Matcher::Substring(term.to_lowercase())
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Pattern(re) => re.is_match(text),
            Matcher::Substring(lower) => text.to_lowercase().contains(lower.as_str()),
        }
    }
}

fn compile(term: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(term).case_insensitive(true).build()
}

/// Keep the items whose text matches `term`
///
/// An empty term keeps everything.
pub fn filter_by_search<I, T, F, S>(items: I, term: &str, mode: MatchMode, text_of: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> S,
    S: AsRef<str>,
{
    if term.is_empty() {
        return items.into_iter().collect();
    }

    let matcher = Matcher::new(term, mode);
    items
        .into_iter()
        .filter(|item| matcher.is_match(text_of(item).as_ref()))
        .collect()
}

/// Wrap matches of `term` in `text` with the default `<mark>` marker
pub fn highlight_match(text: &str, term: &str, mode: MatchMode) -> String {
    highlight_match_with(text, term, mode, &HighlightMarker::default())
}

/// Wrap matches of `term` in `text` with `marker`
pub fn highlight_match_with(
    text: &str,
    term: &str,
    mode: MatchMode,
    marker: &HighlightMarker,
) -> String {
    if term.is_empty() {
        return text.to_string();
    }

    match mode {
        MatchMode::Regex => match compile(term) {
            Ok(re) => re
                .replace_all(text, |caps: &Captures<'_>| {
                    format!("{}{}{}", marker.open, &caps[0], marker.close)
                })
                .into_owned(),
            Err(_) => text.to_string(),
        },
        MatchMode::Substring => match find_case_insensitive(text, term) {
            Some(range) => format!(
                "{}{}{}{}{}",
                &text[..range.start],
                marker.open,
                &text[range.clone()],
                marker.close,
                &text[range.end..]
            ),
            None => text.to_string(),
        },
    }
}

/// Byte range of the first case-insensitive occurrence of `needle`
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<Range<usize>> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    'start: for (start, _) in haystack.char_indices() {
        let mut pending = needle.iter().peekable();
        for (offset, ch) in haystack[start..].char_indices() {
            for lower in ch.to_lowercase() {
                match pending.next() {
                    Some(&want) if want == lower => {}
                    _ => continue 'start,
                }
            }
            if pending.peek().is_none() {
                return Some(start..start + offset + ch.len_utf8());
            }
        }
    }
    None
}
