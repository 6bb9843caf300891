//! Contains iterators that cut text into the fragments that may be dictionary words.
//!
//! No attempt is made at finding word boundaries: every substring of every
//! run of Japanese characters is a potential word.

use crate::utils;

/// Iterator over the maximal runs of Japanese characters (kana, kanji, 々, half-width kana) in a text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScriptRuns<'a> {
    rest: &'a str,
}

impl<'a> ScriptRuns<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for ScriptRuns<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        // skip anything that cannot be part of a word
        let start = self.rest.find(utils::is_japanese)?;
        let rest = &self.rest[start..];
        let run = if let Some(end) = rest.find(|c| !utils::is_japanese(c)) {
            self.rest = &rest[end..];
            &rest[..end]
        } else {
            self.rest = "";
            rest
        };
        Some(run)
    }
}

/// Iterator over every substring of a run, optionally limited to a number of characters.
///
/// Substrings are produced by start position, longest first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Substrings<'a> {
    // the part of the run starting at the current start position
    suffix: &'a str,
    // the substrings of `suffix` not yet produced, by their end offsets
    ends: Vec<usize>,
    max_chars: Option<usize>,
}

impl<'a> Substrings<'a> {
    pub fn new(run: &'a str, max_chars: Option<usize>) -> Self {
        let mut substrings = Self {
            suffix: run,
            ends: Vec::new(),
            max_chars,
        };
        substrings.fill_ends();
        substrings
    }

    fn fill_ends(&mut self) {
        let limit = self.max_chars.unwrap_or(usize::MAX);
        // pushed shortest first so that popping gives the longest first
        self.ends = self
            .suffix
            .char_indices()
            .take(limit)
            .map(|(idx, c)| idx + c.len_utf8())
            .collect();
    }
}

impl<'a> Iterator for Substrings<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(end) = self.ends.pop() {
                return Some(&self.suffix[..end]);
            }
            let first = self.suffix.chars().next()?;
            self.suffix = &self.suffix[first.len_utf8()..];
            self.fill_ends();
        }
    }
}

/// Every substring of every run of Japanese characters in `text`.
pub fn fragments(text: &str, max_chars: Option<usize>) -> impl Iterator<Item = &str> {
    ScriptRuns::new(text).flat_map(move |run| Substrings::new(run, max_chars))
}
