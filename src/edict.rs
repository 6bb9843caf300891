//! Parses EDICT2 and ENAMDICT dictionaries and keeps them in memory.
//!
//! Each line holds one entry; for example:
//! ```text
//! 日本 [にほん(P);にっぽん] /(n) Japan/(P)/EntL1582710X/
//! あやかし /(n) (1) ghost that appears at sea during a shipwreck/(2) something strange or suspicious/EntL2143630X/
//! ```

use crate::{furigana, utils, word_class, KanjiDic, Result};
use encoding_rs::{Encoding, EUC_JP, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{borrow::Cow, collections::HashMap, path::Path};

static LINE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S*) (?:\[(\S*?)\] )?/(.*)/.*$").expect("valid line pattern"));
// common markers such as "(P)" or "(iK)" attached to writings and readings
static MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid marker pattern"));
// part-of-speech tags such as "(v5r,vt)" in the glosses
static TAGS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]*)\)").expect("valid tags pattern"));
// leading "(n) (1) " of a gloss
static GLOSS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\(([^0-9]\S*)\) )?(?:\(([0-9]+)\) )?(.*)").expect("valid gloss pattern")
});

/// A single dictionary line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DictionaryEntry {
    /// The line as found in the dictionary, without line terminator.
    pub line: String,
    /// Byte offset of the line in the dictionary file.
    pub offset: u64,
    /// Grammatical classes of the entry, see [`word_class`]. Bit 7 is always set.
    pub type_mask: u8,
    /// Kanji writings, most common first.
    pub writings: Vec<String>,
    /// Kana readings, most common first. Empty when the writings are themselves kana.
    pub readings: Vec<String>,
    glosses: String,
}

impl DictionaryEntry {
    /// Parses a line, returning `None` if it is not an entry.
    pub fn parse(line: &str, offset: u64) -> Option<Self> {
        let captures = LINE_PATTERN.captures(line)?;
        let writings = split_alternates(captures.get(1)?.as_str());
        let readings = captures
            .get(2)
            .map(|readings| split_alternates(readings.as_str()))
            .unwrap_or_default();
        let glosses = captures.get(3)?.as_str();
        let type_mask = word_class::from_markers(
            TAGS_PATTERN
                .captures_iter(glosses)
                .filter_map(|tags| tags.get(1))
                .flat_map(|tags| tags.as_str().split(',')),
        );
        Some(DictionaryEntry {
            line: line.to_string(),
            offset,
            type_mask,
            writings,
            readings,
            glosses: glosses.to_string(),
        })
    }

    /// All the strings this entry can be found under.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.writings
            .iter()
            .chain(&self.readings)
            .map(String::as_str)
    }

    pub fn primary_writing(&self) -> &str {
        self.writings.first().map(String::as_str).unwrap_or_default()
    }

    /// The main reading, or the writing itself for kana-only entries.
    pub fn primary_reading(&self) -> &str {
        self.readings
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.primary_writing())
    }

    /// The "EntL…" sequence number of EDICT2 entries.
    pub fn sequence_number(&self) -> Option<&str> {
        self.glosses
            .rsplit('/')
            .next()
            .filter(|gloss| gloss.starts_with("EntL"))
    }

    /// The meanings of the entry, with the glosses of each sense joined by "; ".
    pub fn meanings(&self) -> Vec<String> {
        let mut meanings = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for gloss in self.glosses.split('/') {
            if gloss == "(P)" || gloss.starts_with("EntL") {
                continue;
            }
            let Some(captures) = GLOSS_PATTERN.captures(gloss) else {
                continue;
            };
            let starts_sense = captures.get(2).is_some();
            if starts_sense && !current.is_empty() {
                meanings.push(current.join("; "));
                current.clear();
            }
            if let Some(meaning) = captures.get(3) {
                current.push(meaning.as_str());
            }
        }
        if !current.is_empty() {
            meanings.push(current.join("; "));
        }
        meanings
    }

    /// Annotates the main writing with its main reading.
    pub fn furigana(&self, kanji_dic: &KanjiDic) -> String {
        furigana::furigana(kanji_dic, self.primary_writing(), self.primary_reading())
    }
}

// "あの人(P);彼の人" → ["あの人", "彼の人"]
fn split_alternates(field: &str) -> Vec<String> {
    let field = MARKER_PATTERN.replace_all(field, "");
    let mut alternates: Vec<String> = Vec::new();
    for alternate in field.split(';') {
        if !alternate.is_empty() && !alternates.iter().any(|a| a == alternate) {
            alternates.push(alternate.to_string());
        }
    }
    alternates
}

/// Something that can find the dictionary entries containing a word.
pub trait Lookup {
    /// Returns the entries having `word` as one of their writings or readings.
    /// A missing word gives an empty list rather than an error.
    fn lookup(&self, word: &str) -> Result<Vec<Cow<'_, DictionaryEntry>>>;
}

/// A dictionary fully loaded in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edict {
    entries: Vec<DictionaryEntry>,
    keys: HashMap<String, Vec<usize>>,
}

impl Edict {
    /// Loads an EUC-JP dictionary.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_encoding(path, EUC_JP)
    }

    pub fn open_with_encoding(
        path: impl AsRef<Path>,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let edict = Self::from_bytes(&data, encoding);
        tracing::info!(
            path = %path.display(),
            entries = edict.len(),
            keys = edict.keys.len(),
            "loaded dictionary"
        );
        Ok(edict)
    }

    /// Parses raw dictionary data. Lines that are not entries, or not valid in `encoding`, are skipped.
    pub fn from_bytes(data: &[u8], encoding: &'static Encoding) -> Self {
        let mut edict = Edict::default();
        for (offset, line) in utils::decoded_lines(data, encoding) {
            match DictionaryEntry::parse(&line, offset) {
                Some(entry) => edict.insert(entry),
                None => tracing::debug!(offset, %line, "skipping malformed line"),
            }
        }
        edict
    }

    /// Parses dictionary data that has already been decoded. Offsets count UTF-8 bytes.
    pub fn parse_str(data: &str) -> Self {
        Self::from_bytes(data.as_bytes(), UTF_8)
    }

    fn insert(&mut self, entry: DictionaryEntry) {
        let id = self.entries.len();
        for key in entry.keys() {
            let ids = self.keys.entry(key.to_string()).or_default();
            // the same string may be both a writing and a reading
            if ids.last() != Some(&id) {
                ids.push(id);
            }
        }
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Every key along with the entries containing it, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, impl Iterator<Item = &DictionaryEntry>)> {
        let entries = &self.entries;
        self.keys
            .iter()
            .map(move |(key, ids)| (key.as_str(), ids.iter().map(move |&id| &entries[id])))
    }

    /// Returns the entries containing `word` without copying them.
    pub fn get(&self, word: &str) -> impl Iterator<Item = &DictionaryEntry> {
        self.keys
            .get(word)
            .into_iter()
            .flatten()
            .map(move |&id| &self.entries[id])
    }
}

impl Lookup for Edict {
    fn lookup(&self, word: &str) -> Result<Vec<Cow<'_, DictionaryEntry>>> {
        Ok(self.get(word).map(Cow::Borrowed).collect())
    }
}

impl<L: Lookup + ?Sized> Lookup for &L {
    fn lookup(&self, word: &str) -> Result<Vec<Cow<'_, DictionaryEntry>>> {
        (**self).lookup(word)
    }
}
