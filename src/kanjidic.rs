//! Models and parses KANJIDIC.
//! See <https://www.edrdg.org/wiki/index.php/KANJIDIC_Project>

use crate::{utils, Result};
use encoding_rs::{Encoding, EUC_JP};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};
use wana_kana::ConvertJapanese;

// the KANJIDIC is formatted {kanji} {JIS code} {fields...} {readings...} [T1 {nanori...}] {{meaning}}...
static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(.) (?:[0-9A-F]{4}) (?:(?:[A-Z]\S*) )*([^{]*?) (?:T[^{]*?)?((?:\{.*?\} )*\{.*?\})",
    )
    .expect("valid line pattern")
});
static MEANING_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(.*?)\}").expect("valid meaning pattern"));

/// What is known of a single kanji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kanji {
    pub character: char,
    /// Hiragana readings, including the forms taken in compounds.
    pub readings: BTreeSet<String>,
    pub meanings: Vec<String>,
}

impl Kanji {
    /// Normalizes the raw `readings` and adds the forms they take in compounds.
    pub fn new<'a>(
        character: char,
        readings: impl IntoIterator<Item = &'a str>,
        meanings: Vec<String>,
    ) -> Self {
        let mut readings = normalize_readings(readings);
        let compounds = compound_readings(&readings);
        readings.extend(compounds);
        Kanji {
            character,
            readings,
            meanings,
        }
    }

    fn parse(line: &str) -> Option<Self> {
        let captures = LINE_PATTERN.captures(line)?;
        let character = captures.get(1)?.as_str().chars().next()?;
        let readings = captures.get(2)?.as_str().split_whitespace();
        let meanings = MEANING_PATTERN
            .captures_iter(captures.get(3)?.as_str())
            .filter_map(|meaning| meaning.get(1))
            .map(|meaning| meaning.as_str().to_string())
            .collect();
        Some(Kanji::new(character, readings, meanings))
    }
}

/// Keeps only the stem before okurigana, removes the "-" of prefixes and suffixes, and converts to hiragana.
/// ず and づ are treated as equivalent readings.
pub fn normalize_readings<'a>(readings: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    let mut normalized: BTreeSet<String> = readings
        .into_iter()
        .map(|reading| reading.split('.').next().unwrap_or_default())
        .map(|reading| reading.replace('-', "").to_hiragana())
        .filter(|reading| !reading.is_empty())
        .collect();
    if normalized.contains("ず") || normalized.contains("づ") {
        normalized.insert("ず".to_string());
        normalized.insert("づ".to_string());
    }
    normalized
}

/// The forms the readings may take inside compounds: with the last mora doubled
/// into っ (gemination), or with the first consonant voiced (rendaku).
pub fn compound_readings(readings: &BTreeSet<String>) -> BTreeSet<String> {
    let mut compounds = BTreeSet::new();
    for reading in readings {
        let mut chars = reading.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        let rest = chars.as_str();
        // only readings of two characters or more: a single mora reading would
        // become a bare っ, which then matches any small tsu in a reading
        if let Some(last) = rest.chars().last() {
            let stem = &reading[..reading.len() - last.len_utf8()];
            compounds.insert(format!("{stem}っ"));
        }
        for voiced in utils::voiced(first) {
            compounds.insert(format!("{voiced}{rest}"));
        }
    }
    compounds
}

/// Readings of kanji, loaded once and shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KanjiDic {
    kanji: HashMap<char, Kanji>,
}

impl KanjiDic {
    /// Loads an EUC-JP KANJIDIC file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_encoding(path, EUC_JP)
    }

    pub fn open_with_encoding(
        path: impl AsRef<Path>,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let kanji_dic = Self::from_bytes(&data, encoding);
        tracing::info!(path = %path.display(), kanji = kanji_dic.len(), "loaded kanji readings");
        Ok(kanji_dic)
    }

    /// Decodes and parses raw KANJIDIC data. Lines that are not valid in `encoding` are skipped.
    pub fn from_bytes(data: &[u8], encoding: &'static Encoding) -> Self {
        let kanji = utils::decoded_lines(data, encoding)
            .filter_map(|(_, line)| Kanji::parse(&line))
            .map(|kanji| (kanji.character, kanji))
            .collect();
        KanjiDic { kanji }
    }

    /// Parses the content of a KANJIDIC file; lines that do not describe a kanji are skipped.
    pub fn parse(text: &str) -> Self {
        let kanji = text
            .lines()
            .filter_map(Kanji::parse)
            .map(|kanji| (kanji.character, kanji))
            .collect();
        KanjiDic { kanji }
    }

    /// Builds a table from known readings, without meanings.
    pub fn from_readings<'a, I, R>(readings: I) -> Self
    where
        I: IntoIterator<Item = (char, R)>,
        R: IntoIterator<Item = &'a str>,
    {
        let kanji = readings
            .into_iter()
            .map(|(character, readings)| (character, Kanji::new(character, readings, Vec::new())))
            .collect();
        KanjiDic { kanji }
    }

    pub fn get(&self, character: char) -> Option<&Kanji> {
        self.kanji.get(&character)
    }

    pub fn readings(&self, character: char) -> Option<&BTreeSet<String>> {
        self.get(character).map(|kanji| &kanji.readings)
    }

    pub fn len(&self) -> usize {
        self.kanji.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kanji.is_empty()
    }
}
