//! Locations of the data files.

use crate::{index, Deinflector, Edict, IndexedEdict, KanjiDic, Result};
use std::path::{Path, PathBuf};

pub const WORDS_FILE: &str = "edict2";
pub const NAMES_FILE: &str = "enamdict";
pub const RULES_FILE: &str = "deinflect.dat";
pub const KANJI_FILE: &str = "kanjidic";
pub const WORDS_INDEX_FILE: &str = "edict2_index";
pub const NAMES_INDEX_FILE: &str = "enamdict_index";

/// Paths of the dictionaries, the rules and the generated indexes.
///
/// Each path may be overridden on its own after [`DataFiles::in_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    /// EDICT2 word dictionary, EUC-JP.
    pub words: PathBuf,
    /// ENAMDICT name dictionary, EUC-JP.
    pub names: PathBuf,
    /// Deinflection rules, UTF-8.
    pub rules: PathBuf,
    /// KANJIDIC, EUC-JP.
    pub kanji: PathBuf,
    pub words_index: PathBuf,
    pub names_index: PathBuf,
}

impl DataFiles {
    /// The usual file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            words: dir.join(WORDS_FILE),
            names: dir.join(NAMES_FILE),
            rules: dir.join(RULES_FILE),
            kanji: dir.join(KANJI_FILE),
            words_index: dir.join(WORDS_INDEX_FILE),
            names_index: dir.join(NAMES_INDEX_FILE),
        }
    }

    pub fn deinflector(&self) -> Result<Deinflector> {
        Deinflector::from_path(&self.rules)
    }

    pub fn kanji_dic(&self) -> Result<KanjiDic> {
        KanjiDic::open(&self.kanji)
    }

    pub fn words(&self) -> Result<Edict> {
        Edict::open(&self.words)
    }

    pub fn names(&self) -> Result<Edict> {
        Edict::open(&self.names)
    }

    /// The word dictionary looked up on disk; requires [`DataFiles::build_indexes`] first.
    pub fn indexed_words(&self) -> Result<IndexedEdict> {
        IndexedEdict::open(&self.words, &self.words_index)
    }

    pub fn indexed_names(&self) -> Result<IndexedEdict> {
        IndexedEdict::open(&self.names, &self.names_index)
    }

    /// Writes the indexes of both dictionaries.
    pub fn build_indexes(&self) -> Result<()> {
        index::build_index(&self.words, &self.words_index)?;
        index::build_index(&self.names, &self.names_index)?;
        Ok(())
    }
}

impl Default for DataFiles {
    fn default() -> Self {
        Self::in_dir(".")
    }
}
