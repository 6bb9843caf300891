#![doc = include_str!("../README.md")]

mod config;
mod deinflect;
mod edict;
mod error;
mod furigana;
mod index;
mod kanjidic;
mod segmentation;
mod subset;
mod utils;
pub mod word_class;

pub use self::config::{
    DataFiles, KANJI_FILE, NAMES_FILE, NAMES_INDEX_FILE, RULES_FILE, WORDS_FILE, WORDS_INDEX_FILE,
};
pub use self::deinflect::{Candidate, Deinflector, Match, Rule};
pub use self::edict::{DictionaryEntry, Edict, Lookup};
pub use self::error::{Error, Result};
pub use self::furigana::{align, furigana, Alignment, FuriganaUnit};
pub use self::index::{
    build_index, index_records, write_index, IndexRecord, IndexedEdict, SortedIndex,
};
pub use self::kanjidic::{compound_readings, normalize_readings, Kanji, KanjiDic};
pub use self::segmentation::{fragments, ScriptRuns, Substrings};
pub use self::subset::{
    duplicate_names, output_paths, write_lines, ExtractorConfig, JobReport, Subset,
    SubsetExtractor, SubsetJob, NAMES_DIR, WORDS_DIR,
};
pub use self::utils::kana_equivalent;

#[cfg(test)]
mod test {
    use super::*;

    const WORDS: &str = "\
物の怪 [もののけ] /(n) ghost/specter/(P)/EntL1541140X/
高い [たかい] /(adj-i) (1) high/tall/(2) expensive/(P)/EntL1279420X/
";

    #[test]
    fn annotates_looked_up_words() {
        let kanji_dic = KanjiDic::from_readings([
            ('物', vec!["ブツ", "もの"]),
            ('怪', vec!["カイ", "ケ"]),
            ('高', vec!["コウ", "たか.い"]),
        ]);
        let deinflector = Deinflector::parse(crate::deinflect::test::RULES).unwrap();
        let words = Edict::parse_str(WORDS);

        let matches = deinflector.lookup_deinflected("高かった", &words).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].candidate.reasons, vec!["past"]);
        assert_eq!(matches[0].entry.furigana(&kanji_dic), "高[たか]い");

        let ghost = words.get("もののけ").next().unwrap();
        assert_eq!(ghost.furigana(&kanji_dic), "物[もの]の 怪[け]");
        assert_eq!(ghost.meanings(), vec!["ghost; specter"]);
    }
}
