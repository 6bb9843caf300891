//! Property tests over the public API.
//!
//! 1. The unmodified word is always the first candidate, with every class allowed.
//! 2. Words written in kana need no furigana.
//! 3. Kana comparisons ignore the script.
//! 4. The index finds every key it was written with, and nothing else.
//! 5. Fragments cover every substring of every run.
//! 6. Subsets are stable and grow with the text.

use edict::{
    fragments, furigana, kana_equivalent, word_class, Deinflector, Edict, ExtractorConfig,
    KanjiDic, ScriptRuns, SortedIndex, SubsetExtractor,
};
use proptest::prelude::*;
use std::{collections::BTreeMap, io::Cursor};

const RULES: &str = "\
Deinflect Rules
past
negative
た\tる\t384\t0
った\tう\t640\t0
かった\tい\t1152\t0
ない\tる\t384\t1
";

const WORDS: &str = "\
食べる [たべる] /(v1,vt) to eat/(P)/EntL1358280X/
高い [たかい] /(adj-i) high/expensive/(P)/EntL1279420X/
言う [いう] /(v5u) to say/(P)/EntL1587040X/
猫 [ねこ] /(n) cat/(P)/EntL1467640X/
日本 [にほん] /(n) Japan/(P)/EntL1582710X/
";

const NAMES: &str = "\
田中 [たなか] /(s) Tanaka/
";

fn japanese_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just("食べた"),
            Just("高かった"),
            Just("言った"),
            Just("猫"),
            Just("日本"),
            Just("田中"),
            Just("は"),
            Just("の"),
            Just("。"),
            Just("、"),
            Just(" "),
            Just("abc"),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

fn hiragana() -> impl Strategy<Value = String> {
    "[ぁ-ゖ]{0,12}"
}

fn to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| char::from_u32(c as u32 + 0x60).unwrap())
        .collect()
}

proptest! {
    #[test]
    fn keeps_original_word_first(word in "\\PC{0,10}") {
        let deinflector = Deinflector::parse(RULES).unwrap();
        let candidates = deinflector.deinflect(&word);
        prop_assert_eq!(&candidates[0].word, &word);
        prop_assert_eq!(candidates[0].type_mask, word_class::ANY);
        prop_assert!(candidates[0].reasons.is_empty());
        for candidate in &candidates[1..] {
            prop_assert!(!candidate.reasons.is_empty());
        }
    }

    #[test]
    fn leaves_kana_words_bare(word in hiragana()) {
        let kanji_dic = KanjiDic::default();
        prop_assert_eq!(furigana(&kanji_dic, &word, &word), word.clone());
        let katakana = to_katakana(&word);
        prop_assert_eq!(furigana(&kanji_dic, &katakana, &katakana), katakana);
    }

    #[test]
    fn compares_kana_across_scripts(word in hiragana()) {
        prop_assert!(kana_equivalent(&word, &to_katakana(&word)));
        prop_assert!(kana_equivalent(&to_katakana(&word), &word));
    }

    #[test]
    fn finds_every_indexed_key(
        records in proptest::collection::btree_map(
            "[a-zぁ-ん]{1,6}",
            proptest::collection::vec(0u64..1_000_000, 1..4),
            0..60,
        ),
        absent in "[a-zぁ-ん]{1,6}",
    ) {
        let data: String = records
            .iter()
            .map(|(key, offsets)| {
                let offsets: Vec<String> = offsets.iter().map(u64::to_string).collect();
                format!("{key} {}\n", offsets.join(" "))
            })
            .collect();
        let mut index = SortedIndex::new(Cursor::new(data.into_bytes())).unwrap();
        for (key, offsets) in &records {
            prop_assert_eq!(&index.search(key).unwrap(), offsets);
        }
        let expected = records.get(&absent).cloned().unwrap_or_default();
        prop_assert_eq!(index.search(&absent).unwrap(), expected);
    }

    #[test]
    fn fragments_cover_runs(text in japanese_text()) {
        let expected: usize = ScriptRuns::new(&text)
            .map(|run| run.chars().count())
            .map(|n| n * (n + 1) / 2)
            .sum();
        prop_assert_eq!(fragments(&text, None).count(), expected);
        for fragment in fragments(&text, Some(2)) {
            prop_assert!(text.contains(fragment));
            prop_assert!(fragment.chars().count() <= 2);
        }
    }

    #[test]
    fn subsets_are_stable_and_grow(a in japanese_text(), b in japanese_text()) {
        let deinflector = Deinflector::parse(RULES).unwrap();
        let words = Edict::parse_str(WORDS);
        let names = Edict::parse_str(NAMES);
        let extractor =
            SubsetExtractor::new(&deinflector, &words, &names, ExtractorConfig::default());

        let subset_a = extractor.extract(&a).unwrap();
        prop_assert_eq!(&subset_a, &extractor.extract(&a).unwrap());
        // the separator keeps the runs of both texts apart
        let joined = format!("{a}。{b}");
        let subset_joined = extractor.extract(&joined).unwrap();
        prop_assert!(subset_a.is_subset(&subset_joined));
        prop_assert!(extractor.extract(&b).unwrap().is_subset(&subset_joined));
    }
}

#[test]
fn index_from_dictionary_matches_records() {
    let words = Edict::parse_str(WORDS);
    let mut data = Vec::new();
    edict::write_index(&words, &mut data).unwrap();
    let records: BTreeMap<String, Vec<u64>> = edict::index_records(&words)
        .into_iter()
        .map(|record| (record.key, record.offsets))
        .collect();
    let mut index = SortedIndex::new(Cursor::new(data)).unwrap();
    for (key, offsets) in records {
        assert_eq!(index.search(&key).unwrap(), offsets);
    }
}
