//! Maps the reading of a word onto its characters.

use crate::{utils, KanjiDic};
use std::{collections::VecDeque, fmt::Display};

/// A character of the original word along with its part of the reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FuriganaUnit<'a> {
    /// A segment of the original word, a single character unless the alignment failed.
    pub segment: &'a str,
    /// The corresponding segment of the reading.
    pub reading: &'a str,
}

impl FuriganaUnit<'_> {
    /// Whether the segment is spelled exactly as its reading, and needs no furigana.
    ///
    /// Kana read in the other script, such as `カ` read `か`, keep their annotation.
    pub fn is_bare(&self) -> bool {
        self.segment == self.reading
    }
}

/// A mapping of a reading to a word.
///
/// Displays in the bracket notation used by Anki, for instance `物[もの]の 怪[け]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alignment<'a> {
    pub units: Vec<FuriganaUnit<'a>>,
}

impl<'a> Alignment<'a> {
    /// The whole word with the whole reading, used when no better alignment exists.
    pub fn whole(word: &'a str, reading: &'a str) -> Self {
        Alignment {
            units: vec![FuriganaUnit {
                segment: word,
                reading,
            }],
        }
    }
}

impl Display for Alignment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut last_was_bare = false;
        for unit in &self.units {
            if unit.is_bare() {
                write!(f, "{}", unit.segment)?;
                last_was_bare = true;
            } else {
                // the space stops the furigana from extending over the preceding kana
                if last_was_bare {
                    write!(f, " ")?;
                }
                write!(f, "{}[{}]", unit.segment, unit.reading)?;
                last_was_bare = false;
            }
        }
        Ok(())
    }
}

/// Searches for a way to assign each character of `word` a part of `reading`,
/// using the known readings of each kanji.
/// Falls back to the whole reading over the whole word when none is found.
///
/// The iteration mark 々 takes the reading of the previous character as is;
/// voiced variants such as 人々 (ひとびと) are not recognized.
pub fn align<'a>(kanji_dic: &KanjiDic, word: &'a str, reading: &'a str) -> Alignment<'a> {
    let mut queue = VecDeque::new();
    queue.push_back((Vec::new(), word, reading));
    while let Some((units, word_rest, reading_rest)) = queue.pop_front() {
        let Some(c) = word_rest.chars().next() else {
            if reading_rest.is_empty() {
                return Alignment { units };
            }
            continue;
        };
        if reading_rest.is_empty() {
            continue;
        }
        let segment = &word_rest[..c.len_utf8()];
        let word_rest = &word_rest[c.len_utf8()..];

        let previous: Option<&FuriganaUnit> = units.last();
        let candidates: Vec<&str> = match (c, previous) {
            (utils::ITERATION_MARK, Some(previous)) => vec![previous.reading],
            _ => match kanji_dic.readings(c) {
                Some(readings) => readings.iter().map(String::as_str).collect(),
                None => vec![segment],
            },
        };

        for candidate in candidates {
            let Some(matched) = matching_prefix(reading_rest, candidate) else {
                continue;
            };
            let mut units = units.clone();
            units.push(FuriganaUnit {
                segment,
                reading: matched,
            });
            queue.push_back((units, word_rest, &reading_rest[matched.len()..]));
        }
    }
    tracing::trace!(word, reading, "no alignment found");
    Alignment::whole(word, reading)
}

/// Annotates `word` with `reading` in bracket notation, see [`align`].
pub fn furigana(kanji_dic: &KanjiDic, word: &str, reading: &str) -> String {
    align(kanji_dic, word, reading).to_string()
}

// returns the start of `reading` that spells `candidate`, regardless of the kana script
fn matching_prefix<'a>(reading: &'a str, candidate: &str) -> Option<&'a str> {
    let chars = candidate.chars().count();
    if chars == 0 {
        return None;
    }
    let len = reading
        .char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(reading.len());
    let prefix = &reading[..len];
    let matches = prefix.chars().count() == chars && utils::kana_equivalent(prefix, candidate);
    matches.then_some(prefix)
}

#[cfg(test)]
mod test {
    use super::*;

    fn kanji_dic() -> KanjiDic {
        KanjiDic::from_readings([
            ('牛', vec!["ギュウ", "うし"]),
            ('肉', vec!["ニク", "しし"]),
            ('物', vec!["ブツ", "モツ", "もの"]),
            ('怪', vec!["カイ", "ケ", "あや.しい"]),
            ('日', vec!["ニチ", "ジツ", "ひ", "-び", "-か"]),
            ('花', vec!["カ", "ケ", "はな"]),
            ('火', vec!["カ", "ひ", "-び", "ほ-"]),
            ('格', vec!["カク", "コウ", "キャク", "ゴウ"]),
            ('好', vec!["コウ", "この.む", "す.く"]),
            ('離', vec!["リ", "はな.れる", "はな.す"]),
            ('時', vec!["ジ", "とき", "-どき"]),
        ])
    }

    #[test]
    fn aligns_compound() {
        assert_eq!(
            furigana(&kanji_dic(), "牛肉", "ぎゅうにく"),
            "牛[ぎゅう]肉[にく]"
        );
    }

    #[test]
    fn leaves_kana_bare() {
        let kanji_dic = kanji_dic();
        assert_eq!(furigana(&kanji_dic, "もののけ", "もののけ"), "もののけ");
        assert_eq!(furigana(&kanji_dic, "プレイヤー", "プレイヤー"), "プレイヤー");
        assert_eq!(furigana(&kanji_dic, "", ""), "");
    }

    #[test]
    fn separates_kana_from_following_kanji() {
        assert_eq!(
            furigana(&kanji_dic(), "物の怪", "もののけ"),
            "物[もの]の 怪[け]"
        );
        assert_eq!(
            furigana(&kanji_dic(), "離れる", "はなれる"),
            "離[はな]れる"
        );
    }

    #[test]
    fn handles_rendaku() {
        assert_eq!(furigana(&kanji_dic(), "花火", "はなび"), "花[はな]火[び]");
    }

    #[test]
    fn handles_gemination() {
        assert_eq!(
            furigana(&kanji_dic(), "格好", "かっこう"),
            "格[かっ]好[こう]"
        );
    }

    #[test]
    fn handles_iteration_mark() {
        let kanji_dic = kanji_dic();
        assert_eq!(furigana(&kanji_dic, "時々", "ときとき"), "時[とき]々[とき]");
        // voiced repetitions are not recognized
        assert_eq!(furigana(&kanji_dic, "時々", "ときどき"), "時々[ときどき]");
    }

    #[test]
    fn ignores_kana_script() {
        assert_eq!(
            furigana(&kanji_dic(), "牛肉", "ギュウニク"),
            "牛[ギュウ]肉[ニク]"
        );
    }

    #[test]
    fn annotates_kana_read_in_other_script() {
        let kanji_dic = KanjiDic::default();
        assert_eq!(furigana(&kanji_dic, "カ", "か"), "カ[か]");
        assert_eq!(furigana(&kanji_dic, "ばカ", "ばか"), "ば カ[か]");
        assert_eq!(furigana(&kanji_dic, "カ", "カ"), "カ");
    }

    #[test]
    fn falls_back_to_whole_word() {
        let kanji_dic = kanji_dic();
        assert_eq!(furigana(&kanji_dic, "大人", "おとな"), "大人[おとな]");
        assert_eq!(furigana(&kanji_dic, "牛肉", "ぎゅう"), "牛肉[ぎゅう]");
        let alignment = align(&kanji_dic, "大人", "おとな");
        assert_eq!(alignment, Alignment::whole("大人", "おとな"));
    }
}
