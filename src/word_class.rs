//! Grammatical class bits shared by deinflection rules and dictionary entries.
//!
//! For a word, the mask gives a hint of its expected grammatical class.
//! For a rule, the low byte gives the class required of the inflected word
//! and the high byte the class of the word obtained by removing the inflection.

/// 一段 verb (`v1`).
pub const ICHIDAN: u8 = 1 << 0;
/// 五段 verb (`v5…`).
pub const GODAN: u8 = 1 << 1;
/// い-adjective (`adj-i`).
pub const I_ADJECTIVE: u8 = 1 << 2;
/// くる verb (`vk`).
pub const KURU: u8 = 1 << 3;
/// する verb (`vs`, `vs-…`).
pub const SURU: u8 = 1 << 4;
/// Always set on dictionary words, so that any word matches [`ANY`].
pub const WORD: u8 = 1 << 7;
/// Mask of an unmodified word: compatible with every dictionary entry.
pub const ANY: u8 = 0xFF;

/// Computes the mask of an entry from the part-of-speech markers of its glosses.
pub fn from_markers<'a>(markers: impl IntoIterator<Item = &'a str>) -> u8 {
    let mut mask = WORD;
    for marker in markers {
        let marker = marker.trim();
        if marker == "v1" {
            mask |= ICHIDAN;
        } else if marker.starts_with("v5") {
            mask |= GODAN;
        } else if marker == "adj-i" {
            mask |= I_ADJECTIVE;
        } else if marker == "vk" {
            mask |= KURU;
        } else if marker == "vs" || marker.starts_with("vs-") {
            mask |= SURU;
        }
    }
    mask
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_markers() {
        assert_eq!(from_markers(Vec::<&str>::new()), WORD);
        assert_eq!(from_markers(["n", "vs"]), WORD | SURU);
        assert_eq!(from_markers(["v5r", "vt"]), WORD | GODAN);
        assert_eq!(from_markers(["adj-i"]), WORD | I_ADJECTIVE);
        assert_eq!(from_markers(["v1", "vk", "vs-i"]), WORD | ICHIDAN | KURU | SURU);
        // "adj-ix" is not an い-adjective marker
        assert_eq!(from_markers(["adj-ix", "v1-s"]), WORD);
    }
}
