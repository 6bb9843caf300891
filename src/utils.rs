//! Various utility functions

use encoding_rs::Encoding;
use std::borrow::Cow;

/// Distance between a hiragana code point and its katakana counterpart.
const KANA_TABLE_DISTANCE: u32 = 0x60;

/// Ideographic iteration mark, repeats the previous kanji.
pub const ITERATION_MARK: char = '々';

pub fn is_hiragana(c: char) -> bool {
    (0x3040..=0x309F).contains(&(c as u32))
}

pub fn is_katakana(c: char) -> bool {
    (0x30A0..=0x30FF).contains(&(c as u32))
}

pub fn is_halfwidth_kana(c: char) -> bool {
    (0xFF66..=0xFF9F).contains(&(c as u32))
}

pub fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c)
}

pub fn is_kanji(c: char) -> bool {
    // CJK Unified Ideographs, Extension A, and Compatibility Ideographs
    (0x4E00..=0x9FFF).contains(&(c as u32))
        || (0x3400..=0x4DBF).contains(&(c as u32))
        || (0xF900..=0xFAFF).contains(&(c as u32))
}

/// Characters that may be part of a dictionary headword.
pub fn is_japanese(c: char) -> bool {
    c == ITERATION_MARK || is_kana(c) || is_kanji(c) || is_halfwidth_kana(c)
}

/// Maps a katakana character to hiragana, leaving everything else alone.
pub fn to_hiragana_char(c: char) -> char {
    // ヷ ヸ ヹ ヺ and the prolonged sound mark have no hiragana counterpart
    if ('ァ'..='ヶ').contains(&c) {
        char::from_u32(c as u32 - KANA_TABLE_DISTANCE).unwrap_or(c)
    } else {
        c
    }
}

// checks whether the characters are equivalent if ignoring the difference between hiragana and katakana
fn char_equivalent(left: char, right: char) -> bool {
    to_hiragana_char(left) == to_hiragana_char(right)
}

/// Checks whether the strings are equivalent if ignoring the difference between hiragana and katakana.
/// A prolonged sound mark on one side matches the vowel that extends the previous character on the other.
pub fn kana_equivalent(left: &str, right: &str) -> bool {
    let mut previous_left = None;
    let mut previous_right = None;
    let mut left_chars = left.chars();
    let mut right_chars = right.chars();
    loop {
        match (left_chars.next(), right_chars.next()) {
            (None, None) => return true,
            (Some(l), Some(r)) => {
                if l == 'ー' && r != 'ー' {
                    let Some(previous) = previous_right else {
                        return false;
                    };
                    if !is_extension(previous, r) {
                        return false;
                    }
                } else if r == 'ー' && l != 'ー' {
                    let Some(previous) = previous_left else {
                        return false;
                    };
                    if !is_extension(previous, l) {
                        return false;
                    }
                } else if !char_equivalent(l, r) {
                    return false;
                }
                previous_left = Some(l);
                previous_right = Some(r);
            }
            _ => return false,
        }
    }
}

// checks if the next char can be an "extension" of the previous char the same way ー is used for katakana.
fn is_extension(previous: char, next: char) -> bool {
    // the previous kana on the left, the vowel that lengthens it on the right
    matches!(
        (to_hiragana_char(previous), to_hiragana_char(next)),
        ('あ' | 'か' | 'さ' | 'た' | 'な' | 'は' | 'ま' | 'や' | 'ら' | 'わ', 'あ')
            | ('い' | 'き' | 'し' | 'ち' | 'に' | 'ひ' | 'み' | 'り', 'い')
            | ('う' | 'く' | 'す' | 'つ' | 'ぬ' | 'ふ' | 'む' | 'ゆ' | 'る', 'う')
            | ('え' | 'け' | 'せ' | 'て' | 'ね' | 'へ' | 'め' | 'れ', 'え' | 'い')
            | ('お' | 'こ' | 'そ' | 'と' | 'の' | 'ほ' | 'も' | 'よ' | 'ろ', 'お' | 'う')
    )
}

/// Returns the voiced (and half-voiced) counterparts of a hiragana character, as they appear with rendaku.
pub fn voiced(c: char) -> &'static [char] {
    match c {
        // ka
        'か' => &['が'],
        'き' => &['ぎ'],
        'く' => &['ぐ'],
        'け' => &['げ'],
        'こ' => &['ご'],
        // sa
        'さ' => &['ざ'],
        'し' => &['じ'],
        'す' => &['ず'],
        'せ' => &['ぜ'],
        'そ' => &['ぞ'],
        // ta
        'た' => &['だ'],
        'ち' => &['ぢ'],
        'つ' => &['づ'],
        'て' => &['で'],
        'と' => &['ど'],
        // ha
        'は' => &['ば', 'ぱ'],
        'ひ' => &['び', 'ぴ'],
        'ふ' => &['ぶ', 'ぷ'],
        'へ' => &['べ', 'ぺ'],
        'ほ' => &['ぼ', 'ぽ'],
        _ => &[],
    }
}

/// Decodes `bytes` with `encoding`, returning `None` on malformed input.
pub fn decode<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
}

/// Splits `data` into lines, yielding the byte offset of each line along with the line without its terminator.
pub fn lines_with_offsets(data: &[u8]) -> impl Iterator<Item = (u64, &[u8])> {
    let mut offset = 0;
    data.split_inclusive(|&b| b == b'\n').map(move |raw| {
        let start = offset;
        offset += raw.len() as u64;
        let line = raw.strip_suffix(b"\n").unwrap_or(raw);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        (start, line)
    })
}

/// Decodes each line of `data` on its own, skipping the lines that are not valid in `encoding`.
pub fn decoded_lines<'a>(
    data: &'a [u8],
    encoding: &'static Encoding,
) -> impl Iterator<Item = (u64, Cow<'a, str>)> {
    lines_with_offsets(data).filter_map(move |(offset, line)| match decode(line, encoding) {
        Some(line) => Some((offset, line)),
        None => {
            let encoding = encoding.name();
            tracing::debug!(offset, encoding, "skipping line with invalid encoding");
            None
        }
    })
}
