//! `edict::furigana` splits the reading of a word over its kanji, using the readings listed for each kanji.

fn main() {
    let kanji_dic = edict::KanjiDic::from_readings([
        ('物', vec!["ブツ", "モツ", "もの"]),
        ('怪', vec!["カイ", "ケ", "あや.しい"]),
        ('花', vec!["カ", "ケ", "はな"]),
        ('火', vec!["カ", "ひ", "-び", "ほ-"]),
    ]);
    for (word, reading) in [("物の怪", "もののけ"), ("花火", "はなび"), ("大人", "おとな")] {
        println!("{}", edict::furigana(&kanji_dic, word, reading));
    }
}
