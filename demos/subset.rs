//! Extracts the dictionary lines relevant to a short text.

use edict::{Deinflector, Edict, ExtractorConfig, SubsetExtractor};

const RULES: &str = "\
Deinflect Rules
past
た\tる\t384\t0
かった\tい\t1152\t0
";

const WORDS: &str = "\
食べる [たべる] /(v1,vt) to eat/(P)/EntL1358280X/
高い [たかい] /(adj-i) high/expensive/(P)/EntL1279420X/
猫 [ねこ] /(n) cat/(P)/EntL1467640X/
";

const NAMES: &str = "田中 [たなか] /(s) Tanaka/\n";

fn main() -> edict::Result<()> {
    let deinflector = Deinflector::parse(RULES)?;
    let words = Edict::parse_str(WORDS);
    let names = Edict::parse_str(NAMES);
    let extractor =
        SubsetExtractor::new(&deinflector, &words, &names, ExtractorConfig::default());

    let subset = extractor.extract("田中さんの猫は高かった魚を食べた。")?;
    for line in subset.words.iter().chain(&subset.names) {
        println!("{line}");
    }
    Ok(())
}
