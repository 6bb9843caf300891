//! Reduces dictionaries to the entries that may appear in a text.
//!
//! The subsets are meant to be shipped along with the text, so that words can
//! be looked up offline. They are always computed again from the whole text
//! rather than updated, so that they never depend on an earlier version of
//! the dictionaries.

use crate::{segmentation, Deinflector, Error, Lookup, Result};
use rayon::prelude::*;
use std::{
    collections::{BTreeSet, HashSet},
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Directory of the word dictionary subsets in batch output.
pub const WORDS_DIR: &str = "subedict";
/// Directory of the name dictionary subsets in batch output.
pub const NAMES_DIR: &str = "subenamdict";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Longest substring looked up, in characters. `None` looks up every substring.
    pub max_substring_chars: Option<usize>,
    /// Runs of Japanese characters longer than this are reported, since
    /// the number of substrings grows with the square of their length.
    pub warn_run_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_substring_chars: None,
            warn_run_chars: 256,
        }
    }
}

/// The dictionary lines relevant to a text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subset {
    pub words: BTreeSet<String>,
    pub names: BTreeSet<String>,
}

impl Subset {
    /// Writes the word and name subsets to their own files.
    pub fn save(&self, words: impl AsRef<Path>, names: impl AsRef<Path>) -> Result<()> {
        save_lines(&self.words, words)?;
        save_lines(&self.names, names)?;
        Ok(())
    }

    pub fn is_subset(&self, other: &Subset) -> bool {
        self.words.is_subset(&other.words) && self.names.is_subset(&other.names)
    }
}

/// Writes sorted lines, each followed by a newline.
pub fn write_lines<'a, W: Write>(
    lines: impl IntoIterator<Item = &'a String>,
    writer: W,
) -> std::io::Result<()> {
    let mut writer = BufWriter::with_capacity(8192, writer);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

fn save_lines(lines: &BTreeSet<String>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_lines(lines, File::create(path)?)?;
    tracing::debug!(path = %path.display(), lines = lines.len(), "saved subset");
    Ok(())
}

/// A text to extract subsets for, such as a single story or all the stories of a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetJob {
    /// Base name of the output files, without extension.
    pub name: String,
    /// The texts are concatenated as is.
    pub texts: Vec<String>,
}

impl SubsetJob {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texts: vec![text.into()],
        }
    }

    pub fn aggregate(name: impl Into<String>, texts: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            texts: texts.into_iter().collect(),
        }
    }
}

/// Names shared by more than one job, whose outputs would overwrite each other.
pub fn duplicate_names(jobs: &[SubsetJob]) -> BTreeSet<&str> {
    let mut seen = HashSet::new();
    jobs.iter()
        .map(|job| job.name.as_str())
        .filter(|name| !seen.insert(*name))
        .collect()
}

/// Outcome of a job run by [`SubsetExtractor::run_batch`].
#[derive(Debug)]
pub struct JobReport {
    pub name: String,
    pub result: Result<Subset>,
}

pub struct SubsetExtractor<'a> {
    deinflector: &'a Deinflector,
    words: &'a (dyn Lookup + Sync),
    names: &'a (dyn Lookup + Sync),
    config: ExtractorConfig,
}

impl<'a> SubsetExtractor<'a> {
    pub fn new(
        deinflector: &'a Deinflector,
        words: &'a (dyn Lookup + Sync),
        names: &'a (dyn Lookup + Sync),
        config: ExtractorConfig,
    ) -> Self {
        Self {
            deinflector,
            words,
            names,
            config,
        }
    }

    // every distinct substring of every Japanese run of the text
    fn fragments<'t>(&self, text: &'t str) -> HashSet<&'t str> {
        let mut fragments = HashSet::new();
        for run in segmentation::ScriptRuns::new(text) {
            let chars = run.chars().count();
            if chars > self.config.warn_run_chars {
                tracing::warn!(
                    chars,
                    max_substring_chars = ?self.config.max_substring_chars,
                    "long run of Japanese text"
                );
            }
            fragments.extend(segmentation::Substrings::new(
                run,
                self.config.max_substring_chars,
            ));
        }
        fragments
    }

    /// Lines of the word dictionary that may be referenced in `text`, inflected or not.
    pub fn extract_words(&self, text: &str) -> Result<BTreeSet<String>> {
        let mut candidates = HashSet::new();
        for fragment in self.fragments(text) {
            for candidate in self.deinflector.deinflect(fragment) {
                candidates.insert((candidate.word, candidate.type_mask));
            }
        }

        let mut lines = BTreeSet::new();
        for (word, type_mask) in candidates {
            for entry in self.words.lookup(&word)? {
                if entry.type_mask & type_mask != 0 {
                    lines.insert(entry.into_owned().line);
                }
            }
        }
        Ok(lines)
    }

    /// Lines of the name dictionary found in `text`; names are not inflected.
    pub fn extract_names(&self, text: &str) -> Result<BTreeSet<String>> {
        let mut lines = BTreeSet::new();
        for fragment in self.fragments(text) {
            for entry in self.names.lookup(fragment)? {
                lines.insert(entry.into_owned().line);
            }
        }
        Ok(lines)
    }

    pub fn extract(&self, text: &str) -> Result<Subset> {
        Ok(Subset {
            words: self.extract_words(text)?,
            names: self.extract_names(text)?,
        })
    }

    /// Extracts and saves the subsets of a job into `out_dir`.
    pub fn run(&self, job: &SubsetJob, out_dir: &Path) -> Result<Subset> {
        let text = job.texts.concat();
        let subset = self.extract(&text)?;
        let (words, names) = output_paths(out_dir, &job.name);
        subset.save(words, names)?;
        tracing::info!(
            job = %job.name,
            words = subset.words.len(),
            names = subset.names.len(),
            "created subsets"
        );
        Ok(subset)
    }

    /// Runs independent jobs in parallel. A failing job does not stop the others.
    ///
    /// Jobs sharing a name are not run at all and are reported as failed.
    pub fn run_batch(&self, jobs: &[SubsetJob], out_dir: &Path) -> Vec<JobReport> {
        let duplicates = duplicate_names(jobs);
        jobs.par_iter()
            .map(|job| {
                let result = if duplicates.contains(job.name.as_str()) {
                    Err(Error::DuplicateJob {
                        name: job.name.clone(),
                    })
                } else {
                    self.run(job, out_dir)
                };
                if let Err(err) = &result {
                    tracing::error!(job = %job.name, %err, "failed to create subsets");
                }
                JobReport {
                    name: job.name.clone(),
                    result,
                }
            })
            .collect()
    }
}

/// Output paths of a job's word and name subsets.
pub fn output_paths(out_dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    let file_name = format!("{name}.dat");
    (
        out_dir.join(WORDS_DIR).join(&file_name),
        out_dir.join(NAMES_DIR).join(&file_name),
    )
}
