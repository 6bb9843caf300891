use clap::Parser;
use edict::{DataFiles, Deinflector, ExtractorConfig, Lookup, SubsetExtractor, SubsetJob};
use eyre::WrapErr;
use std::{
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
};
use tracing::Level;

#[derive(Parser, Debug)]
#[clap(name = "edict", version, about = "Japanese dictionary tools")]
struct Cli {
    /// Directory holding edict2, enamdict, deinflect.dat and kanjidic.
    #[clap(long, env = "EDICT_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// More output, repeat for even more.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Writes the sorted indexes of both dictionaries.
    Index,

    /// Prints the dictionary lines relevant to a text.
    Subset {
        /// Text file, standard input if missing.
        input: Option<PathBuf>,
        /// Prints the name dictionary subset instead of the word one.
        #[clap(long)]
        names: bool,
        #[clap(flatten)]
        lookup: LookupArgs,
    },

    /// Creates the subsets of many texts in parallel.
    ///
    /// Each file is a job named after its file stem.
    Batch {
        /// Directory receiving subedict/ and subenamdict/.
        #[clap(short, long)]
        out: PathBuf,
        /// Also creates the subsets of all the files together under this name.
        #[clap(long)]
        aggregate: Option<String>,
        #[clap(required = true)]
        inputs: Vec<PathBuf>,
        #[clap(flatten)]
        lookup: LookupArgs,
    },

    /// Lists the possible dictionary forms of a word.
    Deinflect { word: String },

    /// Looks up a possibly inflected word.
    Lookup {
        word: String,
        #[clap(flatten)]
        lookup: LookupArgs,
    },

    /// Annotates a word with its reading.
    Furigana { word: String, reading: String },
}

#[derive(clap::Args, Debug)]
struct LookupArgs {
    /// Looks words up through the index files instead of loading the dictionaries.
    #[clap(long)]
    indexed: bool,

    /// Longest substring of the text looked up, in characters.
    #[clap(long)]
    max_substring_chars: Option<usize>,
}

impl LookupArgs {
    fn config(&self) -> ExtractorConfig {
        ExtractorConfig {
            max_substring_chars: self.max_substring_chars,
            ..ExtractorConfig::default()
        }
    }
}

/// The word and name dictionaries, loaded in memory or used from disk.
struct Dictionaries {
    words: Box<dyn Lookup + Sync>,
    names: Box<dyn Lookup + Sync>,
}

impl Dictionaries {
    fn load(files: &DataFiles, indexed: bool) -> eyre::Result<Self> {
        let dictionaries = if indexed {
            Self {
                words: Box::new(files.indexed_words().wrap_err("failed to open the word index")?),
                names: Box::new(files.indexed_names().wrap_err("failed to open the name index")?),
            }
        } else {
            Self {
                words: Box::new(files.words().wrap_err("failed to load the word dictionary")?),
                names: Box::new(files.names().wrap_err("failed to load the name dictionary")?),
            }
        };
        Ok(dictionaries)
    }

    fn extractor<'a>(
        &'a self,
        deinflector: &'a Deinflector,
        config: ExtractorConfig,
    ) -> SubsetExtractor<'a> {
        SubsetExtractor::new(deinflector, &*self.words, &*self.names, config)
    }
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let files = DataFiles::in_dir(&cli.data_dir);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match cli.command {
        Command::Index => {
            files.build_indexes().wrap_err("failed to build the indexes")?;
        }
        Command::Subset {
            input,
            names,
            lookup,
        } => {
            let text = read_input(input.as_deref())?;
            let deinflector = files.deinflector()?;
            let dictionaries = Dictionaries::load(&files, lookup.indexed)?;
            let extractor = dictionaries.extractor(&deinflector, lookup.config());
            let lines = if names {
                extractor.extract_names(&text)?
            } else {
                extractor.extract_words(&text)?
            };
            edict::write_lines(&lines, &mut out)?;
        }
        Command::Batch {
            out: out_dir,
            aggregate,
            inputs,
            lookup,
        } => {
            let mut jobs = Vec::with_capacity(inputs.len() + 1);
            for input in &inputs {
                let name = input
                    .file_stem()
                    .ok_or_else(|| eyre::eyre!("{} has no file name", input.display()))?
                    .to_string_lossy();
                jobs.push(SubsetJob::new(name, read_input(Some(input))?));
            }
            if let Some(name) = aggregate {
                let texts = jobs.iter().flat_map(|job| job.texts.clone()).collect::<Vec<_>>();
                jobs.push(SubsetJob::aggregate(name, texts));
            }
            let duplicates = edict::duplicate_names(&jobs);
            if !duplicates.is_empty() {
                let duplicates: Vec<&str> = duplicates.into_iter().collect();
                eyre::bail!(
                    "several inputs would be saved under the same name: {}",
                    duplicates.join(", ")
                );
            }

            let deinflector = files.deinflector()?;
            let dictionaries = Dictionaries::load(&files, lookup.indexed)?;
            let extractor = dictionaries.extractor(&deinflector, lookup.config());
            let reports = extractor.run_batch(&jobs, &out_dir);
            let failed = reports.iter().filter(|report| report.result.is_err()).count();
            for report in &reports {
                match &report.result {
                    Ok(subset) => writeln!(
                        out,
                        "{}\t{}\t{}",
                        report.name,
                        subset.words.len(),
                        subset.names.len()
                    )?,
                    Err(err) => writeln!(out, "{}\tfailed: {err}", report.name)?,
                }
            }
            if failed > 0 {
                out.flush()?;
                eyre::bail!("{failed} of {} jobs failed", reports.len());
            }
        }
        Command::Deinflect { word } => {
            let deinflector = files.deinflector()?;
            for candidate in deinflector.deinflect(&word) {
                writeln!(
                    out,
                    "{}\t{:#04x}\t{}",
                    candidate.word,
                    candidate.type_mask,
                    candidate.reasons.join(" < ")
                )?;
            }
        }
        Command::Lookup { word, lookup } => {
            let deinflector = files.deinflector()?;
            let dictionaries = Dictionaries::load(&files, lookup.indexed)?;
            for m in deinflector.lookup_deinflected(&word, &*dictionaries.words)? {
                writeln!(out, "{}\t{}", m.candidate.reasons.join(" < "), m.entry.line)?;
            }
            for entry in dictionaries.names.lookup(&word)? {
                writeln!(out, "name\t{}", entry.line)?;
            }
        }
        Command::Furigana { word, reading } => {
            let kanji_dic = files.kanji_dic()?;
            writeln!(out, "{}", edict::furigana(&kanji_dic, &word, &reading))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> eyre::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
