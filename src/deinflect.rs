//! Removes inflections from words by repeatedly replacing known suffixes.

use crate::{utils, word_class, DictionaryEntry, Error, Lookup, Result};
use encoding_rs::UTF_8;
use std::{
    borrow::Cow,
    collections::{HashMap, VecDeque},
    path::Path,
};

/// Id of the root node in the suffix trie.
const ROOT: usize = 0;

/// A suffix replacement, such as "かった" → "い" for the past form of い-adjectives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub from: String,
    pub to: String,
    /// Low byte: class required of the inflected word. High byte: class of the result.
    pub type_mask: u16,
    reason: usize,
}

impl Rule {
    pub fn source_mask(&self) -> u8 {
        (self.type_mask & 0xFF) as u8
    }

    pub fn target_mask(&self) -> u8 {
        (self.type_mask >> 8) as u8
    }
}

/// A possible dictionary form of a word.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate<'a> {
    pub word: String,
    /// Grammatical classes the candidate may belong to, see [`word_class`].
    pub type_mask: u8,
    /// The inflections removed to get from the original word to this one, outermost first.
    pub reasons: Vec<&'a str>,
}

/// A dictionary entry reached through a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'d, 'e> {
    pub candidate: Candidate<'d>,
    pub entry: Cow<'e, DictionaryEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Node {
    children: HashMap<char, usize>,
    /// Rules whose suffix ends at this node.
    rules: Vec<usize>,
}

/// Deinflection rules, organized as a trie over the reversed suffixes.
///
/// The rule file contains instructions to remove inflections from words:
/// * the first line is a header
/// * the next lines (without a tab) form an array of reasons referenced later
/// * the rest are four fields separated by tabs: the suffix to look for,
///   its replacement, the type mask as a decimal number, and the index of the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deinflector {
    nodes: Vec<Node>,
    rules: Vec<Rule>,
    reasons: Vec<String>,
}

impl Deinflector {
    /// Reads a UTF-8 rule file. Lines that are not valid UTF-8 are skipped.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        let mut lineno = 0;
        let lines = utils::lines_with_offsets(&data).filter_map(|(offset, line)| {
            lineno += 1;
            match utils::decode(line, UTF_8) {
                Some(line) => Some((lineno, line)),
                None => {
                    tracing::debug!(lineno, offset, "skipping line with invalid encoding");
                    None
                }
            }
        });
        let lines: Vec<(usize, Cow<'_, str>)> = lines.collect();
        Self::from_lines(lines.iter().map(|(lineno, line)| (*lineno, line.as_ref())))
    }

    pub fn parse(data: &str) -> Result<Self> {
        Self::from_lines(data.lines().enumerate().map(|(idx, line)| (idx + 1, line)))
    }

    // takes the lines along with their 1-based line numbers
    fn from_lines<'a>(lines: impl IntoIterator<Item = (usize, &'a str)>) -> Result<Self> {
        // reasons may be referenced before all of them have been read,
        // so collect everything first and resolve the references afterwards
        let mut reasons = Vec::new();
        let mut pending = Vec::new();
        for (lineno, line) in lines {
            // header
            if lineno == 1 {
                continue;
            }
            let line = line.trim();
            let fields: Vec<&str> = line.split('\t').collect();
            match fields[..] {
                [reason] => reasons.push(reason.to_string()),
                [from, to, type_mask, reason] => {
                    let (Ok(type_mask), Ok(reason)) = (type_mask.parse(), reason.parse()) else {
                        tracing::debug!(lineno, line, "skipping rule with malformed numbers");
                        continue;
                    };
                    if from.is_empty() {
                        tracing::debug!(lineno, line, "skipping rule with empty suffix");
                        continue;
                    }
                    let rule = Rule {
                        from: from.to_string(),
                        to: to.to_string(),
                        type_mask,
                        reason,
                    };
                    pending.push((lineno, rule));
                }
                _ => tracing::debug!(lineno, line, "skipping malformed line"),
            }
        }

        let mut deinflector = Deinflector {
            nodes: vec![Node::default()],
            rules: Vec::with_capacity(pending.len()),
            reasons,
        };
        for (lineno, rule) in pending {
            if rule.reason >= deinflector.reasons.len() {
                return Err(Error::UnresolvedReason {
                    lineno,
                    index: rule.reason,
                    count: deinflector.reasons.len(),
                });
            }
            deinflector.insert(rule);
        }
        tracing::debug!(
            rules = deinflector.rules.len(),
            reasons = deinflector.reasons.len(),
            "loaded deinflection rules"
        );
        Ok(deinflector)
    }

    fn insert(&mut self, rule: Rule) {
        let mut node = ROOT;
        for c in rule.from.chars().rev() {
            node = match self.nodes[node].children.get(&c) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(c, child);
                    child
                }
            };
        }
        self.nodes[node].rules.push(self.rules.len());
        self.rules.push(rule);
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// The reason attached to the rule.
    pub fn reason(&self, rule: &Rule) -> &str {
        &self.reasons[rule.reason]
    }

    /// Returns every candidate dictionary form of `word`, starting with `word` itself.
    ///
    /// The same form may appear several times, with different masks or reasons.
    pub fn deinflect(&self, word: &str) -> Vec<Candidate<'_>> {
        let mut candidates = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(Candidate {
            word: word.to_string(),
            type_mask: word_class::ANY,
            reasons: Vec::new(),
        });

        while let Some(candidate) = queue.pop_front() {
            let mut node = ROOT;
            for c in candidate.word.chars().rev() {
                let Some(&child) = self.nodes[node].children.get(&c) else {
                    break;
                };
                node = child;
                for &rule in &self.nodes[node].rules {
                    let rule = &self.rules[rule];
                    if candidate.type_mask & rule.source_mask() == 0 {
                        continue;
                    }
                    // the suffix matched the last characters of the word, so this is a char boundary
                    let prefix = &candidate.word[..candidate.word.len() - rule.from.len()];
                    let mut word = String::with_capacity(prefix.len() + rule.to.len());
                    word.push_str(prefix);
                    word.push_str(&rule.to);
                    let mut reasons = candidate.reasons.clone();
                    reasons.push(self.reason(rule));
                    queue.push_back(Candidate {
                        word,
                        type_mask: rule.target_mask(),
                        reasons,
                    });
                }
            }
            candidates.push(candidate);
        }
        candidates
    }

    /// Looks up every candidate of `word`, keeping the entries whose class is compatible with the candidate.
    pub fn lookup_deinflected<'d, 'e, L>(
        &'d self,
        word: &str,
        dictionary: &'e L,
    ) -> Result<Vec<Match<'d, 'e>>>
    where
        L: Lookup + ?Sized,
    {
        let mut matches = Vec::new();
        for candidate in self.deinflect(word) {
            for entry in dictionary.lookup(&candidate.word)? {
                if entry.type_mask & candidate.type_mask != 0 {
                    matches.push(Match {
                        candidate: candidate.clone(),
                        entry,
                    });
                }
            }
        }
        Ok(matches)
    }
}
