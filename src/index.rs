//! Sorted index files, to look words up without loading the whole dictionary.
//!
//! The index has one line per key, holding the key and the byte offsets of the
//! dictionary lines containing it, separated by spaces; for example:
//! ```text
//! たべる 1021 53318
//! 食べる 1021
//! ```
//! Lines are sorted by key, so that a key can be found with a binary search
//! directly over the bytes of the file.

use crate::{utils, DictionaryEntry, Edict, Lookup, Result};
use encoding_rs::{Encoding, EUC_JP};
use std::{
    borrow::Cow,
    collections::BTreeMap,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Seek, SeekFrom, Write},
    path::Path,
    sync::{Mutex, PoisonError},
};

/// A key of the index along with the offsets of the entries containing it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexRecord {
    pub key: String,
    /// Always sorted, never empty.
    pub offsets: Vec<u64>,
}

impl IndexRecord {
    fn parse(line: &[u8]) -> Option<Self> {
        let line = std::str::from_utf8(line).ok()?;
        let mut fields = line.split(' ');
        let key = fields.next()?.to_string();
        let offsets = fields
            .filter(|offset| !offset.is_empty())
            .map(|offset| offset.parse().ok())
            .collect::<Option<Vec<u64>>>()?;
        if offsets.is_empty() {
            return None;
        }
        Some(IndexRecord { key, offsets })
    }
}

/// Lists the records of the index for `edict`, sorted by key.
pub fn index_records(edict: &Edict) -> Vec<IndexRecord> {
    let mut records = BTreeMap::new();
    for (key, entries) in edict.keys() {
        let mut offsets: Vec<u64> = entries.map(|entry| entry.offset).collect();
        offsets.sort_unstable();
        offsets.dedup();
        records.insert(key, offsets);
    }
    records
        .into_iter()
        .map(|(key, offsets)| IndexRecord {
            key: key.to_string(),
            offsets,
        })
        .collect()
}

/// Writes the index of `edict`.
pub fn write_index<W: Write>(edict: &Edict, writer: W) -> io::Result<()> {
    let mut writer = BufWriter::new(writer);
    for record in index_records(edict) {
        writer.write_all(record.key.as_bytes())?;
        for offset in &record.offsets {
            write!(writer, " {offset}")?;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Creates the index file of an EUC-JP dictionary.
pub fn build_index(dictionary: impl AsRef<Path>, index: impl AsRef<Path>) -> Result<()> {
    let edict = Edict::open(dictionary)?;
    let index = index.as_ref();
    write_index(&edict, File::create(index)?)?;
    tracing::info!(path = %index.display(), "wrote index");
    Ok(())
}

/// Binary search over the lines of a sorted index.
#[derive(Debug)]
pub struct SortedIndex<R> {
    reader: R,
    len: u64,
}

impl<R: BufRead + Seek> SortedIndex<R> {
    pub fn new(mut reader: R) -> io::Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        Ok(SortedIndex { reader, len })
    }

    /// Returns the offsets recorded for `key`, or an empty list if the key is absent.
    pub fn search(&mut self, key: &str) -> io::Result<Vec<u64>> {
        let key = key.as_bytes();
        // every line starting within [low, high) may still hold the key;
        // low is always the start of a line, high the start of a line or the end of the file
        let mut low = 0;
        let mut high = self.len;
        let mut line = Vec::new();
        while low < high {
            let middle = low + (high - low) / 2;
            let start = self.next_line_start(middle)?;
            if start >= high {
                // no line starts in [middle, high)
                high = middle;
                continue;
            }
            line.clear();
            let read = self.reader.read_until(b'\n', &mut line)? as u64;
            let end = start + read;
            let content = line.strip_suffix(b"\n").unwrap_or(&line[..]);
            let current = content.split(|&b| b == b' ').next().unwrap_or_default();
            match current.cmp(key) {
                std::cmp::Ordering::Equal => {
                    return Ok(IndexRecord::parse(content)
                        .map(|record| record.offsets)
                        .unwrap_or_default())
                }
                std::cmp::Ordering::Less => low = end,
                std::cmp::Ordering::Greater => high = start,
            }
        }
        Ok(Vec::new())
    }

    // positions the reader at the first line starting at or after `position` and returns that offset
    fn next_line_start(&mut self, position: u64) -> io::Result<u64> {
        if position == 0 {
            self.reader.seek(SeekFrom::Start(0))?;
            return Ok(0);
        }
        // a line starts at `position` if the previous byte ends a line
        self.reader.seek(SeekFrom::Start(position - 1))?;
        let mut skipped = Vec::new();
        let read = self.reader.read_until(b'\n', &mut skipped)? as u64;
        Ok(position - 1 + read)
    }
}

/// A dictionary that stays on disk, looked up through its index.
///
/// Every lookup seeks in both files, which is fine for batch jobs
/// but too slow for interactive use; prefer [`Edict`] there.
#[derive(Debug)]
pub struct IndexedEdict {
    index: Mutex<SortedIndex<BufReader<File>>>,
    dictionary: Mutex<BufReader<File>>,
    encoding: &'static Encoding,
}

impl IndexedEdict {
    /// Opens an EUC-JP dictionary along with its index.
    pub fn open(dictionary: impl AsRef<Path>, index: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_encoding(dictionary, index, EUC_JP)
    }

    pub fn open_with_encoding(
        dictionary: impl AsRef<Path>,
        index: impl AsRef<Path>,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let index = SortedIndex::new(BufReader::new(File::open(index)?))?;
        let dictionary = BufReader::new(File::open(dictionary)?);
        Ok(IndexedEdict {
            index: Mutex::new(index),
            dictionary: Mutex::new(dictionary),
            encoding,
        })
    }

    /// Offsets of the entries containing `word`.
    pub fn offsets(&self, word: &str) -> Result<Vec<u64>> {
        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(index.search(word)?)
    }

    /// Reads the entry at `offset`, returning `None` if the line is not an entry.
    pub fn entry_at(&self, offset: u64) -> Result<Option<DictionaryEntry>> {
        let mut dictionary = self.dictionary.lock().unwrap_or_else(PoisonError::into_inner);
        dictionary.seek(SeekFrom::Start(offset))?;
        let mut line = Vec::new();
        dictionary.read_until(b'\n', &mut line)?;
        let line = line.strip_suffix(b"\n").unwrap_or(&line[..]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let Some(line) = utils::decode(line, self.encoding) else {
            tracing::debug!(offset, "skipping line with invalid encoding");
            return Ok(None);
        };
        Ok(DictionaryEntry::parse(&line, offset))
    }
}

impl Lookup for IndexedEdict {
    fn lookup(&self, word: &str) -> Result<Vec<Cow<'_, DictionaryEntry>>> {
        let mut entries = Vec::new();
        for offset in self.offsets(word)? {
            if let Some(entry) = self.entry_at(offset)? {
                entries.push(Cow::Owned(entry));
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::edict::test::EDICT;
    use std::io::Cursor;

    fn index(data: &str) -> SortedIndex<Cursor<Vec<u8>>> {
        SortedIndex::new(Cursor::new(data.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn finds_keys() {
        let mut index = index("a 10\nb 20 45\nc 5\n");
        assert_eq!(index.search("a").unwrap(), vec![10]);
        assert_eq!(index.search("b").unwrap(), vec![20, 45]);
        assert_eq!(index.search("c").unwrap(), vec![5]);
    }

    #[test]
    fn misses_absent_keys() {
        let mut index = index("a 10\nb 20 45\nc 5\n");
        assert!(index.search("z").unwrap().is_empty());
        assert!(index.search("0").unwrap().is_empty());
        assert!(index.search("bb").unwrap().is_empty());
        assert!(index.search("").unwrap().is_empty());
    }

    #[test]
    fn handles_degenerate_files() {
        assert!(index("").search("a").unwrap().is_empty());
        assert_eq!(index("a 1").search("a").unwrap(), vec![1]);
        assert_eq!(index("a 1\nb 2").search("b").unwrap(), vec![2]);
    }

    #[test]
    fn finds_every_key_of_a_large_index() {
        let keys: Vec<String> = (0..500).map(|i| format!("key{i:04}")).collect();
        let data: String = keys
            .iter()
            .enumerate()
            .map(|(i, key)| format!("{key} {i} {}\n", i * 7))
            .collect();
        let mut index = index(&data);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(index.search(key).unwrap(), vec![i as u64, i as u64 * 7]);
        }
        assert!(index.search("key").unwrap().is_empty());
        assert!(index.search("key9999").unwrap().is_empty());
    }

    #[test]
    fn writes_sorted_index() {
        let edict = Edict::parse_str(EDICT);
        let mut out = Vec::new();
        write_index(&edict, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let keys: Vec<&str> = out
            .lines()
            .map(|line| line.split(' ').next().unwrap())
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(out.contains("にっぽん "));
        let mut index = index(&out);
        for entry in edict.entries() {
            for key in entry.keys() {
                assert!(index.search(key).unwrap().contains(&entry.offset));
            }
        }
    }

    #[test]
    fn looks_up_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = dir.path().join("edict2");
        let index = dir.path().join("edict2_index");
        std::fs::write(&dictionary, EUC_JP.encode(EDICT).0).unwrap();
        build_index(&dictionary, &index).unwrap();

        let indexed = IndexedEdict::open(&dictionary, &index).unwrap();
        let in_memory = Edict::open(&dictionary).unwrap();
        for word in ["日本", "にほん", "食べる", "あやかし", "勉強"] {
            assert_eq!(
                indexed.lookup(word).unwrap(),
                in_memory.lookup(word).unwrap()
            );
        }
        assert!(indexed.lookup("猫").unwrap().is_empty());
    }

    #[test]
    fn skips_undecodable_entry_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = dir.path().join("edict2");
        let index = dir.path().join("edict2_index");
        let mut data = EUC_JP.encode("日本 [にほん] /(n) Japan/\n").0.into_owned();
        let broken = data.len() as u64;
        data.extend_from_slice(b"\xFF\xFF /(n) broken/\n");
        let eat = data.len() as u64;
        data.extend_from_slice(&EUC_JP.encode("食べる [たべる] /(v1) to eat/\n").0);
        std::fs::write(&dictionary, data).unwrap();
        build_index(&dictionary, &index).unwrap();

        let indexed = IndexedEdict::open(&dictionary, &index).unwrap();
        assert!(indexed.entry_at(broken).unwrap().is_none());
        let entry = indexed.entry_at(eat).unwrap().unwrap();
        assert_eq!(entry.offset, eat);
        assert_eq!(entry.primary_writing(), "食べる");
        assert_eq!(indexed.lookup("たべる").unwrap().len(), 1);
    }
}
