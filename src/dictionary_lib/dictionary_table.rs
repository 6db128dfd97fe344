//! One lexicon file loaded into a lookup table.
//!
//! Keys are stored as `Box<[char]>` so the matcher can look up a borrowed
//! `&[char]` window of the input without allocating. Next to the map the table
//! keeps, per starting codepoint, a bitmask of the key lengths that exist
//! (see [`crate::utils::length_bit`]); the matcher walks that mask from the
//! longest length down, so the first hit is the longest one.

use std::collections::hash_map::Entry;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::warn;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{OpenccError, Result};
use crate::utils::length_bit;

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DictionaryTable {
    /// Source phrase → replacement.
    pub entries: FxHashMap<Box<[char]>, Box<str>>,

    /// Longest key, in codepoints.
    pub max_len: usize,

    /// Shortest key, in codepoints (`0` when empty).
    pub min_len: usize,

    /// Runtime only: starter codepoint → mask of key lengths.
    #[serde(skip)]
    starter_masks: FxHashMap<char, u64>,
}

impl DictionaryTable {
    /// Builds a table from `(source, target)` pairs.
    ///
    /// Duplicate sources keep the first target; a conflicting duplicate is
    /// logged at `warn` level. Empty sources are ignored.
    ///
    /// ```
    /// use opencc_engine::dictionary_lib::DictionaryTable;
    ///
    /// let table = DictionaryTable::build_from_pairs(vec![
    ///     ("银行".to_string(), "銀行".to_string()),
    ///     ("行".to_string(), "行".to_string()),
    /// ]);
    /// assert_eq!(table.max_len, 2);
    /// assert_eq!(table.get(&['银', '行']), Some("銀行"));
    /// ```
    pub fn build_from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let iter = pairs.into_iter();
        let mut entries: FxHashMap<Box<[char]>, Box<str>> = FxHashMap::default();
        entries.reserve(iter.size_hint().0);

        for (source, target) in iter {
            if source.is_empty() {
                continue;
            }
            let key: Box<[char]> = source.chars().collect();
            match entries.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(target.into_boxed_str());
                }
                Entry::Occupied(slot) => {
                    if slot.get().as_ref() != target {
                        warn!(
                            "duplicate key ignored (first wins): {:?} keeps {:?}, drops {:?}",
                            source,
                            slot.get(),
                            target
                        );
                    }
                }
            }
        }

        let mut table = Self {
            entries,
            ..Self::default()
        };
        table.rebuild_index();
        table
    }

    /// Parses lexicon text: one `source<TAB>target [alternatives...]` entry per
    /// line. The first target is used. Blank lines and lines starting with `#`
    /// are skipped; a source without a target is a parse error.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let mut pairs = Vec::new();
        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim_start_matches('\u{feff}').trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let source = fields.next().unwrap_or_default();
            let target = fields.next().ok_or_else(|| OpenccError::Parse {
                path: origin.to_path_buf(),
                line: index + 1,
                reason: format!("no target for {:?}", source),
            })?;
            pairs.push((source.to_string(), target.to_string()));
        }
        Ok(Self::build_from_pairs(pairs))
    }

    /// Reads and parses a lexicon file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Recomputes `max_len`, `min_len` and the starter masks from `entries`.
    ///
    /// Must be called after deserialization, which skips the masks.
    pub fn rebuild_index(&mut self) {
        self.starter_masks.clear();
        self.max_len = 0;
        self.min_len = 0;

        for key in self.entries.keys() {
            let len = key.len();
            *self.starter_masks.entry(key[0]).or_default() |= length_bit(len);
            self.max_len = self.max_len.max(len);
            self.min_len = if self.min_len == 0 {
                len
            } else {
                self.min_len.min(len)
            };
        }
    }

    #[inline]
    pub fn get(&self, key: &[char]) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_ref())
    }

    /// Mask of key lengths starting with `starter`; `0` when none.
    #[inline]
    pub fn len_mask(&self, starter: char) -> u64 {
        self.starter_masks.get(&starter).copied().unwrap_or(0)
    }

    pub(crate) fn starter_masks(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.starter_masks.iter().map(|(&c, &m)| (c, m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the table back into lexicon text, sorted by source for stable
    /// diffs.
    pub fn to_lexicon_text(&self) -> String {
        let mut rows: Vec<(String, &str)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.iter().collect(), v.as_ref()))
            .collect();
        rows.sort_unstable();

        let mut out = String::new();
        for (source, target) in rows {
            let _ = writeln!(out, "{}\t{}", source, target);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_takes_first_target_and_skips_comments() {
        let text = "# header\n\n于\t於 于\n银行\t銀行\n";
        let table = DictionaryTable::parse(text, Path::new("STPhrases.txt")).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&['于']), Some("於"));
        assert_eq!(table.min_len, 1);
        assert_eq!(table.max_len, 2);
    }

    #[test]
    fn parse_rejects_line_without_target() {
        let err = DictionaryTable::parse("甲\t乙\n丙\n", Path::new("x.txt")).unwrap_err();
        match err {
            OpenccError::Parse { path, line, .. } => {
                assert_eq!(path, PathBuf::from("x.txt"));
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_key_keeps_first() {
        let table = DictionaryTable::build_from_pairs(vec![
            ("后".to_string(), "後".to_string()),
            ("后".to_string(), "后".to_string()),
        ]);
        assert_eq!(table.get(&['后']), Some("後"));
    }

    #[test]
    fn starter_masks_record_each_length() {
        let table = DictionaryTable::build_from_pairs(vec![
            ("中".to_string(), "中".to_string()),
            ("中国银行".to_string(), "中國銀行".to_string()),
            ("𬴂".to_string(), "騑".to_string()),
        ]);
        assert_eq!(table.len_mask('中'), length_bit(1) | length_bit(4));
        assert_eq!(table.len_mask('𬴂'), length_bit(1));
        assert_eq!(table.len_mask('国'), 0);
    }

    #[test]
    fn index_is_rebuilt_after_cbor_round_trip() {
        let table = DictionaryTable::build_from_pairs(vec![("龙马".into(), "龍馬".into())]);
        let bytes = serde_cbor::to_vec(&table).unwrap();
        let mut decoded: DictionaryTable = serde_cbor::from_slice(&bytes).unwrap();
        assert_eq!(decoded.len_mask('龙'), 0);
        decoded.rebuild_index();
        assert_eq!(decoded.len_mask('龙'), length_bit(2));
        assert_eq!(decoded.get(&['龙', '马']), Some("龍馬"));
    }

    #[test]
    fn lexicon_text_is_sorted() {
        let table = DictionaryTable::build_from_pairs(vec![
            ("语".into(), "語".into()),
            ("测".into(), "測".into()),
        ]);
        let text = table.to_lexicon_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0] < lines[1]);
    }
}
