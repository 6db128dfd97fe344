//! Forward maximum matching over a chain of lexicon tables.
//!
//! At every position the matcher asks the chain's merged starter index which
//! key lengths exist, tries them longest first, and for each length queries
//! the tables in chain order. The first hit wins. When nothing matches, one
//! codepoint is copied through.

use std::ops::Range;

use log::debug;
use rayon::prelude::*;

use crate::delimiter_set::DELIMITERS;
use crate::dictionary_lib::{DictionaryTable, StarterUnion};
use crate::error::Result;
use crate::utils::for_each_len_dec;

/// Segments per rayon task; keeps tiny segments from becoming tiny jobs.
const MIN_SEGMENTS_PER_TASK: usize = 64;

/// Matcher over one ordered chain of tables.
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    tables: Vec<&'a DictionaryTable>,
    union: &'a StarterUnion,
    max_len: usize,
}

impl<'a> Matcher<'a> {
    /// `union` must have been built from exactly `tables`.
    pub fn new(tables: Vec<&'a DictionaryTable>, union: &'a StarterUnion) -> Self {
        let max_len = tables.iter().map(|t| t.max_len).max().unwrap_or(0);
        Self {
            tables,
            union,
            max_len,
        }
    }

    /// Longest entry starting at `pos`, as `(length in codepoints, target)`.
    ///
    /// ```
    /// use opencc_engine::dictionary_lib::{DictionaryTable, StarterUnion};
    /// use opencc_engine::segmenter::Matcher;
    ///
    /// let phrases = DictionaryTable::build_from_pairs(vec![("银行".into(), "銀行".into())]);
    /// let chars = DictionaryTable::build_from_pairs(vec![("行".into(), "行".into())]);
    /// let union = StarterUnion::build(&[&phrases, &chars]);
    /// let matcher = Matcher::new(vec![&phrases, &chars], &union);
    ///
    /// let text: Vec<char> = "中国银行".chars().collect();
    /// assert_eq!(matcher.match_at(&text, 2), Some((2, "銀行")));
    /// assert_eq!(matcher.match_at(&text, 0), None);
    /// ```
    #[inline]
    pub fn match_at(&self, chars: &[char], pos: usize) -> Option<(usize, &'a str)> {
        let starter = *chars.get(pos)?;
        let mask = self.union.mask(starter);
        if mask == 0 {
            return None;
        }

        let limit = self.max_len.min(chars.len() - pos);
        let mut hit = None;
        for_each_len_dec(mask, limit, |len| {
            let key = &chars[pos..pos + len];
            for table in &self.tables {
                if let Some(target) = table.get(key) {
                    hit = Some((len, target));
                    return true;
                }
            }
            false
        });
        hit
    }

    /// Converts `chars` and appends the result to `out`.
    pub fn convert_into(&self, chars: &[char], out: &mut String) {
        let mut pos = 0;
        while pos < chars.len() {
            match self.match_at(chars, pos) {
                Some((len, target)) => {
                    out.push_str(target);
                    pos += len;
                }
                None => {
                    out.push(chars[pos]);
                    pos += 1;
                }
            }
        }
    }

    fn convert_range(&self, chars: &[char], range: Range<usize>) -> String {
        let mut out = String::with_capacity(range.len() * 3);
        self.convert_into(&chars[range], &mut out);
        out
    }

    /// Converts `text` in delimiter-bounded segments.
    ///
    /// With `parallel` set and `text` longer than `threshold` bytes the
    /// segments are converted on the rayon pool and joined in order; the
    /// result is identical to the sequential path.
    pub fn convert_text(&self, text: &str, parallel: bool, threshold: usize) -> Result<String> {
        let mut out = String::new();
        if text.is_empty() {
            return Ok(out);
        }

        let chars: Vec<char> = text.chars().collect();
        let segments = DELIMITERS.split_inclusive(&chars);

        if parallel && text.len() > threshold && segments.len() > 1 {
            debug!(
                "parallel round: {} bytes, {} segments",
                text.len(),
                segments.len()
            );
            let pieces: Vec<String> = segments
                .par_iter()
                .with_min_len(MIN_SEGMENTS_PER_TASK)
                .map(|range| self.convert_range(&chars, range.clone()))
                .collect();
            out.try_reserve(pieces.iter().map(String::len).sum())?;
            for piece in &pieces {
                out.push_str(piece);
            }
        } else {
            out.try_reserve(text.len())?;
            for range in segments {
                self.convert_into(&chars[range], &mut out);
            }
        }
        Ok(out)
    }
}
