//! Segment delimiters.
//!
//! Conversion never lets a dictionary match run across a delimiter, so the
//! text between delimiters can be converted independently. That is what makes
//! chunked parallel conversion produce the same bytes as the sequential path.

use std::ops::Range;

use once_cell::sync::Lazy;

/// Whitespace, ASCII punctuation and common CJK punctuation.
///
/// Quotation marks such as `“` `”` `「` `」` are not delimiters; the
/// punctuation tables remap them and lexicon phrases may contain them.
pub const DEFAULT_DELIMITERS: &str =
    " \t\n\r!\"#$%&'()*+,-./:;<=>?@[\\]^_{}|~＝、。﹁﹂—－（）《》〈〉？！…／＼︒︑︔︓︿﹀︹︺︙︐［﹇］﹈︕︖︰︳︴︽︾︵︶｛︷｝︸﹃﹄【︻】︼　～．，；：";

/// One bit per BMP code point. Astral code points are never delimiters.
#[derive(Clone)]
pub struct DelimiterSet {
    bits: Box<[u64; 1024]>,
}

impl DelimiterSet {
    pub fn from_chars(delimiters: &str) -> Self {
        let mut bits = Box::new([0u64; 1024]);
        for ch in delimiters.chars() {
            let u = ch as u32;
            if u <= 0xFFFF {
                bits[(u >> 6) as usize] |= 1u64 << (u & 63);
            }
        }
        Self { bits }
    }

    #[inline]
    pub fn contains(&self, c: char) -> bool {
        let u = c as u32;
        u <= 0xFFFF && (self.bits[(u >> 6) as usize] >> (u & 63)) & 1 == 1
    }

    /// Splits `chars` into ranges that each end with a delimiter (inclusive),
    /// except possibly the last one.
    ///
    /// The ranges cover `chars` exactly, in order, without gaps.
    pub fn split_inclusive(&self, chars: &[char]) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        for (i, &c) in chars.iter().enumerate() {
            if self.contains(c) {
                ranges.push(start..i + 1);
                start = i + 1;
            }
        }
        if start < chars.len() {
            ranges.push(start..chars.len());
        }
        ranges
    }
}

pub static DELIMITERS: Lazy<DelimiterSet> =
    Lazy::new(|| DelimiterSet::from_chars(DEFAULT_DELIMITERS));

#[inline]
pub fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(c)
}
