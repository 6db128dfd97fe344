use rustc_hash::FxHashMap;

use super::DictionaryTable;

const BMP_SIZE: usize = 0x10000;

/// Starter length masks of a whole chain of tables, merged.
///
/// The matcher checks this once per position instead of asking every table:
/// a zero mask means no table has a key starting with that codepoint and the
/// character is copied through. BMP starters sit in a dense array, astral
/// starters in a sparse map.
#[derive(Debug)]
pub struct StarterUnion {
    bmp: Vec<u64>,
    astral: FxHashMap<char, u64>,
}

impl StarterUnion {
    /// ```
    /// use opencc_engine::dictionary_lib::{DictionaryTable, StarterUnion};
    /// use opencc_engine::utils::length_bit;
    ///
    /// let phrases = DictionaryTable::build_from_pairs(vec![("银行".into(), "銀行".into())]);
    /// let chars = DictionaryTable::build_from_pairs(vec![
    ///     ("银".into(), "銀".into()),
    ///     ("𬴂".into(), "騑".into()),
    /// ]);
    ///
    /// let union = StarterUnion::build(&[&phrases, &chars]);
    /// assert_eq!(union.mask('银'), length_bit(1) | length_bit(2));
    /// assert_eq!(union.mask('𬴂'), length_bit(1));
    /// assert_eq!(union.mask('行'), 0);
    /// ```
    pub fn build(tables: &[&DictionaryTable]) -> Self {
        let mut bmp = vec![0u64; BMP_SIZE];
        let mut astral = FxHashMap::default();

        for table in tables {
            for (starter, mask) in table.starter_masks() {
                let u = starter as usize;
                if u < BMP_SIZE {
                    bmp[u] |= mask;
                } else {
                    *astral.entry(starter).or_default() |= mask;
                }
            }
        }

        Self { bmp, astral }
    }

    #[inline]
    pub fn mask(&self, starter: char) -> u64 {
        let u = starter as usize;
        if u < BMP_SIZE {
            self.bmp[u]
        } else {
            self.astral.get(&starter).copied().unwrap_or(0)
        }
    }
}
