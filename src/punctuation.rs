//! Final punctuation pass (`“”‘’` ⇄ `「」『』`).
//!
//! The pass replaces whole characters only; multi-character keys in a
//! punctuation table are ignored.

use crate::dictionary_lib::DictionaryTable;
use crate::error::Result;

pub fn convert_punctuation(text: &str, table: &DictionaryTable) -> Result<String> {
    let mut out = String::new();
    out.try_reserve(text.len())?;

    let mut key = [' '; 1];
    for c in text.chars() {
        key[0] = c;
        match table.get(&key) {
            Some(target) => out.push_str(target),
            None => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st_punct() -> DictionaryTable {
        DictionaryTable::build_from_pairs(
            [("“", "「"), ("”", "」"), ("‘", "『"), ("’", "』"), ("“”", "X")]
                .iter()
                .map(|(s, t)| (s.to_string(), t.to_string())),
        )
    }

    #[test]
    fn replaces_quotes_only() {
        let out = convert_punctuation("他说“你好‘世界’”。", &st_punct()).unwrap();
        assert_eq!(out, "他说「你好『世界』」。");
    }

    #[test]
    fn ignores_multi_char_keys() {
        assert_eq!(convert_punctuation("“”", &st_punct()).unwrap(), "「」");
    }
}
