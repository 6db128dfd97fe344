use std::sync::Arc;

use once_cell::sync::Lazy;
use opencc_engine::settings::BUNDLED_DICT_DIR;
use opencc_engine::{DictionaryStore, OpenCC, OpenccConfig};
use proptest::prelude::*;

static STORE: Lazy<Arc<DictionaryStore>> = Lazy::new(|| {
    Arc::new(DictionaryStore::from_dir(BUNDLED_DICT_DIR).expect("bundled dicts load"))
});

/// Lexicon characters, phrase fragments, delimiters and the odd astral
/// codepoint, so generated text hits phrase matches and segment boundaries.
const ALPHABET: &[&str] = &[
    "银", "行", "国", "中", "宫", "里", "意大利", "罗", "鼠标", "软件", "于", "后", "发",
    "舊", "體", "國", "広", "弁護士", "“", "”", "「", "」", "，", "。", "\n", " ", "a", "𬴂",
    "🙂",
];

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(ALPHABET), 0..400).prop_map(|parts| parts.concat())
}

fn engines() -> (OpenCC, OpenCC) {
    let mut sequential = OpenCC::with_store(STORE.clone());
    sequential.set_parallel(false);
    let mut parallel = OpenCC::with_store(STORE.clone());
    parallel.set_parallel(true);
    parallel.set_parallel_threshold(0);
    (sequential, parallel)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn parallel_output_is_identical(text in text_strategy(), idx in 0..OpenccConfig::COUNT, punct: bool) {
        let (sequential, parallel) = engines();
        let cfg = OpenccConfig::ALL[idx];
        let a = sequential.convert_with_config(&text, cfg, punct).unwrap();
        let b = parallel.convert_with_config(&text, cfg, punct).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn unmatched_text_passes_through(text in "[a-z0-9 ,.!?\n]{0,200}") {
        let (sequential, _) = engines();
        for cfg in OpenccConfig::ALL {
            prop_assert_eq!(sequential.convert_with_config(&text, cfg, true).unwrap(), text.clone());
        }
    }
}
