// JSON form of a dictionary store (CLI and tests only).
use opencc_engine::dictionary_lib::{DictionaryStore, DictionaryTable, Lexicon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap; // stable key order for diffs

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TableJson {
    pub entries: BTreeMap<String, String>,

    #[serde(default)]
    pub max_len: usize,

    #[serde(default)]
    pub min_len: usize,
}

/// Lexicon file name → table. Lexicons that were not loaded are omitted.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreJson {
    pub lexicons: BTreeMap<String, TableJson>,
}

impl From<&DictionaryTable> for TableJson {
    fn from(table: &DictionaryTable) -> Self {
        let entries = table
            .entries
            .iter()
            .map(|(k, v)| (k.iter().collect::<String>(), v.to_string()))
            .collect();
        Self {
            entries,
            max_len: table.max_len,
            min_len: table.min_len,
        }
    }
}

impl From<&DictionaryStore> for StoreJson {
    fn from(store: &DictionaryStore) -> Self {
        let lexicons = store
            .loaded()
            .into_iter()
            .filter_map(|lex| {
                store
                    .table(lex)
                    .map(|t| (lex.file_name().to_string(), TableJson::from(t)))
            })
            .collect();
        Self { lexicons }
    }
}

impl StoreJson {
    /// Rebuilds a store; lengths and indexes are recomputed from the
    /// entries. Unknown lexicon names are skipped.
    #[allow(dead_code)]
    pub fn into_store(self) -> DictionaryStore {
        let tables = self.lexicons.into_iter().filter_map(|(name, table)| {
            Lexicon::from_file_name(&name)
                .map(|lex| (lex, DictionaryTable::build_from_pairs(table.entries)))
        });
        DictionaryStore::from_tables(tables)
    }
}
