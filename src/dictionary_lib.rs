//! Dictionary store: lexicon tables, their starter indexes and the shared,
//! read-only store that owns them.

mod dictionary_store;
mod dictionary_table;
mod starter_union;

pub use dictionary_store::{DictionaryStore, ScriptSets};
pub use dictionary_table::DictionaryTable;
pub use starter_union::StarterUnion;

use serde::{Deserialize, Serialize};

/// Every lexicon the engine knows about, named after its OpenCC file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lexicon {
    StCharacters,
    StPhrases,
    TsCharacters,
    TsPhrases,
    TwPhrases,
    TwPhrasesRev,
    TwVariants,
    TwVariantsRev,
    TwVariantsRevPhrases,
    HkVariants,
    HkVariantsRev,
    HkVariantsRevPhrases,
    JpsCharacters,
    JpsPhrases,
    JpVariants,
    JpVariantsRev,
    StPunctuations,
    TsPunctuations,
}

impl Lexicon {
    pub const COUNT: usize = 18;

    pub const ALL: [Lexicon; Lexicon::COUNT] = [
        Lexicon::StCharacters,
        Lexicon::StPhrases,
        Lexicon::TsCharacters,
        Lexicon::TsPhrases,
        Lexicon::TwPhrases,
        Lexicon::TwPhrasesRev,
        Lexicon::TwVariants,
        Lexicon::TwVariantsRev,
        Lexicon::TwVariantsRevPhrases,
        Lexicon::HkVariants,
        Lexicon::HkVariantsRev,
        Lexicon::HkVariantsRevPhrases,
        Lexicon::JpsCharacters,
        Lexicon::JpsPhrases,
        Lexicon::JpVariants,
        Lexicon::JpVariantsRev,
        Lexicon::StPunctuations,
        Lexicon::TsPunctuations,
    ];

    /// Slot index inside a [`DictionaryStore`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Lexicon::StCharacters => "STCharacters.txt",
            Lexicon::StPhrases => "STPhrases.txt",
            Lexicon::TsCharacters => "TSCharacters.txt",
            Lexicon::TsPhrases => "TSPhrases.txt",
            Lexicon::TwPhrases => "TWPhrases.txt",
            Lexicon::TwPhrasesRev => "TWPhrasesRev.txt",
            Lexicon::TwVariants => "TWVariants.txt",
            Lexicon::TwVariantsRev => "TWVariantsRev.txt",
            Lexicon::TwVariantsRevPhrases => "TWVariantsRevPhrases.txt",
            Lexicon::HkVariants => "HKVariants.txt",
            Lexicon::HkVariantsRev => "HKVariantsRev.txt",
            Lexicon::HkVariantsRevPhrases => "HKVariantsRevPhrases.txt",
            Lexicon::JpsCharacters => "JPShinjitaiCharacters.txt",
            Lexicon::JpsPhrases => "JPShinjitaiPhrases.txt",
            Lexicon::JpVariants => "JPVariants.txt",
            Lexicon::JpVariantsRev => "JPVariantsRev.txt",
            Lexicon::StPunctuations => "STPunctuations.txt",
            Lexicon::TsPunctuations => "TSPunctuations.txt",
        }
    }

    /// Inverse of [`Lexicon::file_name`].
    pub fn from_file_name(name: &str) -> Option<Lexicon> {
        Lexicon::ALL.into_iter().find(|lex| lex.file_name() == name)
    }
}
