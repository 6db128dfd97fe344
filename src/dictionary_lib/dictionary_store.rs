//! The shared, read-only collection of lexicon tables.
//!
//! A store is built once (from a lexicon directory, explicit files, or a
//! compiled CBOR/zstd artifact) and then shared by every engine instance.
//! Per-configuration matching plans and the script-detection sets are derived
//! lazily and cached inside the store.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use log::{debug, info};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use zstd::{Decoder, Encoder};

use super::{DictionaryTable, Lexicon, StarterUnion};
use crate::error::{OpenccError, Result};
use crate::opencc_config::OpenccConfig;

const ZSTD_LEVEL: i32 = 19;

/// Lexicon files compiled into the library.
const EMBEDDED_LEXICONS: [(Lexicon, &str); Lexicon::COUNT] = [
    (Lexicon::StCharacters, include_str!("../../dicts/STCharacters.txt")),
    (Lexicon::StPhrases, include_str!("../../dicts/STPhrases.txt")),
    (Lexicon::TsCharacters, include_str!("../../dicts/TSCharacters.txt")),
    (Lexicon::TsPhrases, include_str!("../../dicts/TSPhrases.txt")),
    (Lexicon::TwPhrases, include_str!("../../dicts/TWPhrases.txt")),
    (Lexicon::TwPhrasesRev, include_str!("../../dicts/TWPhrasesRev.txt")),
    (Lexicon::TwVariants, include_str!("../../dicts/TWVariants.txt")),
    (Lexicon::TwVariantsRev, include_str!("../../dicts/TWVariantsRev.txt")),
    (
        Lexicon::TwVariantsRevPhrases,
        include_str!("../../dicts/TWVariantsRevPhrases.txt"),
    ),
    (Lexicon::HkVariants, include_str!("../../dicts/HKVariants.txt")),
    (Lexicon::HkVariantsRev, include_str!("../../dicts/HKVariantsRev.txt")),
    (
        Lexicon::HkVariantsRevPhrases,
        include_str!("../../dicts/HKVariantsRevPhrases.txt"),
    ),
    (Lexicon::JpsCharacters, include_str!("../../dicts/JPShinjitaiCharacters.txt")),
    (Lexicon::JpsPhrases, include_str!("../../dicts/JPShinjitaiPhrases.txt")),
    (Lexicon::JpVariants, include_str!("../../dicts/JPVariants.txt")),
    (Lexicon::JpVariantsRev, include_str!("../../dicts/JPVariantsRev.txt")),
    (Lexicon::StPunctuations, include_str!("../../dicts/STPunctuations.txt")),
    (Lexicon::TsPunctuations, include_str!("../../dicts/TSPunctuations.txt")),
];

/// One round of a conversion: an ordered lexicon chain plus its merged
/// starter index.
#[derive(Debug)]
pub(crate) struct PlanRound {
    pub lexicons: &'static [Lexicon],
    pub union: StarterUnion,
}

/// Resolved, immutable matching plan of one configuration.
#[derive(Debug)]
pub(crate) struct ConversionPlan {
    pub rounds: Vec<PlanRound>,
}

/// Codepoints that only occur in one script, derived from the character
/// tables.
#[derive(Debug, Default)]
pub struct ScriptSets {
    pub simplified_only: FxHashSet<char>,
    pub traditional_only: FxHashSet<char>,
}

impl ScriptSets {
    /// A simplified-only codepoint is a single-character `STCharacters` key
    /// that converts to something else and is not itself converted by
    /// `TSCharacters`. Traditional-only is the mirror image.
    pub fn derive(st: Option<&DictionaryTable>, ts: Option<&DictionaryTable>) -> Self {
        let changing = |table: Option<&DictionaryTable>| -> FxHashSet<char> {
            let mut set = FxHashSet::default();
            if let Some(table) = table {
                for (key, target) in &table.entries {
                    if let [c] = &**key {
                        let mut chars = target.chars();
                        if !(chars.next() == Some(*c) && chars.next().is_none()) {
                            set.insert(*c);
                        }
                    }
                }
            }
            set
        };

        let st_changing = changing(st);
        let ts_changing = changing(ts);

        Self {
            simplified_only: st_changing.difference(&ts_changing).copied().collect(),
            traditional_only: ts_changing.difference(&st_changing).copied().collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DictionaryStore {
    /// Indexed by [`Lexicon::index`]; `None` when the lexicon was not loaded.
    tables: Vec<Option<DictionaryTable>>,

    /// Directory the lexicons came from, for error messages.
    #[serde(skip)]
    origin: Option<PathBuf>,

    #[serde(skip)]
    plans: [OnceLock<Arc<ConversionPlan>>; OpenccConfig::COUNT],

    #[serde(skip)]
    scripts: OnceLock<ScriptSets>,
}

impl DictionaryStore {
    fn empty() -> Self {
        let mut store = Self::default();
        store.tables.resize_with(Lexicon::COUNT, || None);
        store
    }

    /// Builds a store from tables already in memory.
    pub fn from_tables<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = (Lexicon, DictionaryTable)>,
    {
        let mut store = Self::empty();
        for (lexicon, table) in tables {
            store.tables[lexicon.index()] = Some(table);
        }
        store.finish();
        store
    }

    /// Builds the store from the lexicons compiled into the library. Needs no
    /// file system access.
    pub fn embedded() -> Result<Self> {
        let mut store = Self::empty();
        for (lexicon, content) in EMBEDDED_LEXICONS {
            let table = DictionaryTable::parse(content, Path::new(lexicon.file_name()))?;
            store.tables[lexicon.index()] = Some(table);
        }
        store.finish();
        Ok(store)
    }

    /// Loads every lexicon file found in `dir`. Lexicons whose file is absent
    /// stay unloaded; configurations that need them fail at resolution time.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(OpenccError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("dictionary directory not found: {}", dir.display()),
            )));
        }

        let mut store = Self::empty();
        for lexicon in Lexicon::ALL {
            let path = dir.join(lexicon.file_name());
            if path.is_file() {
                store.tables[lexicon.index()] = Some(DictionaryTable::load(&path)?);
            } else {
                debug!("lexicon {} not present in {}", lexicon.file_name(), dir.display());
            }
        }
        store.origin = Some(dir.to_path_buf());
        store.finish();
        Ok(store)
    }

    /// Loads the given lexicon files. Each path must exist.
    pub fn from_files<I, P>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Lexicon, P)>,
        P: AsRef<Path>,
    {
        let mut store = Self::empty();
        for (lexicon, path) in files {
            let path = path.as_ref();
            if !path.is_file() {
                return Err(OpenccError::MissingDictionaryFile {
                    lexicon: lexicon.file_name(),
                    path: path.to_path_buf(),
                });
            }
            store.tables[lexicon.index()] = Some(DictionaryTable::load(path)?);
        }
        store.finish();
        Ok(store)
    }

    /// Normalizes slots, rebuilds runtime indexes and reports what loaded.
    fn finish(&mut self) {
        self.tables.resize_with(Lexicon::COUNT, || None);
        self.tables.truncate(Lexicon::COUNT);
        for table in self.tables.iter_mut().flatten() {
            table.rebuild_index();
        }

        let loaded = self.tables.iter().flatten().count();
        let entries: usize = self.tables.iter().flatten().map(DictionaryTable::len).sum();
        info!(
            "dictionary store ready: {}/{} lexicons, {} entries",
            loaded,
            Lexicon::COUNT,
            entries
        );

        for config in OpenccConfig::ALL {
            if let Some(missing) = self.first_missing(config, false) {
                debug!(
                    "config {} unavailable: {} not loaded",
                    config,
                    missing.file_name()
                );
            }
        }
    }

    pub fn table(&self, lexicon: Lexicon) -> Option<&DictionaryTable> {
        self.tables.get(lexicon.index()).and_then(Option::as_ref)
    }

    pub fn has(&self, lexicon: Lexicon) -> bool {
        self.table(lexicon).is_some()
    }

    /// Lexicons currently loaded, in declaration order.
    pub fn loaded(&self) -> Vec<Lexicon> {
        Lexicon::ALL.into_iter().filter(|l| self.has(*l)).collect()
    }

    fn first_missing(&self, config: OpenccConfig, punctuation: bool) -> Option<Lexicon> {
        config
            .required_lexicons(punctuation)
            .into_iter()
            .find(|lex| !self.has(*lex))
    }

    /// Whether every lexicon `config` needs is loaded.
    pub fn supports(&self, config: OpenccConfig, punctuation: bool) -> bool {
        self.first_missing(config, punctuation).is_none()
    }

    fn missing_error(&self, lexicon: Lexicon) -> OpenccError {
        let path = match &self.origin {
            Some(dir) => dir.join(lexicon.file_name()),
            None => PathBuf::from(lexicon.file_name()),
        };
        OpenccError::MissingDictionaryFile {
            lexicon: lexicon.file_name(),
            path,
        }
    }

    /// Fetches `lexicon`, or the error a conversion reports when it is absent.
    pub(crate) fn require(&self, lexicon: Lexicon) -> Result<&DictionaryTable> {
        self.table(lexicon).ok_or_else(|| self.missing_error(lexicon))
    }

    /// Tables of one chain, in chain order.
    pub(crate) fn chain(&self, lexicons: &[Lexicon]) -> Result<Vec<&DictionaryTable>> {
        lexicons.iter().map(|lex| self.require(*lex)).collect()
    }

    /// Returns the cached plan for `config`, building it on first use.
    ///
    /// Fails with `MissingDictionaryFile` when a lexicon of the configuration
    /// (or its punctuation table, when requested) is not loaded.
    pub(crate) fn resolve(
        &self,
        config: OpenccConfig,
        punctuation: bool,
    ) -> Result<Arc<ConversionPlan>> {
        if let Some(missing) = self.first_missing(config, punctuation) {
            return Err(self.missing_error(missing));
        }

        let slot = &self.plans[config.slot()];
        if let Some(plan) = slot.get() {
            return Ok(plan.clone());
        }

        let mut rounds = Vec::with_capacity(config.rounds().len());
        for &lexicons in config.rounds() {
            let tables = self.chain(lexicons)?;
            rounds.push(PlanRound {
                lexicons,
                union: StarterUnion::build(&tables),
            });
        }
        debug!("built plan for {} ({} rounds)", config, rounds.len());

        // A concurrent builder may have won; either plan is equivalent.
        let plan = slot.get_or_init(|| Arc::new(ConversionPlan { rounds }));
        Ok(plan.clone())
    }

    /// Script-only character sets, derived on first use.
    pub fn script_sets(&self) -> &ScriptSets {
        self.scripts.get_or_init(|| {
            ScriptSets::derive(
                self.table(Lexicon::StCharacters),
                self.table(Lexicon::TsCharacters),
            )
        })
    }

    // ---- persistence ----------------------------------------------------

    pub fn to_cbor_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn from_cbor_bytes(bytes: &[u8]) -> Result<Self> {
        let mut store: Self = serde_cbor::from_slice(bytes)?;
        store.finish();
        Ok(store)
    }

    /// Writes the store as plain CBOR.
    pub fn serialize_to_cbor<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_cbor_bytes()?)?;
        Ok(())
    }

    pub fn deserialize_from_cbor<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_cbor_bytes(&bytes)
    }

    /// Writes the store as zstd-compressed CBOR.
    pub fn save_compressed<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = Encoder::new(writer, ZSTD_LEVEL)?;
        serde_cbor::to_writer(&mut encoder, self)?;
        encoder.finish()?;
        Ok(())
    }

    pub fn load_compressed<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut decoder = Decoder::new(reader)?;
        let mut store: Self = serde_cbor::from_reader(&mut decoder)?;
        store.finish();
        Ok(store)
    }

    /// Writes every loaded lexicon back out as a text file under `dir`.
    pub fn to_dicts<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for lexicon in self.loaded() {
            if let Some(table) = self.table(lexicon) {
                fs::write(dir.join(lexicon.file_name()), table.to_lexicon_text())?;
            }
        }
        Ok(())
    }
}
