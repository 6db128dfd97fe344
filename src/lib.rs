//! Chinese script conversion (simplified, traditional, Taiwan, Hong Kong and
//! Japanese shinjitai variants) by forward maximum matching over OpenCC
//! lexicons.
//!
//! ```no_run
//! use opencc_engine::OpenCC;
//!
//! let opencc = OpenCC::try_new()?;
//! let out = opencc.convert("“汉字转换”", "s2t", true)?;
//! assert_eq!(out, "「漢字轉換」");
//! # Ok::<(), opencc_engine::OpenccError>(())
//! ```

use std::borrow::Cow;
use std::sync::Arc;

pub mod delimiter_set;
pub mod dictionary_lib;
pub mod error;
pub mod handle_registry;
pub mod opencc_config;
pub mod punctuation;
pub mod script_detector;
pub mod segmenter;
pub mod settings;
pub mod utils;

pub use crate::dictionary_lib::{DictionaryStore, Lexicon};
pub use crate::error::{OpenccError, Result};
pub use crate::opencc_config::{Direction, OpenccConfig};
pub use crate::script_detector::ScriptKind;
pub use crate::settings::{install_shared_store, shared_store, EngineSettings, StoreSource};

use crate::punctuation::convert_punctuation;
use crate::segmenter::Matcher;

/// A conversion instance: the shared dictionary store plus this instance's
/// own parallel flag.
#[derive(Debug, Clone)]
pub struct OpenCC {
    store: Arc<DictionaryStore>,
    is_parallel: bool,
    parallel_threshold: usize,
}

impl Default for OpenCC {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenCC {
    /// Creates an instance over the process-wide shared store.
    ///
    /// If the store cannot be loaded the error is recorded as the last error
    /// and the instance is backed by an empty store, so every conversion
    /// reports the missing dictionary. Use [`OpenCC::try_new`] to get the
    /// error directly.
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(opencc) => opencc,
            Err(err) => {
                log::error!("failed to load dictionary store: {}", err);
                Self::set_last_error(&err.to_string());
                Self::with_store(Arc::new(DictionaryStore::default()))
            }
        }
    }

    pub fn try_new() -> Result<Self> {
        Ok(Self::with_store(shared_store()?))
    }

    /// Creates an instance over an explicit store.
    pub fn with_store(store: Arc<DictionaryStore>) -> Self {
        let settings = settings::settings();
        Self {
            store,
            is_parallel: settings.parallel_by_default,
            parallel_threshold: settings.parallel_threshold,
        }
    }

    pub fn store(&self) -> &Arc<DictionaryStore> {
        &self.store
    }

    pub fn get_parallel(&self) -> bool {
        self.is_parallel
    }

    pub fn set_parallel(&mut self, is_parallel: bool) {
        self.is_parallel = is_parallel;
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Inputs longer than `bytes` are chunked when the parallel flag is set.
    pub fn set_parallel_threshold(&mut self, bytes: usize) {
        self.parallel_threshold = bytes;
    }

    /// Converts `input` with the configuration named `config` (exact,
    /// case-sensitive). With `punctuation` set, quotation marks are remapped
    /// for every configuration except the Japanese pair.
    ///
    /// Failures are also recorded as the thread's last error; a successful
    /// call clears it.
    pub fn convert(&self, input: &str, config: &str, punctuation: bool) -> Result<String> {
        let result = OpenccConfig::try_from(config)
            .and_then(|cfg| self.convert_with_options(input, cfg, punctuation, self.is_parallel));
        record_outcome(result)
    }

    pub fn convert_with_config(
        &self,
        input: &str,
        config: OpenccConfig,
        punctuation: bool,
    ) -> Result<String> {
        record_outcome(self.convert_with_options(input, config, punctuation, self.is_parallel))
    }

    /// Runs every round of `config`, then the punctuation pass. All
    /// dictionary lookups that can fail are resolved before any text is
    /// produced.
    pub(crate) fn convert_with_options(
        &self,
        input: &str,
        config: OpenccConfig,
        punctuation: bool,
        parallel: bool,
    ) -> Result<String> {
        let plan = self.store.resolve(config, punctuation)?;
        let punct_table = match config.direction().punctuation_lexicon() {
            Some(lexicon) if punctuation => Some(self.store.require(lexicon)?),
            _ => None,
        };
        let matchers = plan
            .rounds
            .iter()
            .map(|round| Ok(Matcher::new(self.store.chain(round.lexicons)?, &round.union)))
            .collect::<Result<Vec<_>>>()?;

        if input.is_empty() {
            return Ok(String::new());
        }

        let mut text = Cow::Borrowed(input);
        for matcher in &matchers {
            let next = matcher.convert_text(&text, parallel, self.parallel_threshold)?;
            text = Cow::Owned(next);
        }
        if let Some(table) = punct_table {
            text = Cow::Owned(convert_punctuation(&text, table)?);
        }
        Ok(text.into_owned())
    }

    /// Reports which script `input` is written in.
    pub fn detect(&self, input: &str) -> ScriptKind {
        script_detector::detect(input, self.store.script_sets())
    }

    /// Numeric form of [`OpenCC::detect`]: 0 none, 1 traditional,
    /// 2 simplified, 3 both.
    pub fn zho_check(&self, input: &str) -> i32 {
        self.detect(input).code()
    }

    /// Records an error message in the calling thread's last-error slot.
    pub fn set_last_error(err_msg: &str) {
        error::set_last_error(err_msg);
    }

    pub fn get_last_error() -> Option<String> {
        error::get_last_error()
    }

    pub fn clear_last_error() {
        error::clear_last_error();
    }
}

/// Mirrors a result into the thread's last-error slot.
pub(crate) fn record_outcome<T>(result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => error::clear_last_error(),
        Err(err) => error::set_last_error(&err.to_string()),
    }
    result
}
