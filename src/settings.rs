//! Engine settings and the process-wide shared dictionary store.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use once_cell::sync::OnceCell;

use crate::dictionary_lib::DictionaryStore;
use crate::error::Result;

pub const DICT_DIR_ENV: &str = "OPENCC_DICT_DIR";
pub const DICT_FILE_ENV: &str = "OPENCC_DICT_FILE";
pub const PARALLEL_THRESHOLD_ENV: &str = "OPENCC_PARALLEL_THRESHOLD";
pub const PARALLEL_ENV: &str = "OPENCC_PARALLEL";

/// Inputs at or below this many bytes are always converted sequentially.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Lexicon directory of the source checkout. The same files are compiled
/// into the library; see [`StoreSource::Embedded`].
pub const BUNDLED_DICT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/dicts");

/// Where the dictionary store is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    /// Lexicons compiled into the library.
    Embedded,
    /// Directory of `*.txt` lexicon files.
    LexiconDir(PathBuf),
    /// zstd-compressed CBOR artifact.
    Compressed(PathBuf),
    /// Plain CBOR artifact.
    Cbor(PathBuf),
}

impl StoreSource {
    /// Picks the artifact kind from the file extension: `.cbor` is plain CBOR,
    /// anything else is treated as compressed.
    pub fn from_file(path: PathBuf) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("cbor") => StoreSource::Cbor(path),
            _ => StoreSource::Compressed(path),
        }
    }

    pub fn load(&self) -> Result<DictionaryStore> {
        match self {
            StoreSource::Embedded => DictionaryStore::embedded(),
            StoreSource::LexiconDir(dir) => DictionaryStore::from_dir(dir),
            StoreSource::Compressed(path) => DictionaryStore::load_compressed(path),
            StoreSource::Cbor(path) => DictionaryStore::deserialize_from_cbor(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub source: StoreSource,
    pub parallel_threshold: usize,
    /// Parallel flag given to new instances.
    pub parallel_by_default: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            source: StoreSource::Embedded,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            parallel_by_default: true,
        }
    }
}

impl EngineSettings {
    /// Defaults overridden by `OPENCC_*` environment variables. A dictionary
    /// file takes precedence over a dictionary directory. Unparsable values
    /// are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(file) = lookup(DICT_FILE_ENV).filter(|v| !v.is_empty()) {
            settings.source = StoreSource::from_file(PathBuf::from(file));
        } else if let Some(dir) = lookup(DICT_DIR_ENV).filter(|v| !v.is_empty()) {
            settings.source = StoreSource::LexiconDir(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(PARALLEL_THRESHOLD_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(n) => settings.parallel_threshold = n,
                Err(_) => warn!("ignoring {}={:?}: not a byte count", PARALLEL_THRESHOLD_ENV, raw),
            }
        }

        if let Some(raw) = lookup(PARALLEL_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => settings.parallel_by_default = true,
                "0" | "false" | "off" | "no" => settings.parallel_by_default = false,
                _ => warn!("ignoring {}={:?}: not a boolean", PARALLEL_ENV, raw),
            }
        }

        settings
    }
}

static SETTINGS: OnceCell<EngineSettings> = OnceCell::new();
static SHARED_STORE: OnceCell<Arc<DictionaryStore>> = OnceCell::new();

/// Settings for this process, read from the environment on first use.
pub fn settings() -> &'static EngineSettings {
    SETTINGS.get_or_init(EngineSettings::from_env)
}

/// Fixes the process settings before first use. Returns `false` when they
/// were already initialized.
pub fn install_settings(settings: EngineSettings) -> bool {
    SETTINGS.set(settings).is_ok()
}

/// The store shared by every instance, loaded once from [`settings`].
/// A failed load is not cached; the next call retries.
pub fn shared_store() -> Result<Arc<DictionaryStore>> {
    SHARED_STORE
        .get_or_try_init(|| {
            let source = &settings().source;
            info!("loading shared dictionary store from {:?}", source);
            source.load().map(Arc::new)
        })
        .cloned()
}

/// Installs a pre-built store as the shared one. Returns `false` when a
/// shared store already exists.
pub fn install_shared_store(store: Arc<DictionaryStore>) -> bool {
    SHARED_STORE.set(store).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> EngineSettings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineSettings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let settings = from_map(&[]);
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.source, StoreSource::Embedded);
        assert!(settings.parallel_by_default);

        let settings = from_map(&[(DICT_DIR_ENV, ""), (DICT_FILE_ENV, "")]);
        assert_eq!(settings.source, StoreSource::Embedded);
    }

    #[test]
    fn default_source_needs_no_files() {
        let store = StoreSource::Embedded.load().unwrap();
        assert_eq!(store.loaded().len(), crate::dictionary_lib::Lexicon::COUNT);

        let missing = StoreSource::LexiconDir(PathBuf::from("/nonexistent/opencc-dicts"));
        assert!(missing.load().is_err());
    }

    #[test]
    fn file_overrides_dir() {
        let settings = from_map(&[
            (DICT_DIR_ENV, "/tmp/dicts"),
            (DICT_FILE_ENV, "/tmp/store.cbor"),
        ]);
        assert_eq!(settings.source, StoreSource::Cbor(PathBuf::from("/tmp/store.cbor")));

        let settings = from_map(&[(DICT_DIR_ENV, "/tmp/dicts")]);
        assert_eq!(settings.source, StoreSource::LexiconDir(PathBuf::from("/tmp/dicts")));
    }

    #[test]
    fn parses_threshold_and_flag() {
        let settings = from_map(&[(PARALLEL_THRESHOLD_ENV, " 1024 "), (PARALLEL_ENV, "off")]);
        assert_eq!(settings.parallel_threshold, 1024);
        assert!(!settings.parallel_by_default);

        let settings = from_map(&[(PARALLEL_THRESHOLD_ENV, "lots"), (PARALLEL_ENV, "maybe")]);
        assert_eq!(settings.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert!(settings.parallel_by_default);
    }

    #[test]
    fn artifact_kind_follows_extension() {
        assert!(matches!(
            StoreSource::from_file(PathBuf::from("a.zstd")),
            StoreSource::Compressed(_)
        ));
        assert!(matches!(
            StoreSource::from_file(PathBuf::from("a.cbor")),
            StoreSource::Cbor(_)
        ));
    }
}
