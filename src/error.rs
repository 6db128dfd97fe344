//! Error type shared by the store, the engine and the boundary layer, plus the
//! thread-local last-error slot used by the dual-channel boundary convention.

use std::cell::RefCell;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading dictionaries or converting text.
#[derive(Debug, Error)]
pub enum OpenccError {
    /// Configuration name is not one of the registered identifiers.
    #[error("Invalid config: {0}")]
    UnknownConfiguration(String),

    /// A lexicon required by a configuration (or named explicitly) is absent.
    #[error("Missing dictionary file for {lexicon}: {path}")]
    MissingDictionaryFile { lexicon: &'static str, path: PathBuf },

    /// A lexicon file contained a malformed line.
    #[error("Failed to parse dictionary {path} at line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Input bytes were not valid UTF-8.
    #[error("Invalid UTF-8 input at byte {position}")]
    InvalidEncoding { position: usize },

    /// The instance handle is zero or no longer live.
    #[error("Invalid argument: instance is NULL or deleted")]
    NullInstance,

    /// The output buffer could not be grown.
    #[error("Memory allocation failed: {0}")]
    AllocationFailure(String),

    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),

    /// CBOR encoding/decoding of a compiled store failed.
    #[error("Serialization Error: {0}")]
    Serialization(String),
}

impl From<serde_cbor::Error> for OpenccError {
    fn from(err: serde_cbor::Error) -> Self {
        OpenccError::Serialization(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for OpenccError {
    fn from(err: std::collections::TryReserveError) -> Self {
        OpenccError::AllocationFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpenccError>;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Records `msg` as the calling thread's most recent error.
pub fn set_last_error(msg: &str) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(msg.to_string()));
}

/// Returns a copy of the calling thread's last error without clearing it.
pub fn get_last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Returns the calling thread's last error and clears the slot.
pub fn take_last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

pub fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_error_is_per_thread() {
        set_last_error("main thread failure");

        let seen_elsewhere = std::thread::spawn(get_last_error).join().unwrap();
        assert_eq!(seen_elsewhere, None);

        assert_eq!(get_last_error().as_deref(), Some("main thread failure"));
        assert_eq!(take_last_error().as_deref(), Some("main thread failure"));
        assert_eq!(get_last_error(), None);
    }

    #[test]
    fn unknown_config_message_names_the_config() {
        let err = OpenccError::UnknownConfiguration("s2s".into());
        assert_eq!(err.to_string(), "Invalid config: s2s");
    }
}
