//! Safe side of the foreign-function boundary.
//!
//! Hosts never see pointers: an instance is an opaque non-zero `u64` handle
//! into a process-wide arena. Every function here reports failure through a
//! sentinel (`0`, `None`, `false` or `-1`) and records the message in the
//! calling thread's last-error slot; a successful conversion clears it.
//!
//! A call holds its own `Arc` to the instance, so deleting a handle while
//! another thread is converting with it is safe: the conversion finishes and
//! the instance is dropped afterwards.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::dictionary_lib::DictionaryStore;
use crate::error::{self, OpenccError, Result};
use crate::opencc_config::OpenccConfig;
use crate::{record_outcome, settings, OpenCC};

pub type InstanceHandle = u64;

/// Never a valid handle.
pub const INVALID_HANDLE: InstanceHandle = 0;

struct Instance {
    engine: OpenCC,
    parallel: AtomicBool,
}

static INSTANCES: Lazy<Mutex<FxHashMap<InstanceHandle, Arc<Instance>>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn instances() -> MutexGuard<'static, FxHashMap<InstanceHandle, Arc<Instance>>> {
    // The map is never left half-updated, so a poisoned lock is still usable.
    INSTANCES.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lookup(handle: InstanceHandle) -> Result<Arc<Instance>> {
    if handle == INVALID_HANDLE {
        return Err(OpenccError::NullInstance);
    }
    instances()
        .get(&handle)
        .cloned()
        .ok_or(OpenccError::NullInstance)
}

fn fail<T>(err: OpenccError) -> Option<T> {
    error::set_last_error(&err.to_string());
    None
}

fn register(engine: OpenCC) -> InstanceHandle {
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    let parallel = AtomicBool::new(engine.get_parallel());
    instances().insert(handle, Arc::new(Instance { engine, parallel }));
    debug!("instance {} created", handle);
    handle
}

/// Creates an instance over the shared store. Returns [`INVALID_HANDLE`] when
/// the store cannot be loaded.
pub fn instance_new() -> InstanceHandle {
    match settings::shared_store() {
        Ok(store) => register(OpenCC::with_store(store)),
        Err(err) => {
            error::set_last_error(&err.to_string());
            INVALID_HANDLE
        }
    }
}

/// Creates an instance over an explicit store.
pub fn instance_new_with_store(store: Arc<DictionaryStore>) -> InstanceHandle {
    register(OpenCC::with_store(store))
}

/// Releases `handle`. Returns `false` when it was not live.
pub fn instance_delete(handle: InstanceHandle) -> bool {
    let removed = instances().remove(&handle).is_some();
    if removed {
        debug!("instance {} deleted", handle);
    }
    removed
}

pub fn get_parallel(handle: InstanceHandle) -> Option<bool> {
    match lookup(handle) {
        Ok(instance) => Some(instance.parallel.load(Ordering::Relaxed)),
        Err(err) => fail(err),
    }
}

/// Returns `false` when `handle` is not live.
pub fn set_parallel(handle: InstanceHandle, is_parallel: bool) -> bool {
    match lookup(handle) {
        Ok(instance) => {
            instance.parallel.store(is_parallel, Ordering::Relaxed);
            true
        }
        Err(err) => {
            error::set_last_error(&err.to_string());
            false
        }
    }
}

/// Number of live instances.
pub fn live_instances() -> usize {
    instances().len()
}

fn decode(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| OpenccError::InvalidEncoding {
        position: e.valid_up_to(),
    })
}

fn convert_resolved(
    handle: InstanceHandle,
    input: &[u8],
    config: Result<OpenccConfig>,
    punctuation: bool,
) -> Option<Vec<u8>> {
    let result = lookup(handle).and_then(|instance| {
        let text = decode(input)?;
        let parallel = instance.parallel.load(Ordering::Relaxed);
        instance
            .engine
            .convert_with_options(text, config?, punctuation, parallel)
    });
    record_outcome(result).ok().map(String::into_bytes)
}

/// Converts UTF-8 `input` with the configuration named by UTF-8 `config`.
///
/// Returns the converted bytes, or `None` with the last error set.
pub fn convert_bytes(
    handle: InstanceHandle,
    input: &[u8],
    config: &[u8],
    punctuation: bool,
) -> Option<Vec<u8>> {
    let config = std::str::from_utf8(config)
        .map_err(|_| OpenccError::UnknownConfiguration(String::from_utf8_lossy(config).into()))
        .and_then(OpenccConfig::try_from);
    convert_resolved(handle, input, config, punctuation)
}

/// Like [`convert_bytes`], with the configuration given by its numeric id.
pub fn convert_cfg_bytes(
    handle: InstanceHandle,
    input: &[u8],
    config_id: u32,
    punctuation: bool,
) -> Option<Vec<u8>> {
    let config = OpenccConfig::from_ffi(config_id)
        .ok_or_else(|| OpenccError::UnknownConfiguration(config_id.to_string()));
    convert_resolved(handle, input, config, punctuation)
}

/// Script detection code (0 none, 1 traditional, 2 simplified, 3 both), or
/// `-1` with the last error set.
pub fn zho_check_bytes(handle: InstanceHandle, input: &[u8]) -> i32 {
    let result = lookup(handle).and_then(|instance| Ok(instance.engine.zho_check(decode(input)?)));
    match result {
        Ok(code) => code,
        Err(err) => {
            error::set_last_error(&err.to_string());
            -1
        }
    }
}

/// The calling thread's pending error, if any. The slot is not cleared.
pub fn last_error() -> Option<String> {
    error::get_last_error()
}

pub fn clear_last_error() {
    error::clear_last_error();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary_lib::{DictionaryTable, Lexicon};

    fn store() -> Arc<DictionaryStore> {
        let table = |pairs: &[(&str, &str)]| {
            DictionaryTable::build_from_pairs(
                pairs
                    .iter()
                    .map(|(s, t)| (s.to_string(), t.to_string())),
            )
        };
        Arc::new(DictionaryStore::from_tables(vec![
            (Lexicon::StPhrases, table(&[("银行", "銀行")])),
            (Lexicon::StCharacters, table(&[("国", "國"), ("银", "銀")])),
            (Lexicon::TsPhrases, table(&[("銀行", "银行")])),
            (Lexicon::TsCharacters, table(&[("國", "国"), ("銀", "银")])),
        ]))
    }

    #[test]
    fn handles_are_non_zero_and_unique() {
        let a = instance_new_with_store(store());
        let b = instance_new_with_store(store());
        assert_ne!(a, INVALID_HANDLE);
        assert_ne!(a, b);
        assert!(instance_delete(a));
        assert!(!instance_delete(a));
        assert!(instance_delete(b));
    }

    #[test]
    fn zero_handle_is_null_instance() {
        clear_last_error();
        assert_eq!(convert_bytes(0, "国".as_bytes(), b"s2t", false), None);
        assert!(last_error().unwrap().contains("NULL"));
        assert_eq!(get_parallel(0), None);
        assert!(!set_parallel(0, true));
        assert_eq!(zho_check_bytes(0, b"abc"), -1);
    }

    #[test]
    fn parallel_flag_is_per_instance() {
        let a = instance_new_with_store(store());
        let b = instance_new_with_store(store());
        assert!(set_parallel(a, false));
        assert!(set_parallel(b, true));
        assert_eq!(get_parallel(a), Some(false));
        assert_eq!(get_parallel(b), Some(true));
        instance_delete(a);
        instance_delete(b);
    }

    #[test]
    fn invalid_utf8_input_reports_position() {
        let h = instance_new_with_store(store());
        assert_eq!(convert_bytes(h, b"ab\xffcd", b"s2t", false), None);
        assert_eq!(
            last_error().as_deref(),
            Some("Invalid UTF-8 input at byte 2")
        );
        instance_delete(h);
    }

    #[test]
    fn unknown_config_then_success_clears_error() {
        let h = instance_new_with_store(store());
        assert_eq!(convert_bytes(h, "国".as_bytes(), b"S2T", false), None);
        assert_eq!(last_error().as_deref(), Some("Invalid config: S2T"));

        let out = convert_cfg_bytes(h, "中国银行".as_bytes(), OpenccConfig::S2t.to_ffi(), false);
        assert_eq!(out.as_deref(), Some("中國銀行".as_bytes()));
        assert_eq!(last_error(), None);

        assert_eq!(convert_cfg_bytes(h, b"x", 99, false), None);
        assert_eq!(last_error().as_deref(), Some("Invalid config: 99"));
        instance_delete(h);
    }

    #[test]
    fn deleting_one_instance_keeps_the_other_working() {
        let a = instance_new_with_store(store());
        let b = instance_new_with_store(store());
        instance_delete(a);
        assert_eq!(convert_bytes(a, "国".as_bytes(), b"s2t", false), None);
        assert_eq!(
            convert_bytes(b, "国".as_bytes(), b"s2t", false).as_deref(),
            Some("國".as_bytes())
        );
        instance_delete(b);
    }
}
