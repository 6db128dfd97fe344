//! C ABI over `opencc_engine::handle_registry`.
//!
//! Instances are `uint64_t` handles (`0` is never valid). Converted text is
//! returned as a heap C string that must be released with
//! `opencc_string_free`; on failure `NULL` is returned and the message is
//! available from `opencc_last_error` on the same thread.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use opencc_engine::error;
use opencc_engine::handle_registry::{self as registry, InstanceHandle};
use opencc_engine::OpenccConfig;

const OPENCC_ABI_NUMBER: u32 = 1;

/// C ABI version number. Changes only when the C ABI breaks.
#[no_mangle]
pub extern "C" fn opencc_abi_number() -> u32 {
    OPENCC_ABI_NUMBER
}

/// Library version (UTF-8, NUL-terminated, static lifetime).
#[no_mangle]
pub extern "C" fn opencc_version_string() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Creates an instance over the shared dictionary store. Returns `0` when the
/// store cannot be loaded.
#[no_mangle]
pub extern "C" fn opencc_new() -> InstanceHandle {
    registry::instance_new()
}

#[no_mangle]
pub extern "C" fn opencc_delete(instance: InstanceHandle) {
    registry::instance_delete(instance);
}

/// `false` for an invalid handle (last error set).
#[no_mangle]
pub extern "C" fn opencc_get_parallel(instance: InstanceHandle) -> bool {
    registry::get_parallel(instance).unwrap_or(false)
}

#[no_mangle]
pub extern "C" fn opencc_set_parallel(instance: InstanceHandle, is_parallel: bool) {
    registry::set_parallel(instance, is_parallel);
}

fn fail(msg: &str) -> *mut c_char {
    error::set_last_error(msg);
    ptr::null_mut()
}

/// Borrows a NUL-terminated C string as bytes.
///
/// # Safety
/// `p` must be null or point to a valid NUL-terminated string.
unsafe fn c_bytes<'a>(p: *const c_char) -> Option<&'a [u8]> {
    if p.is_null() {
        None
    } else {
        Some(CStr::from_ptr(p).to_bytes())
    }
}

fn into_c_string(bytes: Option<Vec<u8>>) -> *mut c_char {
    match bytes {
        Some(bytes) => match CString::new(bytes) {
            Ok(s) => s.into_raw(),
            Err(_) => fail("Output contains NUL byte"),
        },
        None => ptr::null_mut(),
    }
}

/// Converts `input` with the configuration named `config`.
///
/// # Safety
/// `input` and `config` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn opencc_convert(
    instance: InstanceHandle,
    input: *const c_char,
    config: *const c_char,
    punctuation: bool,
) -> *mut c_char {
    match (c_bytes(input), c_bytes(config)) {
        (Some(input), Some(config)) => {
            into_c_string(registry::convert_bytes(instance, input, config, punctuation))
        }
        _ => fail("Invalid argument: input/config is NULL"),
    }
}

/// Like `opencc_convert`, reading exactly `input_len` bytes of `input`.
///
/// # Safety
/// `input` must be valid for `input_len` bytes; `config` must be null or a
/// valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn opencc_convert_len(
    instance: InstanceHandle,
    input: *const c_char,
    input_len: usize,
    config: *const c_char,
    punctuation: bool,
) -> *mut c_char {
    if input.is_null() {
        return fail("Invalid argument: input is NULL");
    }
    let Some(config) = c_bytes(config) else {
        return fail("Invalid argument: config is NULL");
    };
    let input = std::slice::from_raw_parts(input as *const u8, input_len);
    into_c_string(registry::convert_bytes(instance, input, config, punctuation))
}

/// Converts `input` with the configuration whose numeric id is `config`.
///
/// # Safety
/// `input` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn opencc_convert_cfg(
    instance: InstanceHandle,
    input: *const c_char,
    config: u32,
    punctuation: bool,
) -> *mut c_char {
    match c_bytes(input) {
        Some(input) => into_c_string(registry::convert_cfg_bytes(
            instance,
            input,
            config,
            punctuation,
        )),
        None => fail("Invalid argument: input is NULL"),
    }
}

/// 0 none, 1 traditional, 2 simplified, 3 both, -1 on error.
///
/// # Safety
/// `input` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn opencc_zho_check(instance: InstanceHandle, input: *const c_char) -> i32 {
    match c_bytes(input) {
        Some(input) => registry::zho_check_bytes(instance, input),
        None => {
            error::set_last_error("Invalid argument: input is NULL");
            -1
        }
    }
}

/// Releases a string returned by a conversion function.
///
/// # Safety
/// `ptr` must be null or a pointer obtained from this library and not yet
/// freed.
#[no_mangle]
pub unsafe extern "C" fn opencc_string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// The calling thread's pending error as an owned string (free with
/// `opencc_error_free`), or `NULL` when none is pending.
#[no_mangle]
pub extern "C" fn opencc_last_error() -> *mut c_char {
    match registry::last_error() {
        Some(msg) => CString::new(msg.replace('\0', " "))
            .map(CString::into_raw)
            .unwrap_or(ptr::null_mut()),
        None => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn opencc_clear_last_error() {
    registry::clear_last_error();
}

/// # Safety
/// `ptr` must be null or a pointer returned by `opencc_last_error`.
#[no_mangle]
pub unsafe extern "C" fn opencc_error_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Writes the numeric id of configuration `name` (exact match) to `out_id`.
/// Returns `1` on success, `0` otherwise.
///
/// # Safety
/// `name` must be null or a valid NUL-terminated string; `out_id` must be
/// null or writable.
#[no_mangle]
pub unsafe extern "C" fn opencc_config_name_to_id(name: *const c_char, out_id: *mut u32) -> u8 {
    if out_id.is_null() {
        return 0;
    }
    let cfg = c_bytes(name)
        .and_then(|b| std::str::from_utf8(b).ok())
        .and_then(|s| OpenccConfig::try_from(s).ok());
    match cfg {
        Some(cfg) => {
            *out_id = cfg.to_ffi();
            1
        }
        None => 0,
    }
}

/// Static name of configuration `id`, or `NULL` for an unknown id.
#[no_mangle]
pub extern "C" fn opencc_config_id_to_name(id: u32) -> *const c_char {
    let name: &'static str = match OpenccConfig::from_ffi(id) {
        Some(OpenccConfig::S2t) => "s2t\0",
        Some(OpenccConfig::S2tw) => "s2tw\0",
        Some(OpenccConfig::S2twp) => "s2twp\0",
        Some(OpenccConfig::S2hk) => "s2hk\0",
        Some(OpenccConfig::T2s) => "t2s\0",
        Some(OpenccConfig::T2tw) => "t2tw\0",
        Some(OpenccConfig::T2twp) => "t2twp\0",
        Some(OpenccConfig::T2hk) => "t2hk\0",
        Some(OpenccConfig::Tw2s) => "tw2s\0",
        Some(OpenccConfig::Tw2sp) => "tw2sp\0",
        Some(OpenccConfig::Tw2t) => "tw2t\0",
        Some(OpenccConfig::Tw2tp) => "tw2tp\0",
        Some(OpenccConfig::Hk2s) => "hk2s\0",
        Some(OpenccConfig::Hk2t) => "hk2t\0",
        Some(OpenccConfig::Jp2t) => "jp2t\0",
        Some(OpenccConfig::T2jp) => "t2jp\0",
        None => return ptr::null(),
    };
    name.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take_string(ptr: *mut c_char) -> Option<String> {
        if ptr.is_null() {
            return None;
        }
        unsafe {
            let s = CStr::from_ptr(ptr).to_string_lossy().into_owned();
            opencc_string_free(ptr);
            Some(s)
        }
    }

    fn take_error() -> Option<String> {
        let ptr = opencc_last_error();
        if ptr.is_null() {
            return None;
        }
        unsafe {
            let s = CStr::from_ptr(ptr).to_string_lossy().into_owned();
            opencc_error_free(ptr);
            Some(s)
        }
    }

    #[test]
    fn convert_by_name() {
        let h = opencc_new();
        assert_ne!(h, 0);
        let input = CString::new("意大利罗浮宫里收藏的“蒙娜丽莎的微笑”画像是旷世之作。").unwrap();
        let config = CString::new("s2twp").unwrap();
        let out = unsafe { opencc_convert(h, input.as_ptr(), config.as_ptr(), true) };
        assert_eq!(
            take_string(out).as_deref(),
            Some("義大利羅浮宮裡收藏的「蒙娜麗莎的微笑」畫像是曠世之作。")
        );
        assert_eq!(take_error(), None);
        opencc_delete(h);
    }

    #[test]
    fn convert_by_id_and_len() {
        let h = opencc_new();
        let input = "龙马精神";
        let c_input = CString::new(input).unwrap();
        let out = unsafe { opencc_convert_cfg(h, c_input.as_ptr(), OpenccConfig::S2t.to_ffi(), false) };
        assert_eq!(take_string(out).as_deref(), Some("龍馬精神"));

        // Only the first two characters (6 bytes).
        let config = CString::new("s2t").unwrap();
        let out = unsafe { opencc_convert_len(h, c_input.as_ptr(), 6, config.as_ptr(), false) };
        assert_eq!(take_string(out).as_deref(), Some("龍馬"));
        opencc_delete(h);
    }

    #[test]
    fn invalid_config_returns_null_and_error() {
        let h = opencc_new();
        let input = CString::new("你好").unwrap();
        let config = CString::new("s2s").unwrap();
        let out = unsafe { opencc_convert(h, input.as_ptr(), config.as_ptr(), false) };
        assert!(out.is_null());
        assert_eq!(take_error().as_deref(), Some("Invalid config: s2s"));
        opencc_clear_last_error();
        assert_eq!(take_error(), None);
        opencc_delete(h);
    }

    #[test]
    fn deleted_handle_is_rejected() {
        let h = opencc_new();
        opencc_delete(h);
        let input = CString::new("你好").unwrap();
        let out = unsafe { opencc_convert_cfg(h, input.as_ptr(), 1, false) };
        assert!(out.is_null());
        assert!(take_error().unwrap().contains("NULL"));
        assert!(!opencc_get_parallel(h));
    }

    #[test]
    fn parallel_flag_round_trips() {
        let h = opencc_new();
        opencc_set_parallel(h, false);
        assert!(!opencc_get_parallel(h));
        opencc_set_parallel(h, true);
        assert!(opencc_get_parallel(h));
        opencc_delete(h);
    }

    #[test]
    fn zho_check_codes() {
        let h = opencc_new();
        let simplified = CString::new("简体字").unwrap();
        let traditional = CString::new("繁體字").unwrap();
        unsafe {
            assert_eq!(opencc_zho_check(h, simplified.as_ptr()), 2);
            assert_eq!(opencc_zho_check(h, traditional.as_ptr()), 1);
            assert_eq!(opencc_zho_check(h, ptr::null()), -1);
        }
        opencc_delete(h);
    }

    #[test]
    fn config_ids_and_names() {
        for cfg in OpenccConfig::ALL {
            let name = opencc_config_id_to_name(cfg.to_ffi());
            let name_str = unsafe { CStr::from_ptr(name) }.to_str().unwrap();
            assert_eq!(name_str, cfg.as_str());

            let mut id = 0u32;
            assert_eq!(unsafe { opencc_config_name_to_id(name, &mut id) }, 1);
            assert_eq!(id, cfg.to_ffi());
        }
        assert!(opencc_config_id_to_name(0).is_null());
    }

    #[test]
    fn abi_and_version() {
        assert_eq!(opencc_abi_number(), 1);
        let ver = unsafe { CStr::from_ptr(opencc_version_string()) };
        assert!(!ver.to_str().unwrap().is_empty());
    }
}
