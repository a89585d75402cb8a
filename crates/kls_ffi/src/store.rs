//! Store entry points.
//!
//! The store is process-wide state: `kls_init` creates it and
//! `kls_shutdown` frees every key and value. Store operations take a shared
//! hold on the lifecycle lock, so shutdown waits for in-flight calls and
//! calls never observe a half torn-down table. Per-key synchronization
//! happens inside the store.
//!
//! Rejections that happen before a store is reached (null pointers,
//! `NotInitialized`) are not counted in `kls_stats`; every other failure,
//! including an oversize length, is counted as in the Rust API.

use crate::error::{clear_last_error, fail, report, KlsResult};
use crate::types::{KlsConfig, KlsStats};
use kls_core::{copy_into, EntryKind, Store};
use parking_lot::{const_rwlock, RwLock};
use tracing::debug;

static STORE: RwLock<Option<Store>> = const_rwlock(None);

/// Runs `f` against the live store, or reports `NotInitialized`.
fn with_store(operation: &'static str, f: impl FnOnce(&Store) -> KlsResult) -> KlsResult {
    let guard = STORE.read();
    match guard.as_ref() {
        Some(store) => f(store),
        None => fail(operation, KlsResult::NotInitialized, "store not initialized"),
    }
}

/// Initializes the process-wide store.
///
/// # Arguments
///
/// * `config` - Store configuration, or null for defaults
///
/// # Returns
///
/// `KlsResult::Ok` on success, `KlsResult::AlreadyInitialized` if the store
/// exists, `KlsResult::InvalidArgument` for an unusable configuration.
///
/// # Safety
///
/// `config` must be null or point to a valid `KlsConfig` whose `hash`
/// field holds one of the declared discriminants.
#[no_mangle]
pub unsafe extern "C" fn kls_init(config: *const KlsConfig) -> KlsResult {
    clear_last_error();

    let config = if config.is_null() {
        KlsConfig::default()
    } else {
        *config
    }
    .to_config();

    let mut guard = STORE.write();
    if guard.is_some() {
        return fail("init", KlsResult::AlreadyInitialized, "store already initialized");
    }

    match Store::new(config) {
        Ok(store) => {
            *guard = Some(store);
            debug!("store initialized");
            KlsResult::Ok
        }
        Err(e) => report("init", e),
    }
}

/// Frees every key and value and tears the store down.
///
/// Waits for in-flight operations to finish.
///
/// # Returns
///
/// `KlsResult::Ok` on success, `KlsResult::NotInitialized` if there is no
/// store.
#[no_mangle]
pub extern "C" fn kls_shutdown() -> KlsResult {
    clear_last_error();

    let Some(store) = STORE.write().take() else {
        return fail("shutdown", KlsResult::NotInitialized, "store not initialized");
    };
    let released = store.clear();
    debug!(keys = released, "store shut down");
    KlsResult::Ok
}

/// Appends a value to a key, creating the key if needed.
///
/// # Arguments
///
/// * `key` - Pointer to key bytes
/// * `key_len` - Length of the key
/// * `value` - Pointer to value bytes
/// * `value_len` - Length of the value
///
/// # Returns
///
/// `KlsResult::Ok` on success, error code otherwise. On error the store is
/// unchanged.
///
/// # Safety
///
/// - `key` must be valid for `key_len` bytes
/// - `value` must be valid for `value_len` bytes
#[no_mangle]
pub unsafe extern "C" fn kls_insert(
    key: *const u8,
    key_len: usize,
    value: *const u8,
    value_len: usize,
) -> KlsResult {
    clear_last_error();

    if key.is_null() {
        return fail("insert", KlsResult::InvalidArgument, "null key pointer");
    }
    if value.is_null() {
        return fail("insert", KlsResult::InvalidArgument, "null value pointer");
    }

    with_store("insert", |store| {
        // Lengths are checked before the raw buffers become slices.
        let checked = store
            .check_len(EntryKind::Key, key_len)
            .and_then(|()| store.check_len(EntryKind::Value, value_len));
        if let Err(e) = checked {
            return report("insert", e);
        }

        let key = std::slice::from_raw_parts(key, key_len);
        let value = std::slice::from_raw_parts(value, value_len);
        match store.insert(key, value) {
            Ok(()) => KlsResult::Ok,
            Err(e) => report("insert", e),
        }
    })
}

/// Copies the value at `index` under a key into a caller buffer.
///
/// # Arguments
///
/// * `key` - Pointer to key bytes
/// * `key_len` - Length of the key
/// * `out_value` - Buffer receiving the value bytes (not terminated)
/// * `out_capacity` - Capacity of `out_value` in bytes
/// * `index` - 0-based position of the value
/// * `out_len` - Receives the value length
///
/// # Returns
///
/// `KlsResult::Ok` on success (`out_value` filled, `*out_len` set)
/// `KlsResult::KeyNotFound` if the key doesn't exist
/// `KlsResult::IndexOutOfRange` if the key holds `index` or fewer values
/// `KlsResult::BufferTooSmall` if `out_capacity` is too short; `*out_len`
/// then holds the required length and `out_value` is untouched
/// Error code otherwise.
///
/// # Safety
///
/// - `key` must be valid for `key_len` bytes
/// - `out_value` must be valid for writes of `out_capacity` bytes
/// - `out_len` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn kls_search(
    key: *const u8,
    key_len: usize,
    out_value: *mut u8,
    out_capacity: usize,
    index: usize,
    out_len: *mut usize,
) -> KlsResult {
    clear_last_error();

    if key.is_null() {
        return fail("search", KlsResult::InvalidArgument, "null key pointer");
    }
    if out_value.is_null() || out_len.is_null() {
        return fail("search", KlsResult::InvalidArgument, "null output pointer");
    }

    with_store("search", |store| {
        if let Err(e) = store.check_len(EntryKind::Key, key_len) {
            return report("search", e);
        }

        let key = std::slice::from_raw_parts(key, key_len);
        let value = match store.search(key, index) {
            Ok(value) => value,
            Err(e) => return report("search", e),
        };

        *out_len = value.len();
        let out = std::slice::from_raw_parts_mut(out_value, out_capacity);
        match copy_into(&value, out) {
            Some(_) => KlsResult::Ok,
            None => fail(
                "search",
                KlsResult::BufferTooSmall,
                "output buffer smaller than value",
            ),
        }
    })
}

/// Removes a key and all of its values.
///
/// # Arguments
///
/// * `key` - Pointer to key bytes
/// * `key_len` - Length of the key
///
/// # Returns
///
/// `KlsResult::Ok` on success, `KlsResult::KeyNotFound` if the key doesn't
/// exist, error code otherwise.
///
/// # Safety
///
/// `key` must be valid for `key_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn kls_delete(key: *const u8, key_len: usize) -> KlsResult {
    clear_last_error();

    if key.is_null() {
        return fail("delete", KlsResult::InvalidArgument, "null key pointer");
    }

    with_store("delete", |store| {
        if let Err(e) = store.check_len(EntryKind::Key, key_len) {
            return report("delete", e);
        }

        let key = std::slice::from_raw_parts(key, key_len);
        match store.delete(key) {
            Ok(()) => KlsResult::Ok,
            Err(e) => report("delete", e),
        }
    })
}

/// Copies the current statistics into `out_stats`.
///
/// # Safety
///
/// `out_stats` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn kls_stats(out_stats: *mut KlsStats) -> KlsResult {
    clear_last_error();

    if out_stats.is_null() {
        return fail("stats", KlsResult::InvalidArgument, "null output pointer");
    }

    with_store("stats", |store| {
        *out_stats = KlsStats::from(store.stats());
        KlsResult::Ok
    })
}

/// Returns the library version as a null-terminated string.
///
/// The returned pointer is static and should not be freed.
#[no_mangle]
pub extern "C" fn kls_version() -> *const std::ffi::c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr().cast()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kls_get_last_error;
    use crate::types::KlsHash;
    use parking_lot::{const_mutex, Mutex};
    use std::ffi::CStr;
    use std::sync::Arc;
    use std::thread;

    // The store is process-wide; tests touching it must not overlap.
    static SERIAL: Mutex<()> = const_mutex(());

    fn with_fresh_store(config: Option<KlsConfig>, f: impl FnOnce()) {
        let _serial = SERIAL.lock();
        let _ = kls_shutdown();
        let result = match config {
            Some(config) => unsafe { kls_init(&config) },
            None => unsafe { kls_init(std::ptr::null()) },
        };
        assert_eq!(result, KlsResult::Ok);
        f();
        assert_eq!(kls_shutdown(), KlsResult::Ok);
    }

    fn insert(key: &[u8], value: &[u8]) -> KlsResult {
        unsafe { kls_insert(key.as_ptr(), key.len(), value.as_ptr(), value.len()) }
    }

    fn search(key: &[u8], index: usize) -> Result<Vec<u8>, KlsResult> {
        let mut buf = [0u8; 256];
        let mut len = 0usize;
        let result = unsafe {
            kls_search(
                key.as_ptr(),
                key.len(),
                buf.as_mut_ptr(),
                buf.len(),
                index,
                &mut len,
            )
        };
        match result {
            KlsResult::Ok => Ok(buf[..len].to_vec()),
            err => Err(err),
        }
    }

    fn delete(key: &[u8]) -> KlsResult {
        unsafe { kls_delete(key.as_ptr(), key.len()) }
    }

    #[test]
    fn end_to_end_user_scenario() {
        with_fresh_store(None, || {
            assert_eq!(insert(b"user", b"alice"), KlsResult::Ok);
            assert_eq!(insert(b"user", b"bob"), KlsResult::Ok);
            assert_eq!(search(b"user", 0), Ok(b"alice".to_vec()));
            assert_eq!(search(b"user", 1), Ok(b"bob".to_vec()));
            assert_eq!(search(b"user", 2), Err(KlsResult::IndexOutOfRange));
            assert_eq!(delete(b"user"), KlsResult::Ok);
            assert_eq!(search(b"user", 0), Err(KlsResult::KeyNotFound));
        });
    }

    #[test]
    fn null_pointers_rejected() {
        with_fresh_store(None, || unsafe {
            let v = b"v";
            assert_eq!(
                kls_insert(std::ptr::null(), 1, v.as_ptr(), 1),
                KlsResult::InvalidArgument
            );
            assert_eq!(
                kls_insert(v.as_ptr(), 1, std::ptr::null(), 1),
                KlsResult::InvalidArgument
            );

            let mut len = 0usize;
            let mut buf = [0u8; 4];
            assert_eq!(
                kls_search(std::ptr::null(), 1, buf.as_mut_ptr(), 4, 0, &mut len),
                KlsResult::InvalidArgument
            );
            assert_eq!(
                kls_search(v.as_ptr(), 1, std::ptr::null_mut(), 4, 0, &mut len),
                KlsResult::InvalidArgument
            );
            assert_eq!(
                kls_search(v.as_ptr(), 1, buf.as_mut_ptr(), 4, 0, std::ptr::null_mut()),
                KlsResult::InvalidArgument
            );
            assert_eq!(kls_delete(std::ptr::null(), 0), KlsResult::InvalidArgument);
            assert_eq!(kls_stats(std::ptr::null_mut()), KlsResult::InvalidArgument);

            let msg = CStr::from_ptr(kls_get_last_error());
            assert_eq!(msg.to_str().unwrap(), "null output pointer");
        });
    }

    #[test]
    fn key_size_boundary() {
        with_fresh_store(None, || {
            let at_limit = [b'k'; 256];
            let below = [b'k'; 255];

            assert_eq!(insert(&at_limit, b"v"), KlsResult::SizeExceeded);
            assert_eq!(search(&at_limit, 0), Err(KlsResult::SizeExceeded));
            assert_eq!(delete(&at_limit), KlsResult::SizeExceeded);

            assert_eq!(insert(&below, b"v"), KlsResult::Ok);
            assert_eq!(search(&below, 0), Ok(b"v".to_vec()));
        });
    }

    #[test]
    fn oversize_value_is_size_error() {
        with_fresh_store(None, || {
            let big = [0u8; 256];
            assert_eq!(insert(b"k", &big), KlsResult::SizeExceeded);
            assert_eq!(search(b"k", 0), Err(KlsResult::KeyNotFound));
            assert_eq!(insert(b"k", &big[..255]), KlsResult::Ok);
            assert_eq!(search(b"k", 0).unwrap().len(), 255);
        });
    }

    #[test]
    fn delete_missing_twice() {
        with_fresh_store(None, || {
            assert_eq!(delete(b"ghost"), KlsResult::KeyNotFound);
            assert_eq!(delete(b"ghost"), KlsResult::KeyNotFound);
        });
    }

    #[test]
    fn buffer_too_small_reports_length() {
        with_fresh_store(None, || unsafe {
            assert_eq!(insert(b"k", b"hello world"), KlsResult::Ok);

            let mut buf = [0xAAu8; 4];
            let mut len = 0usize;
            let result = kls_search(b"k".as_ptr(), 1, buf.as_mut_ptr(), buf.len(), 0, &mut len);
            assert_eq!(result, KlsResult::BufferTooSmall);
            assert_eq!(len, 11);
            assert_eq!(buf, [0xAA; 4]);
        });
    }

    #[test]
    fn zero_bytes_round_trip() {
        with_fresh_store(None, || {
            assert_eq!(insert(b"a\0b", b"\0x\0"), KlsResult::Ok);
            assert_eq!(search(b"a\0b", 0), Ok(b"\0x\0".to_vec()));
            assert_eq!(search(b"a", 0), Err(KlsResult::KeyNotFound));
        });
    }

    #[test]
    fn lifecycle() {
        let _serial = SERIAL.lock();
        let _ = kls_shutdown();

        assert_eq!(insert(b"k", b"v"), KlsResult::NotInitialized);
        assert_eq!(kls_shutdown(), KlsResult::NotInitialized);

        unsafe {
            assert_eq!(kls_init(std::ptr::null()), KlsResult::Ok);
            assert_eq!(kls_init(std::ptr::null()), KlsResult::AlreadyInitialized);
        }
        assert_eq!(insert(b"k", b"v"), KlsResult::Ok);
        assert_eq!(kls_shutdown(), KlsResult::Ok);

        // State does not outlive shutdown.
        unsafe {
            assert_eq!(kls_init(std::ptr::null()), KlsResult::Ok);
        }
        assert_eq!(search(b"k", 0), Err(KlsResult::KeyNotFound));
        assert_eq!(kls_shutdown(), KlsResult::Ok);
    }

    #[test]
    fn custom_config() {
        let config = KlsConfig {
            max_entry_size: 8,
            bucket_count: 3,
            hash: KlsHash::Xxh3,
            max_keys: 1,
        };
        with_fresh_store(Some(config), || {
            assert_eq!(insert(b"1234567", b"v"), KlsResult::Ok);
            assert_eq!(insert(b"12345678", b"v"), KlsResult::SizeExceeded);
            assert_eq!(insert(b"other", b"v"), KlsResult::KeyLimitReached);
            assert_eq!(insert(b"1234567", b"w"), KlsResult::Ok);
        });
    }

    #[test]
    fn stats_snapshot() {
        with_fresh_store(None, || unsafe {
            insert(b"k", b"abc");
            insert(b"k", b"de");
            let _ = search(b"k", 0);
            let _ = search(b"missing", 0);

            let mut stats = KlsStats::default();
            assert_eq!(kls_stats(&mut stats), KlsResult::Ok);
            assert_eq!(stats.inserts, 2);
            assert_eq!(stats.bytes_written, 5);
            assert_eq!(stats.searches, 1);
            assert_eq!(stats.live_keys, 1);
            assert_eq!(stats.errors, 1);
        });
    }

    #[test]
    fn size_rejections_counted_like_rust_api() {
        let oversize = [b'k'; 256];
        let direct = Store::default();
        let _ = direct.insert(&oversize, b"v");
        let _ = direct.insert(b"k", &oversize);
        let _ = direct.search(&oversize, 0);
        let _ = direct.delete(&oversize);

        with_fresh_store(None, || unsafe {
            assert_eq!(insert(&oversize, b"v"), KlsResult::SizeExceeded);
            assert_eq!(insert(b"k", &oversize), KlsResult::SizeExceeded);
            assert_eq!(search(&oversize, 0), Err(KlsResult::SizeExceeded));
            assert_eq!(delete(&oversize), KlsResult::SizeExceeded);
            // Rejected before the store is reached, so not counted.
            assert_eq!(
                kls_insert(std::ptr::null(), 1, b"v".as_ptr(), 1),
                KlsResult::InvalidArgument
            );

            let mut stats = KlsStats::default();
            assert_eq!(kls_stats(&mut stats), KlsResult::Ok);
            assert_eq!(stats.errors, direct.stats().errors);
            assert_eq!(stats.errors, 4);
        });
    }

    #[test]
    fn concurrent_inserts_same_key() {
        with_fresh_store(None, || {
            let threads = 8;
            let per_thread = 50;
            let barrier = Arc::new(std::sync::Barrier::new(threads));

            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        for i in 0..per_thread {
                            let value = format!("{t}-{i}");
                            assert_eq!(insert(b"shared", value.as_bytes()), KlsResult::Ok);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let mut values = std::collections::HashSet::new();
            for index in 0..threads * per_thread {
                let value = search(b"shared", index).unwrap();
                assert!(values.insert(value));
            }
            assert_eq!(
                search(b"shared", threads * per_thread),
                Err(KlsResult::IndexOutOfRange)
            );
        });
    }

    #[test]
    fn version() {
        let ver = kls_version();
        assert!(!ver.is_null());

        let s = unsafe { CStr::from_ptr(ver) };
        assert_eq!(s.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
