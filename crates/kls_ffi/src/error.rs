//! Error codes and result types.

use kls_core::StoreError;
use std::cell::RefCell;
use std::ffi::CString;

/// Result code for FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KlsResult {
    /// Operation succeeded.
    Ok = 0,
    /// Generic error.
    Error = 1,
    /// Null or otherwise unusable argument.
    InvalidArgument = 2,
    /// Key or value at or above the maximum entry size.
    SizeExceeded = 3,
    /// Allocation failed; the store is unchanged.
    OutOfMemory = 4,
    /// No entry for the key.
    KeyNotFound = 5,
    /// Index past the key's last value.
    IndexOutOfRange = 6,
    /// Output buffer shorter than the value.
    BufferTooSmall = 7,
    /// `kls_init` has not been called.
    NotInitialized = 8,
    /// `kls_init` was already called.
    AlreadyInitialized = 9,
    /// The configured key limit is reached.
    KeyLimitReached = 10,
}

impl KlsResult {
    /// Returns true if the result indicates success.
    pub fn is_ok(self) -> bool {
        self == KlsResult::Ok
    }

    /// Returns true if the result indicates an error.
    pub fn is_err(self) -> bool {
        self != KlsResult::Ok
    }
}

/// Error code type for C compatibility.
pub type ErrorCode = i32;

impl From<KlsResult> for ErrorCode {
    fn from(result: KlsResult) -> Self {
        result as ErrorCode
    }
}

impl From<ErrorCode> for KlsResult {
    fn from(code: ErrorCode) -> Self {
        match code {
            0 => KlsResult::Ok,
            1 => KlsResult::Error,
            2 => KlsResult::InvalidArgument,
            3 => KlsResult::SizeExceeded,
            4 => KlsResult::OutOfMemory,
            5 => KlsResult::KeyNotFound,
            6 => KlsResult::IndexOutOfRange,
            7 => KlsResult::BufferTooSmall,
            8 => KlsResult::NotInitialized,
            9 => KlsResult::AlreadyInitialized,
            10 => KlsResult::KeyLimitReached,
            _ => KlsResult::Error,
        }
    }
}

impl From<&StoreError> for KlsResult {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::InvalidArgument { .. } | StoreError::InvalidConfig { .. } => {
                KlsResult::InvalidArgument
            }
            StoreError::SizeExceeded { .. } => KlsResult::SizeExceeded,
            StoreError::OutOfMemory => KlsResult::OutOfMemory,
            StoreError::KeyNotFound => KlsResult::KeyNotFound,
            StoreError::IndexOutOfRange { .. } => KlsResult::IndexOutOfRange,
            StoreError::KeyLimitReached { .. } => KlsResult::KeyLimitReached,
        }
    }
}

// Thread-local storage for last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Sets the last error message.
pub fn set_last_error(message: impl Into<String>) {
    let msg = message.into();
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clears the last error.
pub fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Records `err` as the last error and returns its code.
///
/// Misses (unknown key, index past the end) are routine for callers and
/// are logged at debug level; everything else is a warning.
pub(crate) fn report(operation: &'static str, err: StoreError) -> KlsResult {
    let code = KlsResult::from(&err);
    match err {
        StoreError::KeyNotFound | StoreError::IndexOutOfRange { .. } => {
            tracing::debug!(operation, error = %err, "lookup miss");
        }
        _ => tracing::warn!(operation, error = %err, "operation failed"),
    }
    set_last_error(err.to_string());
    code
}

/// Records a boundary error that has no store counterpart.
pub(crate) fn fail(operation: &'static str, code: KlsResult, message: &str) -> KlsResult {
    tracing::warn!(operation, ?code, message, "operation rejected");
    set_last_error(message);
    code
}

/// Gets the last error message as a C string.
///
/// Returns null if no error is set.
///
/// # Safety
///
/// The returned pointer is valid until the next FFI call on this thread.
#[no_mangle]
pub extern "C" fn kls_get_last_error() -> *const std::ffi::c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => std::ptr::null(),
    })
}

/// Clears the last error message.
#[no_mangle]
pub extern "C" fn kls_clear_error() {
    clear_last_error();
}
