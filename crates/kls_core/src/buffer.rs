//! Length-delimited byte buffers.
//!
//! Keys and values are arbitrary bytes and may contain zero. Nothing in
//! this crate relies on a terminator; every comparison and copy is driven
//! by an explicit length.

use crate::error::InsertError;
use bytes::Bytes;
use std::fmt;
use std::ops::Deref;

/// An owned, immutable byte string.
///
/// Cloning is cheap: the underlying buffer is reference counted, so a
/// value returned from a search shares storage with the table until the
/// key is deleted.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteString(Bytes);

impl ByteString {
    /// Copies `src` into a freshly allocated buffer.
    ///
    /// Allocation is fallible: an exhausted allocator yields
    /// [`InsertError::OutOfMemory`] instead of aborting the process.
    pub fn copy_from(src: &[u8]) -> Result<Self, InsertError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(src.len())?;
        buf.extend_from_slice(src);
        Ok(Self(Bytes::from(buf)))
    }

    /// Returns the bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the string holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the shared buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Copies the contents into an owned `Vec`.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl Deref for ByteString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for ByteString {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<ByteString> for Bytes {
    fn from(s: ByteString) -> Self {
        s.0
    }
}

impl PartialEq<[u8]> for ByteString {
    fn eq(&self, other: &[u8]) -> bool {
        equals(&self.0, other)
    }
}

impl PartialEq<&[u8]> for ByteString {
    fn eq(&self, other: &&[u8]) -> bool {
        equals(&self.0, other)
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for ByteString {
    fn eq(&self, other: &&[u8; N]) -> bool {
        equals(&self.0, &other[..])
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Length-then-content equality.
///
/// A zero byte is ordinary content, so `b"ab\0"` and `b"ab"` differ.
#[inline]
pub fn equals(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a == b
}

/// Copies exactly `src.len()` bytes into the front of `dst`.
///
/// Returns the number of bytes written, or `None` (leaving `dst`
/// untouched) when `dst` is shorter than `src`.
#[inline]
pub fn copy_into(src: &[u8], dst: &mut [u8]) -> Option<usize> {
    let target = dst.get_mut(..src.len())?;
    target.copy_from_slice(src);
    Some(src.len())
}
