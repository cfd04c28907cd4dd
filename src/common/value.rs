//! Fixed-size value record.

use std::fmt;

use crate::common::config::VALUE_SIZE;

/// Key type stored in the tree.
pub type Key = i32;

/// A 100-byte value record.
///
/// Values are opaque to the tree. The string helpers cover the common case of
/// storing short text: it is truncated or zero-padded to fit, and read back up
/// to the first NUL byte.
///
/// # Example
/// ```
/// use pagetree::Value;
///
/// let v = Value::from_str_padded("hello");
/// assert_eq!(v.to_string_lossy(), "hello");
/// assert_eq!(v.as_bytes().len(), 100);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Value([u8; VALUE_SIZE]);

impl Value {
    /// An all-zero value.
    pub const ZERO: Value = Value([0u8; VALUE_SIZE]);

    /// Wrap an exact 100-byte buffer.
    #[inline]
    pub fn new(bytes: [u8; VALUE_SIZE]) -> Self {
        Value(bytes)
    }

    /// Copy from a slice that must be exactly `VALUE_SIZE` bytes long.
    ///
    /// Returns `None` on any other length.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; VALUE_SIZE] = bytes.try_into().ok()?;
        Some(Value(arr))
    }

    /// Build a value from text, truncating past `VALUE_SIZE` bytes and
    /// zero-filling the remainder.
    pub fn from_str_padded(s: &str) -> Self {
        let mut data = [0u8; VALUE_SIZE];
        let len = s.len().min(VALUE_SIZE);
        data[..len].copy_from_slice(&s.as_bytes()[..len]);
        Value(data)
    }

    /// Interpret the value as text up to the first NUL byte.
    pub fn to_string_lossy(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(VALUE_SIZE);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; VALUE_SIZE] {
        &self.0
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[u8; VALUE_SIZE]> for Value {
    fn from(bytes: [u8; VALUE_SIZE]) -> Self {
        Value(bytes)
    }
}

impl AsRef<[u8]> for Value {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({:?})", self.to_string_lossy())
    }
}
