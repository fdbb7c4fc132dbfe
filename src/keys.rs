//! Key views and key snapshots.

use allocator_api2::alloc::Allocator;
use allocator_api2::vec::Vec;
use core::ffi::CStr;
use core::fmt;

/// A borrowed key: bytes, explicit length and the stored hashcode.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Key<'a> {
    // Key bytes plus the trailing NUL.
    with_nul: &'a [u8],
    hashcode: u32,
}

impl<'a> Key<'a> {
    pub(crate) fn new(with_nul: &'a [u8], hashcode: u32) -> Self {
        debug_assert_eq!(with_nul.last(), Some(&0));
        Self { with_nul, hashcode }
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        &self.with_nul[..self.with_nul.len() - 1]
    }

    /// The key followed by the NUL the table appends to every copy.
    #[inline]
    pub fn bytes_with_nul(&self) -> &'a [u8] {
        self.with_nul
    }

    /// The key as a C string; `None` when the key has an embedded NUL.
    pub fn to_cstr(&self) -> Option<&'a CStr> {
        CStr::from_bytes_with_nul(self.with_nul).ok()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.with_nul.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn hashcode(&self) -> u32 {
        self.hashcode
    }
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.bytes().escape_ascii())
    }
}

/// Whether a snapshot aliases element storage or owns copies of the keys.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyMode {
    /// Entries point into the table; the snapshot borrows it.
    Borrowed,
    /// Entries are duplicated through the table's allocator.
    Copied,
}

pub(crate) enum KeyBytes<'t, A: Allocator> {
    Borrowed(&'t [u8]),
    Copied(Vec<u8, A>),
}

pub(crate) struct SnapshotKey<'t, A: Allocator> {
    pub(crate) bytes: KeyBytes<'t, A>,
    pub(crate) hashcode: u32,
}

impl<'t, A: Allocator> SnapshotKey<'t, A> {
    fn key(&self) -> Key<'_> {
        let with_nul = match &self.bytes {
            KeyBytes::Borrowed(b) => *b,
            KeyBytes::Copied(v) => &v[..],
        };
        Key::new(with_nul, self.hashcode)
    }
}

/// The keys of a table captured by one enumeration, in iteration order.
///
/// Dropping a snapshot releases its descriptor buffer and, in
/// [`KeyMode::Copied`], every key copy, through the allocator that made
/// them.
pub struct Keys<'t, A: Allocator> {
    pub(crate) entries: Vec<SnapshotKey<'t, A>, A>,
    pub(crate) mode: KeyMode,
}

impl<'t, A: Allocator> Keys<'t, A> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    pub fn get(&self, index: usize) -> Option<Key<'_>> {
        self.entries.get(index).map(SnapshotKey::key)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Key<'_>> + '_ {
        self.entries.iter().map(SnapshotKey::key)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.iter().any(|k| k.bytes() == key)
    }
}

impl<A: Allocator> fmt::Debug for Keys<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
