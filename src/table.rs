//! Table: byte-string keys in bucketed chains over an element arena.
//!
//! Every element sits in bucket `hashcode % num_buckets` for the current
//! bucket count, and the element count always equals the sum of the chain
//! lengths. Growth is collision-gated: `put` only considers resizing when the
//! new key lands in a bucket that already has a chain.

use crate::alloc::{self, Global};
use crate::element::{Arena, Element, ElementId, Link};
use crate::error::{InsertError, TableError};
use crate::hash::{KeyHasher, Kr2Hasher};
use crate::keys::{Key, KeyBytes, KeyMode, Keys, SnapshotKey};
use allocator_api2::alloc::Allocator;
use allocator_api2::vec::Vec;
use core::iter::FusedIterator;
use core::ops::ControlFlow;

/// Bucket count used when a constructor is given zero.
pub const DEFAULT_BUCKETS: usize = 64;

/// Split when we collide and the load is over two thirds.
pub const DEFAULT_LOAD_FACTOR: f64 = 2.0 / 3.0;

pub struct Table<V, H = Kr2Hasher, A: Allocator + Clone = Global> {
    buckets: Vec<Link, A>,
    elements: Arena<V, A>,
    hasher: H,
    alloc: A,
    load_factor: f64,
}

impl<V> Table<V> {
    pub fn new() -> Self {
        Self::with_buckets(0)
    }

    pub fn with_buckets(num_buckets: usize) -> Self {
        Self::with_hasher(num_buckets, Kr2Hasher)
    }
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, H: KeyHasher> Table<V, H> {
    pub fn with_hasher(num_buckets: usize, hasher: H) -> Self {
        Self::try_with_hasher_in(num_buckets, hasher, Global).unwrap_or_else(|err| err.abort())
    }
}

impl<V, A: Allocator + Clone> Table<V, Kr2Hasher, A> {
    pub fn try_new_in(num_buckets: usize, alloc: A) -> Result<Self, TableError> {
        Self::try_with_hasher_in(num_buckets, Kr2Hasher, alloc)
    }
}

impl<V, H, A> Table<V, H, A>
where
    H: KeyHasher,
    A: Allocator + Clone,
{
    /// Build a table whose buckets, elements, key copies and snapshots are
    /// all acquired from `alloc`. `num_buckets == 0` picks
    /// [`DEFAULT_BUCKETS`].
    pub fn try_with_hasher_in(num_buckets: usize, hasher: H, alloc: A) -> Result<Self, TableError> {
        let num_buckets = if num_buckets == 0 {
            DEFAULT_BUCKETS
        } else {
            num_buckets
        };
        let buckets = empty_buckets(num_buckets, alloc.clone())?;
        Ok(Self {
            buckets,
            elements: Arena::new_in(alloc.clone()),
            hasher,
            alloc,
            load_factor: DEFAULT_LOAD_FACTOR,
        })
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    #[inline]
    fn bucket_for_hashcode(&self, hashcode: u32) -> usize {
        hashcode as usize % self.buckets.len()
    }

    fn find(&self, key: &[u8], hashcode: u32) -> Option<ElementId> {
        let mut link = self.buckets[self.bucket_for_hashcode(hashcode)];
        while let Some(id) = link {
            let element = self.elements.get(id);
            if element.key_bytes() == key {
                return Some(id);
            }
            link = element.next;
        }
        None
    }

    /// Number of elements. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let id = self.find(key, self.hasher.hashcode(key))?;
        Some(&self.elements.get(id).value)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let id = self.find(key, self.hasher.hashcode(key))?;
        Some(&mut self.elements.get_mut(id).value)
    }

    pub fn has_key(&self, key: &[u8]) -> bool {
        self.find(key, self.hasher.hashcode(key)).is_some()
    }

    /// Bucket that `key` hashes to under the current bucket count.
    pub fn bucket_for_key(&self, key: &[u8]) -> usize {
        self.bucket_for_hashcode(self.hasher.hashcode(key))
    }

    /// Map `key` to `value`.
    ///
    /// An existing key keeps its storage and gets the new value; the old one
    /// is returned. A new key is copied (with a trailing NUL) and prepended
    /// to its chain. If any allocation fails the table is left exactly as it
    /// was and the value comes back in the error.
    pub fn put(&mut self, key: &[u8], value: V) -> Result<Option<V>, InsertError<V>> {
        let hashcode = self.hasher.hashcode(key);
        if let Some(id) = self.find(key, hashcode) {
            let old = core::mem::replace(&mut self.elements.get_mut(id).value, value);
            return Ok(Some(old));
        }

        // Acquire everything the new element needs before touching the
        // chains, so a refusal leaves nothing half done.
        let key_copy = match alloc::copy_key(key, self.alloc.clone()) {
            Ok(copy) => copy,
            Err(source) => return Err(InsertError { value, source }),
        };
        if let Err(source) = self.elements.reserve_one() {
            return Err(InsertError { value, source });
        }

        let collision = self.buckets[self.bucket_for_hashcode(hashcode)].is_some();
        if collision && self.load_factor > 0.0 {
            let threshold = self.buckets.len() as f64 * self.load_factor;
            if self.len() as f64 >= threshold {
                if let Err(err) = self.try_resize(0) {
                    tracing::debug!(error = %err, "automatic resize failed, keeping current buckets");
                }
            }
        }

        let bucket = self.bucket_for_hashcode(hashcode);
        let element = Element::new(key_copy, hashcode, value, self.buckets[bucket]);
        let id = self.elements.insert(element);
        self.buckets[bucket] = Some(id);
        Ok(None)
    }

    /// Remove `key`, releasing its key copy, and return its value.
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        let bucket = self.bucket_for_hashcode(self.hasher.hashcode(key));
        let mut prev: Link = None;
        let mut link = self.buckets[bucket];
        while let Some(id) = link {
            let element = self.elements.get(id);
            let next = element.next;
            if element.key_bytes() == key {
                match prev {
                    None => self.buckets[bucket] = next,
                    Some(p) => self.elements.get_mut(p).next = next,
                }
                return Some(self.elements.remove(id).into_value());
            }
            prev = link;
            link = next;
        }
        None
    }

    /// Drop every element. The bucket count is kept.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|head| *head = None);
        self.elements.clear();
    }

    #[inline]
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Length of every chain, in bucket order.
    pub fn chain_lengths(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.buckets.iter().map(move |&head| {
            let mut len = 0;
            let mut link = head;
            while let Some(id) = link {
                len += 1;
                link = self.elements.get(id).next;
            }
            len
        })
    }

    /// Write the chain length of each bucket into `sizes`, stopping at
    /// whichever runs out first. Returns the number of entries written.
    pub fn report(&self, sizes: &mut [usize]) -> usize {
        let mut written = 0;
        for (slot, len) in sizes.iter_mut().zip(self.chain_lengths()) {
            *slot = len;
            written += 1;
        }
        written
    }

    pub fn auto_resize_load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Load factor checked by `put` when it collides. A value `<= 0.0`
    /// turns automatic growth off; `resize` still works.
    pub fn set_auto_resize_load_factor(&mut self, factor: f64) {
        self.load_factor = factor;
    }

    /// Rehash into `num_buckets` buckets (zero doubles the current count).
    ///
    /// Returns the bucket count in effect afterwards, which is the previous
    /// one if the new bucket array could not be allocated.
    ///
    /// # Panics
    ///
    /// If `num_buckets` is one.
    pub fn resize(&mut self, num_buckets: usize) -> usize {
        self.try_resize(num_buckets)
            .unwrap_or_else(|_| self.num_buckets())
    }

    /// Like [`resize`](Self::resize) but reports why the table was left
    /// unchanged.
    ///
    /// Elements are relinked, never reallocated or rehashed: each lands at
    /// `hashcode % num_buckets` at the head of its new chain, so elements
    /// that share a bucket before and after come out in reverse order.
    pub fn try_resize(&mut self, num_buckets: usize) -> Result<usize, TableError> {
        let num_buckets = if num_buckets == 0 {
            self.buckets.len().saturating_mul(2)
        } else {
            num_buckets
        };
        assert!(
            num_buckets > 1,
            "bucket count must be greater than one, got {num_buckets}"
        );

        let mut fresh = empty_buckets(num_buckets, self.alloc.clone())?;
        for head in self.buckets.iter_mut() {
            let mut link = head.take();
            while let Some(id) = link {
                let element = self.elements.get_mut(id);
                link = element.next;
                let bucket = element.hashcode as usize % num_buckets;
                element.next = fresh[bucket];
                fresh[bucket] = Some(id);
            }
        }
        let old = core::mem::replace(&mut self.buckets, fresh);
        tracing::debug!(
            from = old.len(),
            to = num_buckets,
            len = self.len(),
            "resized buckets"
        );
        Ok(num_buckets)
    }

    /// Elements in bucket order, most recently chained first within a bucket.
    pub fn iter(&self) -> Iter<'_, V, A> {
        Iter {
            buckets: self.buckets.iter(),
            elements: &self.elements,
            link: None,
            remaining: self.len(),
        }
    }

    /// Visit every element in [`iter`](Self::iter) order until `f` breaks;
    /// the break value is returned as is.
    pub fn for_each<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(Key<'_>, &V) -> ControlFlow<B>,
    {
        self.iter().try_for_each(|(key, value)| f(key, value))
    }

    /// Snapshot the current keys in iteration order.
    ///
    /// [`KeyMode::Borrowed`] entries alias the elements' key storage and keep
    /// the table borrowed. [`KeyMode::Copied`] duplicates each key through
    /// the table's allocator; use [`copied_keys`](Self::copied_keys) to get a
    /// snapshot that outlives the borrow.
    pub fn keys(&self, mode: KeyMode) -> Result<Keys<'_, A>, TableError> {
        match mode {
            KeyMode::Borrowed => {
                self.collect_keys(mode, |key| Ok(KeyBytes::Borrowed(key.bytes_with_nul())))
            }
            KeyMode::Copied => self.collect_keys(mode, |key| self.copy_key(key)),
        }
    }

    pub fn copied_keys(&self) -> Result<Keys<'static, A>, TableError> {
        self.collect_keys(KeyMode::Copied, |key| self.copy_key(key))
    }

    fn copy_key(&self, key: Key<'_>) -> Result<KeyBytes<'static, A>, TableError> {
        alloc::copy_key(key.bytes(), self.alloc.clone()).map(KeyBytes::Copied)
    }

    /// Release a snapshot. Same as dropping it.
    pub fn free_keys(&self, keys: Keys<'_, A>) {
        drop(keys);
    }

    fn collect_keys<'a, 'k, F>(&'a self, mode: KeyMode, mut bytes_of: F) -> Result<Keys<'k, A>, TableError>
    where
        F: FnMut(Key<'a>) -> Result<KeyBytes<'k, A>, TableError>,
    {
        let mut entries = alloc::try_vec(self.len(), self.alloc.clone(), "key list")?;
        for (key, _) in self.iter() {
            entries.push(SnapshotKey {
                bytes: bytes_of(key)?,
                hashcode: key.hashcode(),
            });
        }
        debug_assert_eq!(entries.len(), self.len());
        Ok(Keys { entries, mode })
    }

    /// Check every structural invariant; panics on the first violation.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut seen = std::collections::HashSet::new();
        let mut chained = 0;
        for (bucket, &head) in self.buckets.iter().enumerate() {
            let mut link = head;
            while let Some(id) = link {
                let element = self.elements.get(id);
                assert_eq!(
                    element.hashcode as usize % self.buckets.len(),
                    bucket,
                    "element in the wrong bucket"
                );
                assert_eq!(element.hashcode, self.hasher.hashcode(element.key_bytes()));
                assert!(seen.insert(element.key_bytes().to_vec()), "duplicate key");
                chained += 1;
                link = element.next;
            }
        }
        assert_eq!(chained, self.len(), "len differs from chain total");
        assert_eq!(self.elements.occupied().count(), self.len());
    }
}

fn empty_buckets<A: Allocator>(num_buckets: usize, alloc: A) -> Result<Vec<Link, A>, TableError> {
    let mut buckets = alloc::try_vec(num_buckets, alloc, "buckets")?;
    buckets.resize(num_buckets, None);
    Ok(buckets)
}

/// Iterator over `(key, value)` pairs of a [`Table`].
pub struct Iter<'a, V, A: Allocator + Clone> {
    buckets: core::slice::Iter<'a, Link>,
    elements: &'a Arena<V, A>,
    link: Link,
    remaining: usize,
}

impl<'a, V, A: Allocator + Clone> Iterator for Iter<'a, V, A> {
    type Item = (Key<'a>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.link {
                let element = self.elements.get(id);
                self.link = element.next;
                self.remaining -= 1;
                return Some((element.key(), &element.value));
            }
            self.link = *self.buckets.next()?;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V, A: Allocator + Clone> ExactSizeIterator for Iter<'_, V, A> {}

impl<V, A: Allocator + Clone> FusedIterator for Iter<'_, V, A> {}

impl<'a, V, H, A> IntoIterator for &'a Table<V, H, A>
where
    H: KeyHasher,
    A: Allocator + Clone,
{
    type Item = (Key<'a>, &'a V);
    type IntoIter = Iter<'a, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
