//! Elements and the arena that owns them.
//!
//! Elements are stored in slots of one arena buffer and chained through
//! `ElementId`s instead of owned pointers. Vacant slots form a free list so
//! a removal followed by an insertion reuses storage without touching the
//! allocator. Resize only rewrites `next` links; it never moves an element
//! between slots.

use crate::alloc;
use crate::error::TableError;
use crate::keys::Key;
use allocator_api2::alloc::Allocator;
use allocator_api2::vec::Vec;

/// Index of an element's slot in the arena.
pub(crate) type ElementId = usize;

/// Head of a chain, or the link to the next element in one.
pub(crate) type Link = Option<ElementId>;

pub(crate) struct Element<V, A: Allocator> {
    /// Key bytes followed by a NUL.
    key: Vec<u8, A>,
    pub(crate) hashcode: u32,
    pub(crate) value: V,
    pub(crate) next: Link,
}

impl<V, A: Allocator> Element<V, A> {
    pub(crate) fn new(key: Vec<u8, A>, hashcode: u32, value: V, next: Link) -> Self {
        debug_assert_eq!(key.last(), Some(&0), "key copy must be NUL-terminated");
        Self {
            key,
            hashcode,
            value,
            next,
        }
    }

    #[inline]
    pub(crate) fn key_bytes(&self) -> &[u8] {
        &self.key[..self.key.len() - 1]
    }

    #[inline]
    pub(crate) fn key(&self) -> Key<'_> {
        Key::new(&self.key, self.hashcode)
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }
}

enum Slot<V, A: Allocator> {
    Occupied(Element<V, A>),
    Vacant { next_free: Option<ElementId> },
}

pub(crate) struct Arena<V, A: Allocator + Clone> {
    slots: Vec<Slot<V, A>, A>,
    free: Option<ElementId>,
    len: usize,
}

impl<V, A: Allocator + Clone> Arena<V, A> {
    pub(crate) fn new_in(alloc: A) -> Self {
        Self {
            slots: Vec::new_in(alloc),
            free: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Make sure the next `insert` needs no allocation.
    pub(crate) fn reserve_one(&mut self) -> Result<(), TableError> {
        if self.free.is_some() || self.slots.len() < self.slots.capacity() {
            return Ok(());
        }
        self.slots
            .try_reserve(1)
            .map_err(|_| alloc::failure::<Slot<V, A>>("element", self.slots.len() + 1))
    }

    /// Store `element`. Must follow a successful `reserve_one`.
    pub(crate) fn insert(&mut self, element: Element<V, A>) -> ElementId {
        self.len += 1;
        match self.free {
            Some(id) => {
                let next_free = match self.slots[id] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.free = next_free;
                self.slots[id] = Slot::Occupied(element);
                id
            }
            None => {
                debug_assert!(self.slots.len() < self.slots.capacity());
                self.slots.push(Slot::Occupied(element));
                self.slots.len() - 1
            }
        }
    }

    /// Vacate `id` and hand back its element. The key copy is released when
    /// the returned element is dropped.
    pub(crate) fn remove(&mut self, id: ElementId) -> Element<V, A> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match core::mem::replace(&mut self.slots[id], vacant) {
            Slot::Occupied(element) => {
                self.free = Some(id);
                self.len -= 1;
                element
            }
            Slot::Vacant { .. } => unreachable!("removing a vacant slot"),
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: ElementId) -> &Element<V, A> {
        match &self.slots[id] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => unreachable!("chain links to a vacant slot"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: ElementId) -> &mut Element<V, A> {
        match &mut self.slots[id] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => unreachable!("chain links to a vacant slot"),
        }
    }

    /// Drop every element and release the slot buffer itself.
    pub(crate) fn clear(&mut self) {
        let alloc = self.slots.allocator().clone();
        self.slots = Vec::new_in(alloc);
        self.free = None;
        self.len = 0;
    }

    #[cfg(test)]
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (ElementId, &Element<V, A>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(id, s)| match s {
            Slot::Occupied(e) => Some((id, e)),
            Slot::Vacant { .. } => None,
        })
    }
}
