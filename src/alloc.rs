//! Allocator port plumbing.
//!
//! The port is `allocator_api2`'s `Allocator`. Every buffer the table owns
//! (bucket array, element arena, key copies, snapshot descriptors) is an
//! `allocator_api2::vec::Vec` in the caller's allocator and is sized with
//! `try_reserve*` up front, so no later push can reallocate behind the
//! caller's back. Release happens when the buffer is dropped, again through
//! the port and with the same layout.
//!
//! A context pointer is just the allocator value: `&A` is an allocator
//! whenever `A` is, so `Table<V, H, &Ctx>` threads one shared context
//! through every acquire and release.

use crate::error::TableError;
use allocator_api2::alloc::Allocator;
use allocator_api2::vec::Vec;
use core::alloc::Layout;

pub use allocator_api2::alloc::{AllocError, Global};

/// Build the error for a refused request of `count` items of `T` and emit
/// the debug-build diagnostic.
pub(crate) fn failure<T>(what: &'static str, count: usize) -> TableError {
    let err = match Layout::array::<T>(count) {
        Ok(layout) => TableError::AllocationFailure { what, layout },
        Err(_) => TableError::CapacityOverflow { what, count },
    };
    #[cfg(debug_assertions)]
    tracing::warn!(what, count, error = %err, "allocation failed");
    err
}

/// An empty vector with room for exactly `count` items.
pub(crate) fn try_vec<T, A: Allocator>(
    count: usize,
    alloc: A,
    what: &'static str,
) -> Result<Vec<T, A>, TableError> {
    let mut v = Vec::new_in(alloc);
    v.try_reserve_exact(count)
        .map_err(|_| failure::<T>(what, count))?;
    Ok(v)
}

/// Copy `key` into a fresh buffer with a trailing NUL. The key length is the
/// buffer length minus one, so embedded NULs are fine.
pub(crate) fn copy_key<A: Allocator>(key: &[u8], alloc: A) -> Result<Vec<u8, A>, TableError> {
    let mut buf = try_vec(key.len() + 1, alloc, "key copy")?;
    buf.extend_from_slice(key);
    buf.push(0);
    Ok(buf)
}
