//! Diagnostic rendering into a caller-supplied buffer.

use crate::hash::KeyHasher;
use crate::table::Table;
use allocator_api2::alloc::Allocator;
use core::fmt::{self, Write as _};

/// `fmt::Write` over a byte slice that refuses, before copying anything,
/// a write that would cross `limit`.
struct SliceWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
    limit: usize,
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos.checked_add(s.len()).ok_or(fmt::Error)?;
        if end > self.limit {
            return Err(fmt::Error);
        }
        self.buf[self.pos..end].copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

const OPEN: &str = "{ ";
const CLOSE: &str = "}";

impl<V, H, A> Table<V, H, A>
where
    V: fmt::Debug,
    H: KeyHasher,
    A: Allocator + Clone,
{
    /// Render `{ 'key' => value, ... }` into `buf` and return the number of
    /// bytes written.
    ///
    /// Nothing is written past `buf`. Entries that do not fit (keeping room
    /// for the closing brace) are left out and rendering stops there; a
    /// buffer too short for `"{ }"` gets nothing at all. Key bytes are
    /// ASCII-escaped.
    pub fn render(&self, buf: &mut [u8]) -> usize {
        if buf.len() < OPEN.len() + CLOSE.len() {
            return 0;
        }
        let limit = buf.len() - CLOSE.len();
        let mut w = SliceWriter { buf, pos: 0, limit };
        if w.write_str(OPEN).is_err() {
            return 0;
        }
        for (key, value) in self.iter() {
            let mark = w.pos;
            if write!(w, "'{}' => {:?}, ", key.bytes().escape_ascii(), value).is_err() {
                w.pos = mark;
                break;
            }
        }
        w.limit = w.buf.len();
        match w.write_str(CLOSE) {
            Ok(()) => w.pos,
            Err(_) => unreachable!("room for the closing brace was reserved"),
        }
    }
}

impl<V, H, A> fmt::Debug for Table<V, H, A>
where
    V: fmt::Debug,
    H: KeyHasher,
    A: Allocator + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
