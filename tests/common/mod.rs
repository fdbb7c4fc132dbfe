// Allocator used by the integration tests: forwards to Global, counts
// every acquire and release, and refuses requests once its budget is spent.
#![allow(dead_code)]

use bytetable::{AllocError, Allocator, Global};
use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

#[derive(Debug, Default)]
pub struct Tracking {
    budget: Cell<Option<usize>>,
    live_bytes: Cell<usize>,
    acquired: Cell<usize>,
    released: Cell<usize>,
    refused: Cell<usize>,
}

impl Tracking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `n` more successful allocations; `None` lifts the limit.
    pub fn set_budget(&self, n: Option<usize>) {
        self.budget.set(n);
    }

    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }

    pub fn acquired(&self) -> usize {
        self.acquired.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }

    pub fn refused(&self) -> usize {
        self.refused.get()
    }
}

unsafe impl Allocator for Tracking {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        match self.budget.get() {
            Some(0) => {
                self.refused.set(self.refused.get() + 1);
                return Err(AllocError);
            }
            Some(n) => self.budget.set(Some(n - 1)),
            None => {}
        }
        let ptr = Global.allocate(layout)?;
        self.live_bytes.set(self.live_bytes.get() + layout.size());
        self.acquired.set(self.acquired.get() + 1);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live_bytes.set(self.live_bytes.get() - layout.size());
        self.released.set(self.released.get() + 1);
        Global.deallocate(ptr, layout)
    }
}

pub fn key(i: usize) -> Vec<u8> {
    format!("_{i}_").into_bytes()
}
