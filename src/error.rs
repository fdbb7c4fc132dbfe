//! Error types. Allocation failure is the only runtime failure; everything
//! else is either a sentinel (`None`, early return) or a programmer error.

use core::alloc::Layout;
use core::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum TableError {
    /// The allocator refused a request.
    #[error("could not allocate {} bytes for {what}", .layout.size())]
    AllocationFailure { what: &'static str, layout: Layout },
    /// The requested element count does not fit in a `Layout`.
    #[error("capacity overflow allocating {count} items for {what}")]
    CapacityOverflow { what: &'static str, count: usize },
}

impl TableError {
    /// Diverge the way std collections do when the global allocator fails.
    pub(crate) fn abort(self) -> ! {
        match self {
            TableError::AllocationFailure { layout, .. } => {
                std::alloc::handle_alloc_error(layout)
            }
            TableError::CapacityOverflow { .. } => panic!("{self}"),
        }
    }
}

/// A put that was dropped. The value is handed back untouched and the table
/// is exactly as it was before the call.
#[derive(Debug)]
pub struct InsertError<V> {
    pub value: V,
    pub source: TableError,
}

impl<V> InsertError<V> {
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V> fmt::Display for InsertError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "put dropped: {}", self.source)
    }
}

impl<V: fmt::Debug> std::error::Error for InsertError<V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
