//! Hash port: maps key bytes to a `u32` hashcode.
//!
//! The table stores the hashcode computed at insertion and never calls the
//! hasher again for that element; rehashing on resize only recomputes the
//! bucket index from the stored value.

/// A pure function from key bytes to a hashcode.
///
/// Implemented for every `Fn(&[u8]) -> u32`, so plain functions and
/// closures can be passed directly.
pub trait KeyHasher {
    fn hashcode(&self, key: &[u8]) -> u32;
}

impl<F> KeyHasher for F
where
    F: Fn(&[u8]) -> u32,
{
    #[inline]
    fn hashcode(&self, key: &[u8]) -> u32 {
        self(key)
    }
}

/// Default hasher: the K&R "multiply by 31" polynomial.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Kr2Hasher;

impl KeyHasher for Kr2Hasher {
    #[inline]
    fn hashcode(&self, key: &[u8]) -> u32 {
        kr2_hashcode(key)
    }
}

/// Seed zero; for each byte `h = h * 31 + byte` with wrapping arithmetic.
#[inline]
pub fn kr2_hashcode(key: &[u8]) -> u32 {
    key.iter()
        .fold(0u32, |h, &b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
}
