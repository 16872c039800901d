pub mod sparse;

use crate::builder::{Builder, Helper};
use crate::Error;

///////////////////////////////////////////// BitVector ////////////////////////////////////////////

/// A [BitVector] is an immutable sequence of 0/1-valued bits supporting constant-time rank and
/// select.  `rank(x)` counts the ones in `[0, x)`; `select(x)` is one more than the 0-indexed
/// position of the x'th one (1-indexed rank in, position-plus-one out), with `select(0) == 0` by
/// convention.  Callers wanting the actual 0-indexed position subtract 1 from a non-zero result.
pub trait BitVector {
    type Output<'b>;

    /// Construct a new bitvector from a dense bool slice, writing it into `builder`.
    fn construct<H: Helper>(bits: &[bool], builder: &mut Builder<'_, H>) -> Result<(), Error>;

    /// Parse a previously-constructed bitvector from `buf`.
    fn parse<'b, 'c: 'b>(buf: &'c [u8]) -> Result<(Self::Output<'b>, &'c [u8]), Error>;

    /// The number of bits in this [BitVector].
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Computes `access[x]`, the value of the x'th bit.
    fn access(&self, x: usize) -> Option<bool>;
    /// Computes `rank1[x]`, the number of ones at positions `i < x`.
    fn rank(&self, x: usize) -> Option<usize>;
    /// Computes `rank0[x] = x - rank1[x]`, the number of zeroes at positions `i < x`.
    fn rank0(&self, x: usize) -> Option<usize> {
        Some(x - self.rank(x)?)
    }
    /// Select the x'th one bit, 1-indexed.  `select(0) == Some(0)`.
    fn select(&self, x: usize) -> Option<usize>;
    /// Select the x'th zero bit, 1-indexed, by binary search over rank0.  Shares `select`'s
    /// position-plus-one convention: the result is one more than the 0-indexed position of the
    /// x'th zero bit, so that `WaveletTree`'s recursive `select_q` can feed it straight back in as
    /// the next level's 1-indexed rank.
    fn select0(&self, x: usize) -> Option<usize> {
        if x == 0 {
            return Some(0);
        }
        if x > self.rank0(self.len())? {
            return None;
        }
        let idx = crate::binary_search::binary_search_by(0, self.len(), |mid| {
            self.rank0(mid + 1).unwrap_or(0).cmp(&x)
        });
        Some(idx + 1)
    }
}
