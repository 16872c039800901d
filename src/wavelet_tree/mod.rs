pub mod prefix;

use crate::builder::{Builder, Helper};
use crate::Error;

//////////////////////////////////////////// WaveletTree ///////////////////////////////////////////

/// A [WaveletTree] stores a sequence of u32 symbols and supports `access`, `rank_q`, `select_q`
/// in `O(log sigma)` time, where sigma is the number of distinct symbols.
pub trait WaveletTree {
    /// Construct a wavelet tree over `symbols`, writing it into `builder`.
    fn construct<H: Helper>(symbols: &[u32], builder: &mut Builder<'_, H>) -> Result<(), Error>;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The symbol at position `x`.
    fn access(&self, x: usize) -> Option<u32>;
    /// The number of occurrences of `q` at positions `i < x`.
    fn rank_q(&self, q: u32, x: usize) -> Option<usize>;
    /// One more than the position of the x'th occurrence of `q` (`x` 1-indexed), mirroring
    /// [crate::bit_vector::BitVector::select]'s position-plus-one convention; subtract 1 for the
    /// actual 0-indexed position.
    fn select_q(&self, q: u32, x: usize) -> Option<usize>;
}
