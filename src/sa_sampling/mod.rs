//! SA-sampling strategies: C1 `sa_order_sampling`, C2 `text_order_sampling`, C3 `bwt_sampling`,
//! C4 `fuzzy_sampling`.  Each implements the common contract below; each chooses which positions
//! of the suffix array to materialise and how to lay the chosen values out in space.

pub mod c1;
pub mod c2;
pub mod c3;
pub mod c4;

use crate::builder::{Builder, Helper};
use crate::cache::CacheConfig;
use crate::Error;

/////////////////////////////////////////////// SaSampling /////////////////////////////////////////

/// The contract every SA-sampling strategy implements (ref spec S:4.1).
pub trait SaSampling {
    type Output<'b>;

    /// Build from a cache-config naming the SA (and, for some strategies, ISA/BWT/sample-char)
    /// streams, with sample stride `d_sa`.
    fn construct<H: Helper>(
        cache: &CacheConfig,
        d_sa: usize,
        builder: &mut Builder<'_, H>,
    ) -> Result<(), Error>;

    fn parse<'b, 'c: 'b>(buf: &'c [u8]) -> Result<(Self::Output<'b>, &'c [u8]), Error>;

    /// The length `n` of the text this sampling was built over.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Is text/SA position `i` sampled?
    fn is_sampled(&self, i: usize) -> bool;

    /// `SA[i]`.  Precondition: `is_sampled(i)`.  Debug builds assert the precondition; release
    /// builds leave it as undefined behaviour at the contract level, matching S:4.9.
    fn get(&self, i: usize) -> usize;

    /// Whether this strategy samples at regular strides of the text domain (true) or the SA
    /// index domain (false).  Determines ISA-support compatibility.
    fn text_order(&self) -> bool;
}

///////////////////////////////////////////// shared helpers ///////////////////////////////////////

/// `ceil(n / d)` without overflow for the `n == 0` case.
pub(crate) fn ceil_div(n: usize, d: usize) -> usize {
    debug_assert!(d >= 1);
    n.div_ceil(d)
}

/// Bits required to hold values on `[0, n)`, i.e. `ceil(log2(n))`, with a floor of 1 bit.
pub(crate) fn bits_for(n: usize) -> usize {
    crate::cache::width_for(n).max(1)
}
