//! ISA-sampling supports: D1 `plain_isa_sampling`, D2 `text_order_isa_support`, D3
//! `fuzzy_isa_support`.  Each is matched to exactly one of [crate::sa_sampling]'s strategies and
//! answers `X[i]` (the ISA value near text position `i`) and its two neighbour queries.

pub mod d1;
pub mod d2;
pub mod d3;

/// The query surface every ISA support exposes once built.  Unlike [crate::sa_sampling::SaSampling],
/// construction is not unified across strategies: D1 builds directly from a cache-config, while
/// D2/D3 build from an already-built companion SA-sampling instance, so each module exposes its
/// own constructor instead of a shared one here.
pub trait IsaSampling {
    /// The length `n` of the text this support was built over.
    fn len(&self) -> usize;

    /// The ISA sample associated with text position `i`.
    fn x(&self, i: usize) -> usize;

    /// The nearest sampled neighbour at or below `i`, as `(value, text_position)`.
    fn sample_leq(&self, i: usize) -> (usize, usize);

    /// The nearest sampled neighbour at or above `i`, as `(value, text_position)`.
    fn sample_geq(&self, i: usize) -> (usize, usize);
}
