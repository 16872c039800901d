//! The suffix-array (SA) and inverse-suffix-array (ISA) sampling core of a succinct full-text
//! self-index.
//!
//! A compressed suffix array stores the permutation `SA[0..n)` and its inverse `ISA[0..n)` in
//! sublinear space by sampling a subset of positions and leaving the rest to be reconstructed by
//! the enclosing index's LF/Psi mapping.  This crate is the sampling layer: it decides which
//! positions to store, lays them out succinctly, and answers `is_sampled`, `operator[]`, and the
//! matched ISA neighbour queries under a handful of different space/time trade-offs.
//!
//! Four SA-sampling strategies live in [sa_sampling]: [sa_sampling::c1] (suffix-order stride),
//! [sa_sampling::c2] (text-order stride with marks), [sa_sampling::c3] (BWT-driven marks), and
//! [sa_sampling::c4] (fuzzy, run-aware sampling).  Three matched ISA supports live in
//! [isa_sampling]: [isa_sampling::d1], [isa_sampling::d2], [isa_sampling::d3].  Each rests on the
//! succinct primitives in [bit_array] (bit-packed integer vectors), [bit_vector] (rank/select
//! bitvectors), [wavelet_tree], and [ip] (inverse-permutation support).

use std::num::TryFromIntError;

pub mod bit_array;
pub mod bit_vector;
pub mod binary_search;
pub mod builder;
pub mod cache;
pub mod encoder;
pub mod ip;
pub mod isa_sampling;
pub mod sa_sampling;
pub mod wavelet_tree;

///////////////////////////////////////////////// Error ////////////////////////////////////////////

/// Every failure this crate can report.  Queries never fail; only construction and
/// deserialization can, and every failure is reported synchronously to the caller (S:7).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A value did not fit the integer type it needed to become.
    IntoUsize,
    /// A byte stream was truncated or malformed on load.
    Unparseable,
    /// A required cache stream (SA, ISA, BWT, or sample-char) was absent.
    MissingInput(&'static str),
    /// Builder received inconsistent sizes, or a required precondition (e.g. `d_sa == d_isa`)
    /// did not hold at construction time.
    Precondition(&'static str),
    /// An internal consistency check failed during build; indicates a bug in this crate.
    InvariantViolation(&'static str),
    CouldNotConstructBitVector,
    InvalidBitVector,
    InvalidEncoder,
    InvalidWaveletTree,
    InvalidSuffixArray,
    InvalidInverseSuffixArray,
    BadRank(usize),
    BadSelect(usize),
    BadIndex(usize),
    LogicError(&'static str),
}

impl From<TryFromIntError> for Error {
    fn from(_: TryFromIntError) -> Error {
        Error::IntoUsize
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
pub(crate) mod test_util;
