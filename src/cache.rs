//! Cache-config plumbing: the byte-oriented, length-prefixed, bit-packed integer vector streams
//! that the enclosing index hands to a sampling strategy at construction time.
//!
//! The cache files themselves (and however they came to be backed by disk) are a collaborator
//! out of scope for this crate; what lives here is just the wire shape each stream takes and a
//! sequential reader over it, built atop [crate::bit_array::FixedWidthIterator] the same way the
//! rest of this crate reads bit-packed data.

use buffertk::{stack_pack, v64, Unpackable};

use crate::bit_array::FixedWidthIterator;
use crate::Error;

///////////////////////////////////////////// IvStream /////////////////////////////////////////////

/// A length-prefixed, bit-packed integer vector: `v64(len) ++ v64(width) ++ packed bits`.  Read
/// once, sequentially, front to back; never randomly addressed beyond the stride window a caller
/// chooses to skip through.
pub struct IvStream<'a> {
    len: usize,
    iter: FixedWidthIterator<'a>,
}

impl<'a> IvStream<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self, Error> {
        let (len, bytes) = v64::unpack(bytes).map_err(|_| Error::Unparseable)?;
        let len: usize = len.into();
        let (width, bytes) = v64::unpack(bytes).map_err(|_| Error::Unparseable)?;
        let width: usize = width.into();
        if width > 32 {
            return Err(Error::Unparseable);
        }
        Ok(Self {
            len,
            iter: FixedWidthIterator::new(bytes, 0, len * width, width),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Iterator for IvStream<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.iter.next().map(|x| x as usize)
    }
}

/// Encode `values` as a length-prefixed, bit-packed integer vector of the given `width`.  Used by
/// the enclosing index (or tests standing in for it) to produce the streams this crate consumes.
pub fn encode_iv(values: &[usize], width: usize) -> Vec<u8> {
    assert!(width <= 32);
    let mut bytes = Vec::new();
    stack_pack(v64::from(values.len() as u64)).append_to_vec(&mut bytes);
    stack_pack(v64::from(width as u64)).append_to_vec(&mut bytes);
    let mut builder = crate::bit_array::Builder::with_capacity(values.len() * width);
    for value in values {
        builder.push_word(*value as u64, width);
    }
    bytes.extend(builder.seal());
    bytes
}

/// The width, in bits, needed to hold values on `[0, n)`.
pub fn width_for(n: usize) -> usize {
    std::cmp::max(n, 1).next_power_of_two().ilog2() as usize
}

////////////////////////////////////////////// CacheConfig /////////////////////////////////////////

/// Names the byte-oriented streams a sampling strategy may consume at construction time.  `sa` is
/// always required; `isa`, `bwt`, and `sample_chars` are required only by strategies that name
/// them (C4 needs `isa`; C3 needs `bwt` and, optionally, `sample_chars`).
#[derive(Clone, Copy, Debug, Default)]
pub struct CacheConfig<'a> {
    pub sa: Option<&'a [u8]>,
    pub isa: Option<&'a [u8]>,
    pub bwt: Option<&'a [u8]>,
    pub sample_chars: Option<&'a [u8]>,
}

impl<'a> CacheConfig<'a> {
    pub fn with_sa(sa: &'a [u8]) -> Self {
        Self {
            sa: Some(sa),
            isa: None,
            bwt: None,
            sample_chars: None,
        }
    }

    pub fn with_isa(mut self, isa: &'a [u8]) -> Self {
        self.isa = Some(isa);
        self
    }

    pub fn with_bwt(mut self, bwt: &'a [u8]) -> Self {
        self.bwt = Some(bwt);
        self
    }

    pub fn with_sample_chars(mut self, sample_chars: &'a [u8]) -> Self {
        self.sample_chars = Some(sample_chars);
        self
    }

    pub fn sa_stream(&self) -> Result<IvStream<'a>, Error> {
        IvStream::open(self.sa.ok_or(Error::MissingInput("KEY_SA"))?)
    }

    pub fn isa_stream(&self) -> Result<IvStream<'a>, Error> {
        IvStream::open(self.isa.ok_or(Error::MissingInput("KEY_ISA"))?)
    }

    pub fn bwt_stream(&self) -> Result<IvStream<'a>, Error> {
        IvStream::open(self.bwt.ok_or(Error::MissingInput("KEY_BWT"))?)
    }

    /// The sample-char set `S`.  Absent means `S` is empty, not an error: §4.4 allows it.
    pub fn sample_chars(&self) -> Result<Vec<u32>, Error> {
        match self.sample_chars {
            Some(bytes) => Ok(IvStream::open(bytes)?.map(|x| x as u32).collect()),
            None => Ok(Vec::new()),
        }
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let values = vec![12usize, 0, 7, 1, 8, 2, 9];
        let width = width_for(13);
        let bytes = encode_iv(&values, width);
        let stream = IvStream::open(&bytes).unwrap();
        assert_eq!(values.len(), stream.len());
        let read: Vec<usize> = stream.collect();
        assert_eq!(values, read);
    }

    #[test]
    fn missing_sa_is_missing_input() {
        let cfg = CacheConfig::default();
        assert_eq!(Err(Error::MissingInput("KEY_SA")), cfg.sa_stream().map(|_| ()));
    }

    #[test]
    fn absent_sample_chars_is_empty_not_error() {
        let cfg = CacheConfig::default();
        assert_eq!(Ok(Vec::new()), cfg.sample_chars());
    }
}
