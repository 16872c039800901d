//! C2 `text_order_sampling`: strided text positions, with a mark bitvector over SA indices so a
//! sampled SA value can be recovered by rank (S:4.3).

use buffertk::Unpackable;
use prototk::FieldNumber;

use crate::bit_array::{BitArray, Builder as BitArrayBuilder};
use crate::bit_vector::sparse::BitVector;
use crate::bit_vector::BitVector as BitVectorTrait;
use crate::builder::{Builder, Helper};
use crate::cache::CacheConfig;
use crate::Error;

use super::{bits_for, ceil_div, SaSampling};

#[derive(Clone, Debug, Default, prototk_derive::Message)]
struct TextOrderSamplingStub<'a> {
    #[prototk(1, uint64)]
    n: u64,
    #[prototk(2, uint64)]
    d_sa: u64,
    #[prototk(3, uint32)]
    bits: u32,
    #[prototk(4, bytes)]
    samples: &'a [u8],
    #[prototk(5, bytes)]
    marked: &'a [u8],
}

/// `marked[i] = 1 iff SA[i] mod d_sa == 0`; `samples[rank1(marked, i)] = SA[i] / d_sa`.
#[derive(Debug)]
pub struct TextOrderSampling<'a> {
    n: usize,
    d_sa: usize,
    bits: u8,
    samples: BitArray<'a>,
    marked: BitVector<'a>,
}

impl<'a> TextOrderSampling<'a> {
    /// The compressed form `samples[k]`, as consumed directly by D2.  Not multiplied by `d_sa`.
    pub fn condensed(&self, k: usize) -> Option<usize> {
        self.samples
            .load(k * self.bits as usize, self.bits as usize)
            .map(|v| v as usize)
    }

    pub fn marked(&self) -> &BitVector<'a> {
        &self.marked
    }

    pub fn d_sa(&self) -> usize {
        self.d_sa
    }

    /// `ceil(n / d_sa)`, the number of entries in `condensed` and the size of the permutation D2
    /// builds its `IP` over.
    pub fn sample_count(&self) -> usize {
        ceil_div(self.n, self.d_sa)
    }
}

impl PartialEq for TextOrderSampling<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
            && self.d_sa == other.d_sa
            && self.bits == other.bits
            && self.samples.as_ref() == other.samples.as_ref()
    }
}
impl Eq for TextOrderSampling<'_> {}

impl SaSampling for TextOrderSampling<'_> {
    type Output<'b> = TextOrderSampling<'b>;

    fn construct<H: Helper>(
        cache: &CacheConfig,
        d_sa: usize,
        builder: &mut Builder<'_, H>,
    ) -> Result<(), Error> {
        if d_sa == 0 {
            return Err(Error::Precondition("d_sa must be >= 1"));
        }
        let stream = cache.sa_stream()?;
        let n = stream.len();
        let expected = ceil_div(n, d_sa);
        let condensed_bits = bits_for(expected);
        let mut marks = vec![false; n];
        let mut condensed = Vec::with_capacity(expected);
        for (i, sa_i) in stream.enumerate() {
            if sa_i % d_sa == 0 {
                marks[i] = true;
                condensed.push(sa_i / d_sa);
            }
        }
        if condensed.len() != expected {
            return Err(Error::InvariantViolation("mark count mismatch"));
        }
        builder.append_u64(FieldNumber::must(1), n as u64);
        builder.append_u64(FieldNumber::must(2), d_sa as u64);
        builder.append_u32(FieldNumber::must(3), condensed_bits as u32);
        let mut words = BitArrayBuilder::with_capacity(condensed.len() * condensed_bits);
        for value in condensed.iter() {
            words.push_word(*value as u64, condensed_bits);
        }
        builder.append_bytes(FieldNumber::must(4), &words.seal());
        let mut marked_builder = builder.sub(FieldNumber::must(5));
        BitVector::construct(&marks, &mut marked_builder)?;
        Ok(())
    }

    fn parse<'b, 'c: 'b>(buf: &'c [u8]) -> Result<(TextOrderSampling<'b>, &'c [u8]), Error> {
        let (
            TextOrderSamplingStub {
                n,
                d_sa,
                bits,
                samples,
                marked,
            },
            buf,
        ) = TextOrderSamplingStub::unpack(buf).map_err(|_| Error::Unparseable)?;
        let marked = BitVector::parse(marked)?.0;
        Ok((
            TextOrderSampling {
                n: n as usize,
                d_sa: d_sa as usize,
                bits: bits as u8,
                samples: BitArray::new(samples),
                marked,
            },
            buf,
        ))
    }

    fn len(&self) -> usize {
        self.n
    }

    fn is_sampled(&self, i: usize) -> bool {
        self.marked.access(i).unwrap_or(false)
    }

    fn get(&self, i: usize) -> usize {
        debug_assert!(self.is_sampled(i));
        let rank = self.marked.rank(i).expect("i < n");
        self.condensed(rank).expect("rank within sample_count") * self.d_sa
    }

    fn text_order(&self) -> bool {
        true
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::BANANA_SA;

    fn build(sa: &[usize], d_sa: usize) -> Vec<u8> {
        let width = crate::cache::width_for(sa.len());
        let bytes = crate::cache::encode_iv(sa, width);
        let cache = CacheConfig::with_sa(&bytes);
        let mut buf = Vec::new();
        {
            let mut builder = Builder::new(&mut buf);
            TextOrderSampling::construct(&cache, d_sa, &mut builder).unwrap();
        }
        buf
    }

    #[test]
    fn marks_match_even_sa_values() {
        let buf = build(BANANA_SA, 2);
        let sa = TextOrderSampling::parse(&buf).unwrap().0;
        for i in 0..BANANA_SA.len() {
            assert_eq!(BANANA_SA[i] % 2 == 0, sa.is_sampled(i));
            if sa.is_sampled(i) {
                assert_eq!(BANANA_SA[i], sa.get(i));
            }
        }
        assert!(sa.text_order());
    }

    #[test]
    fn mark_count_equals_ceil_n_over_d() {
        let buf = build(BANANA_SA, 2);
        let sa = TextOrderSampling::parse(&buf).unwrap().0;
        let marks = (0..BANANA_SA.len()).filter(|&i| sa.is_sampled(i)).count();
        assert_eq!(super::super::ceil_div(BANANA_SA.len(), 2), marks);
    }

    #[test]
    fn round_trip() {
        let buf = build(BANANA_SA, 3);
        let a = TextOrderSampling::parse(&buf).unwrap().0;
        let buf2 = buf.clone();
        let b = TextOrderSampling::parse(&buf2).unwrap().0;
        assert_eq!(a, b);
    }
}
