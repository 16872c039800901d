//! C3 `bwt_sampling`: C2's mark-and-rank shape, but a position is also marked when its BWT
//! character falls in a caller-chosen set `S`, and samples store the raw `SA[i]` (S:4.4).

use buffertk::Unpackable;
use prototk::FieldNumber;

use crate::bit_array::{BitArray, Builder as BitArrayBuilder};
use crate::bit_vector::sparse::BitVector;
use crate::bit_vector::BitVector as BitVectorTrait;
use crate::builder::{Builder, Helper};
use crate::cache::CacheConfig;
use crate::Error;

use super::{bits_for, SaSampling};

#[derive(Clone, Debug, Default, prototk_derive::Message)]
struct BwtSamplingStub<'a> {
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

/// `marked[i] = 1 iff SA[i] mod d_sa == 0 or BWT[i] in S`; `samples` holds `SA[i]` for marked `i`,
/// in SA-index order.
#[derive(Debug)]
pub struct BwtSampling<'a> {
    n: usize,
    d_sa: usize,
    bits: u8,
    samples: BitArray<'a>,
    marked: BitVector<'a>,
}

impl PartialEq for BwtSampling<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
            && self.d_sa == other.d_sa
            && self.bits == other.bits
            && self.samples.as_ref() == other.samples.as_ref()
    }
}
impl Eq for BwtSampling<'_> {}

impl SaSampling for BwtSampling<'_> {
    type Output<'b> = BwtSampling<'b>;

    fn construct<H: Helper>(
        cache: &CacheConfig,
        d_sa: usize,
        builder: &mut Builder<'_, H>,
    ) -> Result<(), Error> {
        if d_sa == 0 {
            return Err(Error::Precondition("d_sa must be >= 1"));
        }
        let sa_stream = cache.sa_stream()?;
        let n = sa_stream.len();
        let bwt_stream = cache.bwt_stream()?;
        if bwt_stream.len() != n {
            return Err(Error::InvariantViolation("BWT length must match SA length"));
        }
        let sample_chars = cache.sample_chars()?;
        let bits = bits_for(n);
        let mut marks = vec![false; n];
        let mut samples = Vec::new();
        for (i, (sa_i, bwt_i)) in sa_stream.zip(bwt_stream).enumerate() {
            if sa_i % d_sa == 0 || sample_chars.contains(&(bwt_i as u32)) {
                marks[i] = true;
                samples.push(sa_i);
            }
        }
        builder.append_u64(FieldNumber::must(1), n as u64);
        builder.append_u64(FieldNumber::must(2), d_sa as u64);
        builder.append_u32(FieldNumber::must(3), bits as u32);
        let mut words = BitArrayBuilder::with_capacity(samples.len() * bits);
        for value in samples.iter() {
            words.push_word(*value as u64, bits);
        }
        builder.append_bytes(FieldNumber::must(4), &words.seal());
        let mut marked_builder = builder.sub(FieldNumber::must(5));
        BitVector::construct(&marks, &mut marked_builder)?;
        Ok(())
    }

    fn parse<'b, 'c: 'b>(buf: &'c [u8]) -> Result<(BwtSampling<'b>, &'c [u8]), Error> {
        let (
            BwtSamplingStub {
                n,
                d_sa,
                bits,
                samples,
                marked,
            },
            buf,
        ) = BwtSamplingStub::unpack(buf).map_err(|_| Error::Unparseable)?;
        let marked = BitVector::parse(marked)?.0;
        Ok((
            BwtSampling {
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
        self.samples
            .load(rank * self.bits as usize, self.bits as usize)
            .expect("rank within sample count") as usize
    }

    fn text_order(&self) -> bool {
        false
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{BANANA_BWT, BANANA_SA};

    fn build(sa: &[usize], bwt: &str, d_sa: usize, sample_chars: &[u32]) -> Vec<u8> {
        let sa_bytes = crate::cache::encode_iv(sa, crate::cache::width_for(sa.len()));
        let bwt_values: Vec<usize> = bwt.chars().map(|c| c as usize).collect();
        let bwt_bytes = crate::cache::encode_iv(&bwt_values, 32);
        let sample_chars: Vec<usize> = sample_chars.iter().map(|c| *c as usize).collect();
        let sample_bytes = crate::cache::encode_iv(&sample_chars, 32);
        let mut cache = CacheConfig::with_sa(&sa_bytes).with_bwt(&bwt_bytes);
        if !sample_chars.is_empty() {
            cache = cache.with_sample_chars(&sample_bytes);
        }
        let mut buf = Vec::new();
        {
            let mut builder = Builder::new(&mut buf);
            BwtSampling::construct(&cache, d_sa, &mut builder).unwrap();
        }
        buf
    }

    #[test]
    fn marks_stride_or_bwt_char() {
        let s = &[b'n' as u32];
        let buf = build(BANANA_SA, BANANA_BWT, 3, s);
        let sampling = BwtSampling::parse(&buf).unwrap().0;
        for i in 0..BANANA_SA.len() {
            let expected =
                BANANA_SA[i] % 3 == 0 || BANANA_BWT.as_bytes()[i] as u32 == b'n' as u32;
            assert_eq!(expected, sampling.is_sampled(i), "i={i}");
            if sampling.is_sampled(i) {
                assert_eq!(BANANA_SA[i], sampling.get(i));
            }
        }
        assert!(!sampling.text_order());
    }

    #[test]
    fn empty_sample_chars_behaves_like_plain_stride() {
        let buf = build(BANANA_SA, BANANA_BWT, 2, &[]);
        let sampling = BwtSampling::parse(&buf).unwrap().0;
        for i in 0..BANANA_SA.len() {
            assert_eq!(BANANA_SA[i] % 2 == 0, sampling.is_sampled(i));
        }
    }

    #[test]
    fn round_trip() {
        let buf = build(BANANA_SA, BANANA_BWT, 4, &[b'a' as u32]);
        let a = BwtSampling::parse(&buf).unwrap().0;
        let buf2 = buf.clone();
        let b = BwtSampling::parse(&buf2).unwrap().0;
        assert_eq!(a, b);
    }
}
