//! C1 `sa_order_sampling`: strided SA samples, no bitvector needed (S:4.2).

use buffertk::Unpackable;
use prototk::FieldNumber;

use crate::bit_array::{BitArray, Builder as BitArrayBuilder};
use crate::builder::{Builder, Helper};
use crate::cache::CacheConfig;
use crate::Error;

use super::{bits_for, ceil_div, SaSampling};

#[derive(Clone, Debug, Default, prototk_derive::Message)]
struct SaOrderSamplingStub<'a> {
    #[prototk(1, uint64)]
    n: u64,
    #[prototk(2, uint64)]
    d_sa: u64,
    #[prototk(3, uint32)]
    bits: u32,
    #[prototk(4, bytes)]
    samples: &'a [u8],
}

/// `samples[k] = SA[k * d_sa]` for `k = 0, ..., ceil(n / d_sa) - 1`.
#[derive(Debug, PartialEq, Eq)]
pub struct SaOrderSampling<'a> {
    n: usize,
    d_sa: usize,
    bits: u8,
    samples: BitArraySlice<'a>,
}

/// Wraps [BitArray] so `#[derive(PartialEq, Eq)]` can compare the underlying bytes by value.
#[derive(Debug)]
struct BitArraySlice<'a>(BitArray<'a>);

impl PartialEq for BitArraySlice<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_ref() == other.0.as_ref()
    }
}
impl Eq for BitArraySlice<'_> {}

impl<'a> SaOrderSampling<'a> {
    fn sample_count(&self) -> usize {
        ceil_div(self.n, self.d_sa)
    }
}

impl SaSampling for SaOrderSampling<'_> {
    type Output<'b> = SaOrderSampling<'b>;

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
        let bits = bits_for(n);
        let mut words = BitArrayBuilder::with_capacity(ceil_div(n, d_sa) * bits);
        let mut count = 0;
        for (i, value) in stream.enumerate() {
            if i % d_sa == 0 {
                words.push_word(value as u64, bits);
                count += 1;
            }
        }
        if count != ceil_div(n, d_sa) {
            return Err(Error::InvariantViolation("sample count mismatch"));
        }
        builder.append_u64(FieldNumber::must(1), n as u64);
        builder.append_u64(FieldNumber::must(2), d_sa as u64);
        builder.append_u32(FieldNumber::must(3), bits as u32);
        builder.append_bytes(FieldNumber::must(4), &words.seal());
        Ok(())
    }

    fn parse<'b, 'c: 'b>(buf: &'c [u8]) -> Result<(SaOrderSampling<'b>, &'c [u8]), Error> {
        let (
            SaOrderSamplingStub {
                n,
                d_sa,
                bits,
                samples,
            },
            buf,
        ) = SaOrderSamplingStub::unpack(buf).map_err(|_| Error::Unparseable)?;
        Ok((
            SaOrderSampling {
                n: n as usize,
                d_sa: d_sa as usize,
                bits: bits as u8,
                samples: BitArraySlice(BitArray::new(samples)),
            },
            buf,
        ))
    }

    fn len(&self) -> usize {
        self.n
    }

    fn is_sampled(&self, i: usize) -> bool {
        i < self.n && i % self.d_sa == 0
    }

    fn get(&self, i: usize) -> usize {
        debug_assert!(self.is_sampled(i));
        let k = i / self.d_sa;
        self.samples
            .0
            .load(k * self.bits as usize, self.bits as usize)
            .expect("k within sample_count") as usize
    }

    fn text_order(&self) -> bool {
        false
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{BANANA_SA, banana_sa_bytes};

    fn build(sa: &[usize], d_sa: usize) -> Vec<u8> {
        let width = crate::cache::width_for(sa.len());
        let bytes = crate::cache::encode_iv(sa, width);
        let cache = CacheConfig::with_sa(&bytes);
        let mut buf = Vec::new();
        {
            let mut builder = Builder::new(&mut buf);
            SaOrderSampling::construct(&cache, d_sa, &mut builder).unwrap();
        }
        buf
    }

    #[test]
    fn samples_every_stride() {
        let buf = build(BANANA_SA, 2);
        let sa = SaOrderSampling::parse(&buf).unwrap().0;
        assert_eq!(BANANA_SA.len(), sa.len());
        for i in 0..BANANA_SA.len() {
            assert_eq!(i % 2 == 0, sa.is_sampled(i));
            if sa.is_sampled(i) {
                assert_eq!(BANANA_SA[i], sa.get(i));
            }
        }
        assert!(!sa.text_order());
    }

    #[test]
    fn density_is_exactly_ceil_n_over_d() {
        let buf = build(BANANA_SA, 3);
        let sa = SaOrderSampling::parse(&buf).unwrap().0;
        let sampled = (0..BANANA_SA.len()).filter(|&i| sa.is_sampled(i)).count();
        assert_eq!(super::super::ceil_div(BANANA_SA.len(), 3), sampled);
    }

    #[test]
    fn round_trip_preserves_value_equality() {
        let buf = build(BANANA_SA, 2);
        let a = SaOrderSampling::parse(&buf).unwrap().0;
        let buf2 = buf.clone();
        let b = SaOrderSampling::parse(&buf2).unwrap().0;
        assert_eq!(a, b);
        for i in 0..BANANA_SA.len() {
            assert_eq!(a.is_sampled(i), b.is_sampled(i));
            if a.is_sampled(i) {
                assert_eq!(a.get(i), b.get(i));
            }
        }
    }

    #[test]
    fn uses_sa_stream_helper() {
        let bytes = banana_sa_bytes();
        let cache = CacheConfig::with_sa(&bytes);
        let mut buf = Vec::new();
        {
            let mut builder = Builder::new(&mut buf);
            SaOrderSampling::construct(&cache, 2, &mut builder).unwrap();
        }
        let sa = SaOrderSampling::parse(&buf).unwrap().0;
        assert_eq!(BANANA_SA[0], sa.get(0));
    }
}
