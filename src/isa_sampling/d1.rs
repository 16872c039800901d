//! D1 `plain_isa_sampling`: paired with C1, backed by a single `IV` scanned once from SA (S:4.6).

use buffertk::Unpackable;
use prototk::FieldNumber;

use crate::bit_array::{BitArray, Builder as BitArrayBuilder};
use crate::builder::{Builder, Helper};
use crate::cache::CacheConfig;
use crate::sa_sampling::{bits_for, ceil_div};
use crate::Error;

use super::IsaSampling;

#[derive(Clone, Debug, Default, prototk_derive::Message)]
struct PlainIsaSamplingStub<'a> {
    #[prototk(1, uint64)]
    n: u64,
    #[prototk(2, uint64)]
    d_isa: u64,
    #[prototk(3, uint32)]
    bits: u32,
    #[prototk(4, bytes)]
    iv: &'a [u8],
    #[prototk(5, uint64)]
    size: u64,
}

/// `iv[k] = i` such that `SA[i] = k * d_isa`, for `k = 0, .., size() - 1`.
pub struct PlainIsaSampling<'a> {
    n: usize,
    d_isa: usize,
    bits: u8,
    iv: BitArray<'a>,
    size: usize,
}

impl<'a> PlainIsaSampling<'a> {
    pub fn construct<H: Helper>(
        cache: &CacheConfig,
        d_isa: usize,
        builder: &mut Builder<H>,
    ) -> Result<(), Error> {
        if d_isa == 0 {
            return Err(Error::Precondition("d_isa must be >= 1"));
        }
        let sa: Vec<usize> = cache.sa_stream()?.collect();
        let n = sa.len();
        // Preserved as specified: this over-counts by one slot relative to the tightest bound
        // `(n - 1) / d_isa + 1` whenever `n - 1` isn't a multiple of `d_isa`.
        let size = if n == 0 {
            1
        } else {
            ceil_div(n - 1, d_isa) + 1
        };
        let bits = bits_for(n);
        let mut iv = vec![0usize; size];
        for (i, sa_i) in sa.iter().enumerate() {
            if sa_i % d_isa == 0 {
                iv[sa_i / d_isa] = i;
            }
        }
        builder.append_u64(FieldNumber::must(1), n as u64);
        builder.append_u64(FieldNumber::must(2), d_isa as u64);
        builder.append_u32(FieldNumber::must(3), bits as u32);
        let mut words = BitArrayBuilder::with_capacity(size * bits);
        for value in iv.iter() {
            words.push_word(*value as u64, bits);
        }
        builder.append_bytes(FieldNumber::must(4), &words.seal());
        builder.append_u64(FieldNumber::must(5), size as u64);
        Ok(())
    }

    pub fn parse<'b, 'c: 'b>(buf: &'c [u8]) -> Result<(PlainIsaSampling<'b>, &'c [u8]), Error> {
        let (
            PlainIsaSamplingStub {
                n,
                d_isa,
                bits,
                iv,
                size,
            },
            buf,
        ) = PlainIsaSamplingStub::unpack(buf).map_err(|_| Error::Unparseable)?;
        Ok((
            PlainIsaSampling {
                n: n as usize,
                d_isa: d_isa as usize,
                bits: bits as u8,
                iv: BitArray::new(iv),
                size: size as usize,
            },
            buf,
        ))
    }

    fn load(&self, k: usize) -> usize {
        self.iv
            .load(k * self.bits as usize, self.bits as usize)
            .expect("k within size()") as usize
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl IsaSampling for PlainIsaSampling<'_> {
    fn len(&self) -> usize {
        self.n
    }

    fn x(&self, i: usize) -> usize {
        self.load(i / self.d_isa)
    }

    fn sample_leq(&self, i: usize) -> (usize, usize) {
        let k = i / self.d_isa;
        (self.load(k), k * self.d_isa)
    }

    fn sample_geq(&self, i: usize) -> (usize, usize) {
        let ci = (i / self.d_isa + 1) % self.size;
        (self.load(ci), ci * self.d_isa)
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::BANANA_SA;

    fn build(sa: &[usize], d_isa: usize) -> Vec<u8> {
        let width = crate::cache::width_for(sa.len());
        let bytes = crate::cache::encode_iv(sa, width);
        let cache = CacheConfig::with_sa(&bytes);
        let mut buf = Vec::new();
        {
            let mut builder = Builder::new(&mut buf);
            PlainIsaSampling::construct(&cache, d_isa, &mut builder).unwrap();
        }
        buf
    }

    #[test]
    fn x_recovers_sa_index_of_each_multiple() {
        let buf = build(BANANA_SA, 2);
        let d1 = PlainIsaSampling::parse(&buf).unwrap().0;
        for k in 0..BANANA_SA.len() / 2 {
            let target = k * 2;
            let i = d1.x(target);
            assert_eq!(BANANA_SA[i], target);
        }
    }

    #[test]
    fn matched_pair_identity_with_c1() {
        use crate::sa_sampling::c1::SaOrderSampling;
        use crate::sa_sampling::SaSampling;

        let width = crate::cache::width_for(BANANA_SA.len());
        let sa_bytes = crate::cache::encode_iv(BANANA_SA, width);
        let cache = CacheConfig::with_sa(&sa_bytes);
        let d_sa = 2;

        let mut c1_buf = Vec::new();
        {
            let mut builder = Builder::new(&mut c1_buf);
            SaOrderSampling::construct(&cache, d_sa, &mut builder).unwrap();
        }
        let c1 = SaOrderSampling::parse(&c1_buf).unwrap().0;

        let d1_buf = build(BANANA_SA, d_sa);
        let d1 = PlainIsaSampling::parse(&d1_buf).unwrap().0;

        let mut k = 0;
        while k * d_sa < BANANA_SA.len() {
            let t = k * d_sa;
            let j = d1.x(t);
            assert_eq!(t, c1.get(j));
            k += 1;
        }
    }

    #[test]
    fn sample_geq_wraps_modulo_size() {
        let buf = build(BANANA_SA, 3);
        let d1 = PlainIsaSampling::parse(&buf).unwrap().0;
        // i near the end forces ci = (i/d_isa + 1) to wrap back to block 0.
        let (value, pos) = d1.sample_geq(BANANA_SA.len() - 1);
        assert_eq!(0, pos);
        assert_eq!(d1.x(0), value);
    }
}
