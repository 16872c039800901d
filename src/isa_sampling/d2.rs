//! D2 `text_order_isa_support`: reuses C2's mark bitvector via an [InversePermutation] over its
//! condensed samples (S:4.7).

use buffertk::Unpackable;
use prototk::FieldNumber;

use crate::bit_vector::BitVector as BitVectorTrait;
use crate::builder::{Builder, Helper};
use crate::ip::InversePermutation;
use crate::sa_sampling::c2::TextOrderSampling;
use crate::sa_sampling::SaSampling;
use crate::Error;

use super::IsaSampling;

#[derive(Clone, Debug, Default, prototk_derive::Message)]
struct TextOrderIsaSupportStub<'a> {
    #[prototk(1, uint64)]
    d_isa: u64,
    #[prototk(2, bytes)]
    ip: &'a [u8],
}

/// Holds a non-owning back-reference to its companion [TextOrderSampling] plus an owned
/// [InversePermutation] over that companion's condensed samples.
pub struct TextOrderIsaSupport<'r, 'c> {
    d_isa: usize,
    companion: &'r TextOrderSampling<'c>,
    ip: InversePermutation<'r>,
}

impl<'r, 'c> TextOrderIsaSupport<'r, 'c> {
    /// Precondition: `companion.text_order()` and `d_isa == companion.d_sa()`.
    pub fn construct<H: Helper>(
        companion: &TextOrderSampling,
        d_isa: usize,
        builder: &mut Builder<H>,
    ) -> Result<(), Error> {
        if !companion.text_order() {
            return Err(Error::Precondition(
                "D2 requires a companion SA strategy with text_order = true",
            ));
        }
        if d_isa != companion.d_sa() {
            return Err(Error::Precondition("d_isa must equal the companion's d_sa"));
        }
        let count = companion.sample_count();
        let mut perm = Vec::with_capacity(count);
        for k in 0..count {
            perm.push(
                companion
                    .condensed(k)
                    .ok_or(Error::InvariantViolation("condensed sample missing"))?,
            );
        }
        builder.append_u64(FieldNumber::must(1), d_isa as u64);
        let mut ip_builder = builder.sub(FieldNumber::must(2));
        InversePermutation::construct(&perm, &mut ip_builder)?;
        Ok(())
    }

    /// Re-binds against `companion`, the idiomatic stand-in for rebinding a back-reference after
    /// a move, copy, or load (see [crate::ip]).
    pub fn parse(buf: &'r [u8], companion: &'r TextOrderSampling<'c>) -> Result<(Self, &'r [u8]), Error> {
        let (TextOrderIsaSupportStub { d_isa, ip }, buf) =
            TextOrderIsaSupportStub::unpack(buf).map_err(|_| Error::Unparseable)?;
        let ip = InversePermutation::parse(ip)?.0;
        Ok((
            TextOrderIsaSupport {
                d_isa: d_isa as usize,
                companion,
                ip,
            },
            buf,
        ))
    }

    fn at(&self, k: usize) -> (usize, usize) {
        let k = k % self.ip.size();
        let p = self.ip.get(k).expect("k within ip.size()");
        let j = self
            .companion
            .marked()
            .select(p + 1)
            .expect("p within sample_count")
            - 1;
        (j, k * self.d_isa)
    }
}

impl IsaSampling for TextOrderIsaSupport<'_, '_> {
    fn len(&self) -> usize {
        self.companion.len()
    }

    fn x(&self, i: usize) -> usize {
        self.at(i / self.d_isa).0
    }

    fn sample_leq(&self, i: usize) -> (usize, usize) {
        self.at(i / self.d_isa)
    }

    fn sample_geq(&self, i: usize) -> (usize, usize) {
        let ci = (i / self.d_isa + 1) % self.ip.size();
        self.at(ci)
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::test_util::BANANA_SA;

    fn build_companion(sa: &[usize], d_sa: usize) -> Vec<u8> {
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
    fn matched_pair_identity() {
        let d_sa = 2;
        let companion_buf = build_companion(BANANA_SA, d_sa);
        let companion = TextOrderSampling::parse(&companion_buf).unwrap().0;

        let mut d2_buf = Vec::new();
        {
            let mut builder = Builder::new(&mut d2_buf);
            TextOrderIsaSupport::construct(&companion, d_sa, &mut builder).unwrap();
        }
        let d2 = TextOrderIsaSupport::parse(&d2_buf, &companion).unwrap().0;

        let mut k = 0;
        while k * d_sa < BANANA_SA.len() {
            let t = k * d_sa;
            let j = d2.x(t);
            assert_eq!(BANANA_SA[j], t);
            k += 1;
        }
    }

    #[test]
    fn rejects_mismatched_stride() {
        let d_sa = 2;
        let companion_buf = build_companion(BANANA_SA, d_sa);
        let companion = TextOrderSampling::parse(&companion_buf).unwrap().0;
        let mut buf = Vec::new();
        let mut builder = Builder::new(&mut buf);
        let result = TextOrderIsaSupport::construct(&companion, d_sa + 1, &mut builder);
        assert_eq!(
            Err(Error::Precondition("d_isa must equal the companion's d_sa")),
            result
        );
    }
}
