//! Inverse-permutation support: given an [IV] encoding a permutation `pi` of `[0, n)`, answer
//! `pi^-1(i)` without re-deriving it by brute force.
//!
//! The source this crate learns from models such a support as a non-owning view holding a
//! back-reference to the permutation it was built against, re-bound after every move, copy, or
//! load (see the design notes on back-references).  Rust's borrow checker already forbids using a
//! reference before its owner exists, so here that re-binding is just: `parse` again from the new
//! owner's bytes.  There is no separate `rebind` method; `InversePermutation::parse` plays that
//! role every time it is called.

use buffertk::Unpackable;
use prototk::FieldNumber;

use crate::bit_array::{BitArray, Builder as BitArrayBuilder};
use crate::builder::{Builder, Helper};
use crate::cache::width_for;
use crate::Error;

///////////////////////////////////////// InversePermutation ///////////////////////////////////////

#[derive(Clone, Debug, Default, prototk_derive::Message)]
struct InversePermutationStub<'a> {
    #[prototk(1, uint32)]
    size: u32,
    #[prototk(2, uint32)]
    bits: u32,
    #[prototk(3, bytes)]
    inverse: &'a [u8],
}

/// `InversePermutation::construct(perm)` stores `perm`'s inverse; `get(k)` answers `perm^-1(k)`.
#[derive(Debug)]
pub struct InversePermutation<'a> {
    size: usize,
    bits: u8,
    inverse: BitArray<'a>,
}

impl<'a> InversePermutation<'a> {
    /// `perm` must be a permutation of `[0, perm.len())`.
    pub fn construct<H: Helper>(perm: &[usize], builder: &mut Builder<H>) -> Result<(), Error> {
        let size = perm.len();
        let bits = width_for(size).max(1) as u8;
        let mut inverse = vec![0usize; size];
        for (position, &value) in perm.iter().enumerate() {
            if value >= size {
                return Err(Error::InvariantViolation("permutation value out of range"));
            }
            inverse[value] = position;
        }
        let mut words = BitArrayBuilder::with_capacity(size * bits as usize);
        for value in inverse.iter() {
            words.push_word(*value as u64, bits as usize);
        }
        builder.append_u32(FieldNumber::must(1), size as u32);
        builder.append_u32(FieldNumber::must(2), bits as u32);
        builder.append_bytes(FieldNumber::must(3), &words.seal());
        Ok(())
    }

    pub fn parse<'b, 'c: 'b>(buf: &'c [u8]) -> Result<(InversePermutation<'b>, &'c [u8]), Error> {
        let (
            InversePermutationStub {
                size,
                bits,
                inverse,
            },
            buf,
        ) = InversePermutationStub::unpack(buf).map_err(|_| Error::Unparseable)?;
        Ok((
            InversePermutation {
                size: size as usize,
                bits: bits as u8,
                inverse: BitArray::new(inverse),
            },
            buf,
        ))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the position `p` such that the source permutation has `perm[p] == k`.
    pub fn get(&self, k: usize) -> Option<usize> {
        if k >= self.size {
            return None;
        }
        self.inverse
            .load(k * self.bits as usize, self.bits as usize)
            .map(|v| v as usize)
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_a_permutation() {
        let perm = vec![3usize, 1, 4, 0, 5, 2, 7, 6];
        let mut buf = Vec::new();
        {
            let mut builder = Builder::new(&mut buf);
            InversePermutation::construct(&perm, &mut builder).unwrap();
        }
        let ip = InversePermutation::parse(&buf).unwrap().0;
        assert_eq!(perm.len(), ip.size());
        for (position, value) in perm.iter().enumerate() {
            assert_eq!(Some(position), ip.get(*value));
        }
    }

    #[test]
    fn out_of_range_is_none() {
        let perm = vec![1usize, 0];
        let mut buf = Vec::new();
        {
            let mut builder = Builder::new(&mut buf);
            InversePermutation::construct(&perm, &mut builder).unwrap();
        }
        let ip = InversePermutation::parse(&buf).unwrap().0;
        assert_eq!(None, ip.get(2));
    }
}
