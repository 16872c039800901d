//! C4 `fuzzy_sampling`, the delicate one: one sample per SA-stride block, chosen to maximise the
//! length of a globally increasing run of ISA values, so D3 can reconstruct ISA samples from this
//! structure's `inv` without storing them a second time (S:4.5).

use buffertk::Unpackable;
use prototk::FieldNumber;

use crate::bit_vector::sparse::BitVector;
use crate::bit_vector::BitVector as BitVectorTrait;
use crate::builder::{Builder, Helper};
use crate::cache::CacheConfig;
use crate::encoder::FixedWidthEncoder;
use crate::wavelet_tree::prefix::WaveletTree;
use crate::wavelet_tree::WaveletTree as WaveletTreeTrait;
use crate::Error;

use super::{ceil_div, SaSampling};

#[derive(Clone, Debug, Default, prototk_derive::Message)]
struct FuzzySamplingStub<'a> {
    #[prototk(1, uint64)]
    n: u64,
    #[prototk(2, uint64)]
    d_sa: u64,
    #[prototk(3, bytes)]
    marked_sa: &'a [u8],
    #[prototk(4, bytes)]
    marked_isa: &'a [u8],
    #[prototk(5, bytes)]
    inv_perm: &'a [u8],
}

/// Run-aware sampling: `marked_sa`/`marked_isa` each carry exactly `B = ceil(n/d_sa)` ones;
/// `inv_perm` is a wavelet tree over the rank-compressed chosen text positions, in SA-block order.
pub struct FuzzySampling<'a> {
    n: usize,
    d_sa: usize,
    marked_sa: BitVector<'a>,
    marked_isa: BitVector<'a>,
    inv_perm: WaveletTree<'a, FixedWidthEncoder>,
    // Retained alongside the parsed structures above purely so equality-by-value (S:4.1) can
    // compare serialised content without re-deriving it from the succinct representations.
    raw: (&'a [u8], &'a [u8], &'a [u8]),
}

impl PartialEq for FuzzySampling<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.d_sa == other.d_sa && self.raw == other.raw
    }
}
impl Eq for FuzzySampling<'_> {}

impl<'a> FuzzySampling<'a> {
    /// `marked_sa`, exposed so D3 can hold a `select1` back-reference to it.
    pub fn marked_sa(&self) -> &BitVector<'a> {
        &self.marked_sa
    }

    /// `select1` over `marked_isa`, D3's other back-reference.
    pub fn marked_isa_select(&self, x: usize) -> Option<usize> {
        self.marked_isa.select(x)
    }

    pub fn size(&self) -> usize {
        ceil_div(self.n, self.d_sa)
    }

    pub fn d_sa(&self) -> usize {
        self.d_sa
    }

    /// `inv_perm[k]`, the rank-compressed chosen text position for block `k`.  Raw: callers (D3)
    /// re-expand it through `marked_sa`'s `select1` themselves.
    pub fn inv(&self, k: usize) -> usize {
        self.inv_perm
            .access(k)
            .expect("k within [0, size())") as usize
    }
}

/// One block's winning index and the `min_prev` it establishes.
struct BlockPick {
    index: usize,
    value: usize,
    /// True when no candidate satisfied `ISA[p] >= min_prev`, i.e. this block starts a new
    /// monotone run (S:8, "monotone fuzzy run" invariant).
    new_run: bool,
}

fn pick_block(isa: &[usize], start: usize, end: usize, min_prev: usize) -> BlockPick {
    let mut p_min = start;
    for p in start..end {
        if isa[p] < isa[p_min] {
            p_min = p;
        }
    }
    let mut candidate: Option<usize> = None;
    for p in start..end {
        if isa[p] >= min_prev {
            match candidate {
                None => candidate = Some(p),
                Some(c) if isa[p] < isa[c] => candidate = Some(p),
                _ => {}
            }
        }
    }
    match candidate {
        Some(p_cnd) => BlockPick {
            index: p_cnd,
            value: isa[p_cnd],
            new_run: false,
        },
        None => BlockPick {
            index: p_min,
            value: isa[p_min],
            new_run: true,
        },
    }
}

impl SaSampling for FuzzySampling<'_> {
    type Output<'b> = FuzzySampling<'b>;

    fn construct<H: Helper>(
        cache: &CacheConfig,
        d_sa: usize,
        builder: &mut Builder<'_, H>,
    ) -> Result<(), Error> {
        if d_sa == 0 {
            return Err(Error::Precondition("d_sa must be >= 1"));
        }
        let isa: Vec<usize> = cache.isa_stream()?.collect();
        let n = isa.len();
        let b = ceil_div(n, d_sa);

        let mut marked_sa = vec![false; n];
        let mut marked_isa = vec![false; n];
        let mut inv_perm_raw = Vec::with_capacity(b);
        let mut min_prev = 0usize;
        let mut run_floor = 0usize;
        for block in 0..b {
            let start = block * d_sa;
            let end = std::cmp::min(start + d_sa, n);
            let pick = pick_block(&isa, start, end, min_prev);
            if pick.new_run {
                run_floor = pick.value;
            } else {
                debug_assert!(pick.value >= run_floor, "min_prev must not decrease within a run");
            }
            min_prev = pick.value;
            marked_isa[pick.index] = true;
            inv_perm_raw.push(min_prev);
            marked_sa[min_prev] = true;
        }
        if marked_sa.iter().filter(|&&m| m).count() != b
            || marked_isa.iter().filter(|&&m| m).count() != b
        {
            return Err(Error::InvariantViolation(
                "fuzzy sampling must choose exactly one text position and one SA index per block",
            ));
        }

        let compressed: Vec<u32> = inv_perm_raw
            .iter()
            .map(|&v| marked_sa[..v].iter().filter(|&&m| m).count() as u32)
            .collect();

        builder.append_u64(FieldNumber::must(1), n as u64);
        builder.append_u64(FieldNumber::must(2), d_sa as u64);
        let mut marked_sa_builder = builder.sub(FieldNumber::must(3));
        BitVector::construct(&marked_sa, &mut marked_sa_builder)?;
        let mut marked_isa_builder = builder.sub(FieldNumber::must(4));
        BitVector::construct(&marked_isa, &mut marked_isa_builder)?;
        let mut inv_perm_builder = builder.sub(FieldNumber::must(5));
        WaveletTree::<FixedWidthEncoder>::construct(&compressed, &mut inv_perm_builder)?;
        Ok(())
    }

    fn parse<'b, 'c: 'b>(buf: &'c [u8]) -> Result<(FuzzySampling<'b>, &'c [u8]), Error> {
        let (
            FuzzySamplingStub {
                n,
                d_sa,
                marked_sa: marked_sa_bytes,
                marked_isa: marked_isa_bytes,
                inv_perm: inv_perm_bytes,
            },
            buf,
        ) = FuzzySamplingStub::unpack(buf).map_err(|_| Error::Unparseable)?;
        let marked_sa = BitVector::parse(marked_sa_bytes)?.0;
        let marked_isa = BitVector::parse(marked_isa_bytes)?.0;
        let inv_perm = WaveletTree::<FixedWidthEncoder>::unpack(inv_perm_bytes)
            .map_err(|_| Error::InvalidWaveletTree)?
            .0;
        Ok((
            FuzzySampling {
                n: n as usize,
                d_sa: d_sa as usize,
                marked_sa,
                marked_isa,
                inv_perm,
                raw: (marked_sa_bytes, marked_isa_bytes, inv_perm_bytes),
            },
            buf,
        ))
    }

    fn len(&self) -> usize {
        self.n
    }

    fn is_sampled(&self, i: usize) -> bool {
        self.marked_sa.access(i).unwrap_or(false)
    }

    fn get(&self, i: usize) -> usize {
        debug_assert!(self.is_sampled(i));
        let rank = self.marked_sa.rank(i).expect("i < n");
        let block = self
            .inv_perm
            .select_q(rank as u32, 1)
            .expect("rank corresponds to a chosen block")
            - 1;
        self.marked_isa
            .select(block + 1)
            .expect("block < size()")
            - 1
    }

    fn text_order(&self) -> bool {
        true
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
