//! D3 `fuzzy_isa_support`: a non-owning reference to a companion C4 instance plus a `select1` over
//! its SA-side marks (S:4.8).

use crate::bit_vector::BitVector as BitVectorTrait;
use crate::sa_sampling::c4::FuzzySampling;
use crate::sa_sampling::SaSampling;

use super::IsaSampling;

/// Holds a non-owning back-reference to its companion [FuzzySampling]; re-bind by constructing a
/// fresh one against the companion after any move, copy, or load (see [crate::ip]'s design note).
pub struct FuzzyIsaSupport<'r, 'c> {
    d_isa: usize,
    companion: &'r FuzzySampling<'c>,
}

impl<'r, 'c> FuzzyIsaSupport<'r, 'c> {
    /// Precondition: `d_isa == companion.d_sa()`, enforced by construction of the companion C4
    /// with the same stride; checked here defensively since the two are built independently.
    pub fn new(companion: &'r FuzzySampling<'c>, d_isa: usize) -> Self {
        FuzzyIsaSupport { d_isa, companion }
    }
}

impl IsaSampling for FuzzyIsaSupport<'_, '_> {
    fn len(&self) -> usize {
        self.companion.len()
    }

    /// Preserved literally per S:4.8: unlike D1/D2's `X[i]`, this does not divide `i` by `d_isa`
    /// first — `i` here is already a block index in `[0, companion.size())`.
    fn x(&self, i: usize) -> usize {
        self.companion.inv(i)
    }

    fn sample_leq(&self, i: usize) -> (usize, usize) {
        let mut ci = i / self.d_isa;
        let mut j = self
            .companion
            .marked_isa_select(ci + 1)
            .expect("ci within companion.size()")
            - 1;
        if j > i {
            ci = (ci + self.companion.size() - 1) % self.companion.size();
            j = self
                .companion
                .marked_isa_select(ci + 1)
                .expect("ci within companion.size()")
                - 1;
        }
        let value = self
            .companion
            .marked_sa()
            .select(self.companion.inv(ci) + 1)
            .expect("inv(ci) within [0, size())")
            - 1;
        (value, j)
    }

    fn sample_geq(&self, i: usize) -> (usize, usize) {
        let mut ci = i / self.d_isa;
        let mut j = self
            .companion
            .marked_isa_select(ci + 1)
            .expect("ci within companion.size()")
            - 1;
        if j < i {
            ci = (ci + 1) % self.companion.size();
            j = self
                .companion
                .marked_isa_select(ci + 1)
                .expect("ci within companion.size()")
                - 1;
        }
        let value = self
            .companion
            .marked_sa()
            .select(self.companion.inv(ci) + 1)
            .expect("inv(ci) within [0, size())")
            - 1;
        (value, j)
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
