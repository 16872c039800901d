//! A small, hand-verified text/SA/ISA/BWT fixture shared by this crate's unit tests.  Grounded on
//! the "banana" example worked by hand in the literature on suffix arrays: `T = "banana$"`, with
//! `$` sorting before every letter.

pub const BANANA: &str = "banana$";
pub const BANANA_SA: &[usize] = &[6, 5, 3, 1, 0, 4, 2];
pub const BANANA_ISA: &[usize] = &[4, 3, 6, 2, 5, 1, 0];
pub const BANANA_BWT: &str = "annb$aa";

pub fn banana_sa_bytes() -> Vec<u8> {
    let width = crate::cache::width_for(BANANA.len());
    crate::cache::encode_iv(BANANA_SA, width)
}

pub fn banana_isa_bytes() -> Vec<u8> {
    let width = crate::cache::width_for(BANANA.len());
    crate::cache::encode_iv(BANANA_ISA, width)
}

pub fn banana_bwt_bytes() -> Vec<u8> {
    let chars: Vec<usize> = BANANA_BWT.chars().map(|c| c as usize).collect();
    crate::cache::encode_iv(&chars, 32)
}
