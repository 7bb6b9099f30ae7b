#![allow(clippy::needless_borrow)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]

#[macro_use]
extern crate serde_derive;

/// Module for the error kinds shared by the provers and verifiers.
pub mod errors;

/// Module for the single-axis PLONK protocol.
pub mod plonk;

/// Module for polynomials and polynomial commitments.
pub mod poly_commit;

/// Module for the two-axis distributed protocol.
pub mod distributed;

/// Module for small shared helpers.
pub mod utils;

pub use ark_bn254::{Bn254, Fr, G1Affine, G1Projective, G2Affine, G2Projective};
