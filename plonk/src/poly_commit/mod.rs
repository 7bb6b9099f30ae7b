/// Module for polynomial commitment errors.
pub mod errors;

/// Module for field polynomials and evaluation domains.
pub mod field_polynomial;

/// Module for the KZG polynomial commitment scheme.
pub mod kzg_poly_com;

/// Module for the distributed (row-axis) KZG commitment scheme.
pub mod dkzg;

/// Module for polynomial commitment traits, folding and batch verification.
pub mod pcs;

/// Module for polynomial commitment transcript.
pub mod transcript;
