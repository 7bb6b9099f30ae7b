use ark_serialize::SerializationError;
use std::fmt;

/// Polynomial commitment scheme errors.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PolyComSchemeError {
    /// The degree of the polynomial is higher than the maximum degree allowed.
    DegreeError {
        /// Degree of the polynomial.
        degree: usize,
        /// Maximum degree of the public parameters.
        max_degree: usize,
    },
    /// It is not possible to compute the proof as F(x) != y.
    PCSProveEvalError,
    /// The pairing check of an opening failed.
    PCSVerifyError,
    /// The lists passed to a batch operation have different lengths.
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },
    /// An element could not be serialized.
    SerializationError,
    /// The public parameters lack the generator elements needed to verify.
    MissingParameters,
}

impl fmt::Display for PolyComSchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolyComSchemeError::DegreeError { degree, max_degree } => write!(
                f,
                "The degree {} of the polynomial is higher than the maximum degree {} allowed.",
                degree, max_degree
            ),
            PolyComSchemeError::PCSProveEvalError => {
                f.write_str("It is not possible to compute the proof as F(x) != y.")
            }
            PolyComSchemeError::PCSVerifyError => f.write_str("The opening proof does not verify."),
            PolyComSchemeError::LengthMismatch { expected, got } => {
                write!(f, "Expected {} elements, got {}.", expected, got)
            }
            PolyComSchemeError::SerializationError => f.write_str("Serialization failed."),
            PolyComSchemeError::MissingParameters => {
                f.write_str("The public parameters are too short to verify.")
            }
        }
    }
}

impl From<SerializationError> for PolyComSchemeError {
    fn from(_: SerializationError) -> Self {
        PolyComSchemeError::SerializationError
    }
}
