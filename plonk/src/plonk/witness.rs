use crate::errors::{PlonkError, Result, SetupFault};
use crate::plonk::constraint_system::{Circuit, N_WIRES_PER_GATE};
use crate::Fr;
use ark_ff::Field;
use ark_std::UniformRand;
use rand_core::{CryptoRng, RngCore};

/// Map a witness to the values of the `l`, `r` and `o` wires on each of the `n` rows.
/// Row `i` is the domain point `omega^i`.
pub fn compute_lro(
    circuit: &Circuit,
    witness: &[Fr],
    n: usize,
) -> Result<[Vec<Fr>; N_WIRES_PER_GATE]> {
    if witness.len() != circuit.nb_variables() {
        return Err(PlonkError::Setup(SetupFault::WitnessLength {
            expected: circuit.nb_variables(),
            got: witness.len(),
        }));
    }
    if circuit.nb_rows() > n {
        return Err(PlonkError::Setup(SetupFault::TooManyRows {
            rows: circuit.nb_rows(),
            domain: n,
        }));
    }
    let wires = circuit.wire_rows(n);
    Ok(wires.map(|column| column.iter().map(|var| witness[*var]).collect()))
}

/// Check the witness against the circuit. When it does not satisfy the circuit and
/// `force` is set, the internal variables are replaced with `r, 2r, 4r, ...` for a
/// random `r` so that a (rejected) proof can still be produced.
pub fn prepare_witness<R: CryptoRng + RngCore>(
    prng: &mut R,
    circuit: &Circuit,
    witness: &[Fr],
    force: bool,
) -> Result<Vec<Fr>> {
    match circuit.is_satisfied_by(witness) {
        Ok(()) => Ok(witness.to_vec()),
        Err(PlonkError::WitnessUnsatisfied { gate }) if force => {
            tracing::warn!(gate, "witness does not satisfy the circuit, forcing internal values");
            let mut forced = witness.to_vec();
            let mut value = Fr::rand(prng);
            for v in forced[circuit.nb_public + circuit.nb_secret..].iter_mut() {
                *v = value;
                value.double_in_place();
            }
            Ok(forced)
        }
        Err(e) => Err(e),
    }
}
