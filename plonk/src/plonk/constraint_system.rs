use crate::errors::{PlonkError, Result, SetupFault};
use crate::Fr;
use ark_ff::{One, Zero};

/// Variable index
pub type VarIndex = usize;

/// Number of wires of a gate.
pub const N_WIRES_PER_GATE: usize = 3;

/// Number of selectors of a gate: `ql, qr, qm, qo, qk`.
pub const N_SELECTORS: usize = 5;

/// A gate `ql*l + qr*r + qm*l*r + qo*o + qk = 0` over the variables `wires = [l, r, o]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate {
    /// The left, right and output variables.
    pub wires: [VarIndex; N_WIRES_PER_GATE],
    /// The selectors `[ql, qr, qm, qo, qk]`.
    pub selectors: [Fr; N_SELECTORS],
}

impl Gate {
    /// Evaluate the gate on a witness.
    pub fn eval(&self, witness: &[Fr]) -> Fr {
        let [l, r, o] = self.wires.map(|w| witness[w]);
        let [ql, qr, qm, qo, qk] = self.selectors;
        ql * l + qr * r + qm * l * r + qo * o + qk
    }
}

/// An arithmetic circuit over a witness laid out as `[public | secret | internal]`.
///
/// Rows of the evaluation domain are the public rows (one per public input), then one row
/// per gate, then padding rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Circuit {
    /// Number of public inputs, the prefix of the witness.
    pub nb_public: usize,
    /// Number of secret inputs.
    pub nb_secret: usize,
    /// Number of internal variables.
    pub nb_internal: usize,
    /// The gates.
    pub gates: Vec<Gate>,
    padded: usize,
}

impl Circuit {
    /// Create a circuit without gates.
    pub fn new(nb_public: usize, nb_secret: usize, nb_internal: usize) -> Circuit {
        Circuit {
            nb_public,
            nb_secret,
            nb_internal,
            gates: vec![],
            padded: 0,
        }
    }

    /// Number of variables, i.e. the length of a witness.
    pub fn nb_variables(&self) -> usize {
        self.nb_public + self.nb_secret + self.nb_internal
    }

    /// Number of used rows.
    pub fn nb_rows(&self) -> usize {
        self.nb_public + self.gates.len()
    }

    /// The size of the evaluation domain.
    pub fn size(&self) -> usize {
        self.nb_rows().next_power_of_two().max(self.padded)
    }

    /// Ask for a domain of at least `n` rows.
    pub fn pad(&mut self, n: usize) {
        self.padded = n.next_power_of_two();
    }

    /// Append a gate.
    pub fn insert_gate(
        &mut self,
        wires: [VarIndex; N_WIRES_PER_GATE],
        selectors: [Fr; N_SELECTORS],
    ) -> Result<()> {
        if let Some(wire) = wires.iter().find(|w| **w >= self.nb_variables()) {
            return Err(PlonkError::Setup(SetupFault::InvalidWire { wire: *wire }));
        }
        self.gates.push(Gate { wires, selectors });
        Ok(())
    }

    /// Insert `l + r = o`.
    pub fn insert_add_gate(&mut self, l: VarIndex, r: VarIndex, o: VarIndex) -> Result<()> {
        let (one, zero) = (Fr::one(), Fr::zero());
        self.insert_gate([l, r, o], [one, one, zero, -one, zero])
    }

    /// Insert `l * r = o`.
    pub fn insert_mul_gate(&mut self, l: VarIndex, r: VarIndex, o: VarIndex) -> Result<()> {
        let (one, zero) = (Fr::one(), Fr::zero());
        self.insert_gate([l, r, o], [zero, zero, one, -one, zero])
    }

    /// Insert `var = constant`.
    pub fn insert_constant_gate(&mut self, var: VarIndex, constant: Fr) -> Result<()> {
        let (one, zero) = (Fr::one(), Fr::zero());
        self.insert_gate([var, var, var], [one, zero, zero, zero, -constant])
    }

    /// The variable of each wire on each of the `n` rows.
    pub fn wire_rows(&self, n: usize) -> [Vec<VarIndex>; N_WIRES_PER_GATE] {
        let mut rows: [Vec<VarIndex>; N_WIRES_PER_GATE] = Default::default();
        for (c, column) in rows.iter_mut().enumerate() {
            column.reserve(n);
            column.extend((0..self.nb_public).map(|i| if c == 0 { i } else { 0 }));
            column.extend(self.gates.iter().map(|g| g.wires[c]));
            column.resize(n.max(column.len()), 0);
        }
        rows
    }

    /// The value of each selector on each of the `n` rows. Public rows carry `ql = -1`.
    pub fn selector_rows(&self, n: usize) -> [Vec<Fr>; N_SELECTORS] {
        let mut rows: [Vec<Fr>; N_SELECTORS] = Default::default();
        for (s, column) in rows.iter_mut().enumerate() {
            column.reserve(n);
            let public = if s == 0 { -Fr::one() } else { Fr::zero() };
            column.extend((0..self.nb_public).map(|_| public));
            column.extend(self.gates.iter().map(|g| g.selectors[s]));
            column.resize(n.max(column.len()), Fr::zero());
        }
        rows
    }

    /// Check that the witness has the right length and satisfies every gate.
    pub fn is_satisfied_by(&self, witness: &[Fr]) -> Result<()> {
        if witness.len() != self.nb_variables() {
            return Err(PlonkError::Setup(SetupFault::WitnessLength {
                expected: self.nb_variables(),
                got: witness.len(),
            }));
        }
        match self.gates.iter().position(|g| !g.eval(witness).is_zero()) {
            Some(gate) => Err(PlonkError::WitnessUnsatisfied { gate }),
            None => Ok(()),
        }
    }
}

/// A permutation of the `3n` wire slots, slot `c * n + i` being wire `c` of row `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// The identity on `3n` slots.
    pub fn identity(n: usize) -> Permutation {
        Permutation((0..N_WIRES_PER_GATE * n).collect())
    }

    /// Build a permutation from its images, checking it is a bijection.
    pub fn from_slots(slots: Vec<usize>) -> Result<Permutation> {
        let mut seen = vec![false; slots.len()];
        for s in slots.iter() {
            match seen.get_mut(*s) {
                Some(flag) if !*flag => *flag = true,
                _ => return Err(PlonkError::Setup(SetupFault::InvalidPermutation)),
            }
        }
        Ok(Permutation(slots))
    }

    /// Build the permutation on `size` slots whose cycles are the given classes.
    /// Slots outside every class are fixed points.
    pub fn from_classes<I>(size: usize, classes: I) -> Result<Permutation>
    where
        I: IntoIterator<Item = Vec<usize>>,
    {
        let mut slots: Vec<usize> = (0..size).collect();
        for class in classes {
            for (i, slot) in class.iter().enumerate() {
                let next = class[(i + 1) % class.len()];
                match slots.get_mut(*slot) {
                    Some(image) => *image = next,
                    None => return Err(PlonkError::Setup(SetupFault::InvalidPermutation)),
                }
            }
        }
        Self::from_slots(slots)
    }

    /// Link every slot referencing the same variable, padding and public rows included.
    pub fn from_wiring(circuit: &Circuit, n: usize) -> Result<Permutation> {
        let mut classes: Vec<Vec<usize>> = vec![vec![]; circuit.nb_variables().max(1)];
        for (c, column) in circuit.wire_rows(n).iter().enumerate() {
            if column.len() > n {
                return Err(PlonkError::Setup(SetupFault::TooManyRows {
                    rows: column.len(),
                    domain: n,
                }));
            }
            for (i, var) in column.iter().enumerate() {
                classes[*var].push(c * n + i);
            }
        }
        Self::from_classes(N_WIRES_PER_GATE * n, classes.into_iter().filter(|c| c.len() > 1))
    }

    /// The image of each slot.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the permutation is on zero slots.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
