use crate::Fr;
use ark_ff::{FftField, Field, One, Zero};
use ark_poly::{EvaluationDomain as ArkDomain, Radix2EvaluationDomain};
use ark_std::UniformRand;
use rand_core::{CryptoRng, RngCore};

/// Field polynomial.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FpPolynomial {
    /// Coefficients of the polynomial, low-order first.
    pub coefs: Vec<Fr>,
}

impl FpPolynomial {
    /// Return the polynomial coefs reference.
    pub fn get_coefs_ref(&self) -> &[Fr] {
        self.coefs.as_slice()
    }

    /// Return the constant zero polynomial
    /// # Example
    /// ```
    /// use piano_plonk::poly_commit::field_polynomial::FpPolynomial;
    /// use piano_plonk::Fr;
    /// use ark_ff::{One, Zero};
    /// let poly = FpPolynomial::zero();
    /// assert_eq!(poly.degree(), 0);
    /// assert_eq!(poly.eval(&Fr::one()), Fr::zero());
    /// ```
    pub fn zero() -> Self {
        Self::from_coefs(vec![Fr::zero()])
    }

    /// Return the constant one polynomial
    pub fn one() -> Self {
        Self::from_coefs(vec![Fr::one()])
    }

    /// Build a polynomial from the coefficient vector, low-order coefficient first.
    /// High-order zero coefficient are trimmed.
    /// # Example
    /// ```
    /// use piano_plonk::poly_commit::field_polynomial::FpPolynomial;
    /// use piano_plonk::Fr;
    /// use ark_ff::{One, Zero};
    /// let zero = Fr::zero();
    /// let one = Fr::one();
    /// let two = one + one;
    /// let poly = FpPolynomial::from_coefs(vec![one, zero, one]);
    /// assert_eq!(poly.degree(), 2);
    /// assert_eq!(poly.eval(&one), two);
    /// let poly2 = FpPolynomial::from_coefs(vec![one, zero, one, zero, zero]);
    /// assert_eq!(poly, poly2);
    /// ```
    pub fn from_coefs(coefs: Vec<Fr>) -> Self {
        let mut p = FpPolynomial { coefs };
        p.trim_coefs();
        p
    }

    /// Return a polynomial of `degree` + 1 uniformly random coefficients.
    pub fn random<R: CryptoRng + RngCore>(prng: &mut R, degree: usize) -> Self {
        Self::from_coefs((0..=degree).map(|_| Fr::rand(prng)).collect())
    }

    /// Remove high degree zero-coefficients
    fn trim_coefs(&mut self) {
        while self.coefs.len() > 1 && self.coefs.last().map_or(false, |c| c.is_zero()) {
            self.coefs.pop();
        }
        if self.coefs.is_empty() {
            self.coefs.push(Fr::zero());
        }
    }

    /// Return degree of the polynomial
    pub fn degree(&self) -> usize {
        self.coefs.len().saturating_sub(1)
    }

    /// Test if polynomial is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.degree() == 0 && self.coefs[0].is_zero()
    }

    /// Evaluate a polynomial on a point.
    pub fn eval(&self, point: &Fr) -> Fr {
        self.coefs
            .iter()
            .rev()
            .fold(Fr::zero(), |acc, coef| acc * point + coef)
    }

    /// Add another polynomial to self.
    pub fn add_assign(&mut self, other: &Self) {
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), Fr::zero());
        }
        for (self_coef, other_coef) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            *self_coef += other_coef;
        }
        self.trim_coefs();
    }

    /// Add with another polynomial, producing a new polynomial.
    pub fn add(&self, other: &Self) -> Self {
        let mut new = self.clone();
        new.add_assign(other);
        new
    }

    /// Subtracts another polynomial from self.
    /// # Example:
    /// ```
    /// use piano_plonk::poly_commit::field_polynomial::FpPolynomial;
    /// use piano_plonk::Fr;
    /// use ark_ff::{One, Zero};
    /// let zero = Fr::zero();
    /// let one = Fr::one();
    /// let two = one + one;
    /// let three = two + one;
    /// let mut poly1 = FpPolynomial::from_coefs(vec![three, three, two]);
    /// let poly2 = FpPolynomial::from_coefs(vec![three, two, one, one]);
    /// poly1.sub_assign(&poly2);
    /// let poly_expected = FpPolynomial::from_coefs(vec![zero, one, one, -one]);
    /// assert_eq!(poly1, poly_expected);
    /// ```
    pub fn sub_assign(&mut self, other: &Self) {
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), Fr::zero());
        }
        for (self_coef, other_coef) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            *self_coef -= other_coef;
        }
        self.trim_coefs();
    }

    /// Subtract another polynomial from self, producing a new polynomial.
    pub fn sub(&self, other: &Self) -> Self {
        let mut new = self.clone();
        new.sub_assign(other);
        new
    }

    /// Add `coef` to the coefficient of order `order`.
    pub fn add_coef_assign(&mut self, coef: &Fr, order: usize) {
        if self.coefs.len() <= order {
            self.coefs.resize(order + 1, Fr::zero());
        }
        self.coefs[order] += coef;
        self.trim_coefs();
    }

    /// Multiply polynomial by a constant scalar.
    pub fn mul_scalar_assign(&mut self, scalar: &Fr) {
        for coef in self.coefs.iter_mut() {
            *coef *= scalar;
        }
        self.trim_coefs();
    }

    /// Multiply polynomial by a constant scalar into a new polynomial.
    pub fn mul_scalar(&self, scalar: &Fr) -> Self {
        let mut new = self.clone();
        new.mul_scalar_assign(scalar);
        new
    }

    /// Multiply the polynomial variable by a scalar.
    /// mul_var(\sum a_i X^i, b) = \sum a_i b^i X^i
    pub fn mul_var_assign(&mut self, scalar: &Fr) {
        let mut r = Fr::one();
        for coef in self.coefs.iter_mut() {
            *coef *= r;
            r *= scalar;
        }
    }

    /// Divide by `X - point`, returning the quotient and the remainder `self(point)`.
    /// # Example:
    /// ```
    /// use piano_plonk::poly_commit::field_polynomial::FpPolynomial;
    /// use piano_plonk::Fr;
    /// use ark_ff::{One, Zero};
    /// let one = Fr::one();
    /// let two = one + one;
    /// // X^2 + X + 1 = (X - 1)(X + 2) + 3
    /// let poly = FpPolynomial::from_coefs(vec![one, one, one]);
    /// let (q, r) = poly.div_by_linear(&one);
    /// assert_eq!(q, FpPolynomial::from_coefs(vec![two, one]));
    /// assert_eq!(r, two + one);
    /// ```
    pub fn div_by_linear(&self, point: &Fr) -> (Self, Fr) {
        if self.coefs.len() < 2 {
            let constant = self.coefs.first().copied().unwrap_or_else(Fr::zero);
            return (Self::zero(), constant);
        }
        let mut quo = vec![Fr::zero(); self.coefs.len() - 1];
        let mut carry = Fr::zero();
        for (i, coef) in self.coefs.iter().enumerate().rev() {
            let cur = *coef + carry * point;
            if i == 0 {
                return (Self::from_coefs(quo), cur);
            }
            quo[i - 1] = cur;
            carry = cur;
        }
        (Self::from_coefs(quo), carry)
    }

    /// Split the coefficients into consecutive chunks of `chunk_len` coefficients.
    pub fn split(&self, chunk_len: usize, nb_chunks: usize) -> Vec<Self> {
        (0..nb_chunks)
            .map(|i| {
                let start = (i * chunk_len).min(self.coefs.len());
                let end = ((i + 1) * chunk_len).min(self.coefs.len());
                Self::from_coefs(self.coefs[start..end].to_vec())
            })
            .collect()
    }
}

/// A multiplicative subgroup of size 2^k of the scalar field, with its coset
/// shifted by the field generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluationDomain {
    inner: Radix2EvaluationDomain<Fr>,
}

impl EvaluationDomain {
    /// Create the subgroup of exactly `size` elements, or None when `size` is not
    /// a power of two supported by the field.
    pub fn new(size: usize) -> Option<Self> {
        if !size.is_power_of_two() {
            return None;
        }
        let inner = Radix2EvaluationDomain::<Fr>::new(size)?;
        (inner.size() == size).then_some(Self { inner })
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// The primitive root of unity generating the subgroup.
    pub fn generator(&self) -> Fr {
        self.inner.group_gen
    }

    /// Inverse of the generator.
    pub fn generator_inv(&self) -> Fr {
        self.inner.group_gen_inv
    }

    /// Inverse of the size as a field element.
    pub fn size_inv(&self) -> Fr {
        self.inner.size_inv
    }

    /// The shift of the coset used for quotient evaluations.
    pub fn coset_shift() -> Fr {
        Fr::GENERATOR
    }

    /// The `i`-th element, `generator^i`.
    pub fn element(&self, i: usize) -> Fr {
        self.inner.element(i)
    }

    /// All elements in order.
    pub fn elements(&self) -> Vec<Fr> {
        self.inner.elements().collect()
    }

    /// Evaluate `coefs` on the subgroup. Longer inputs are first reduced modulo
    /// `X^size - 1`, which leaves the values on the subgroup unchanged.
    pub fn fft(&self, coefs: &[Fr]) -> Vec<Fr> {
        let size = self.size();
        if coefs.len() <= size {
            return self.inner.fft(coefs);
        }
        let mut reduced = coefs[..size].to_vec();
        for (i, coef) in coefs.iter().enumerate().skip(size) {
            reduced[i % size] += coef;
        }
        self.inner.fft(&reduced)
    }

    /// Interpolate evaluations over the subgroup into a polynomial.
    pub fn ifft(&self, evals: &[Fr]) -> FpPolynomial {
        debug_assert!(evals.len() <= self.size());
        FpPolynomial::from_coefs(self.inner.ifft(evals))
    }

    /// Evaluate a polynomial on the coset `shift * H`.
    pub fn coset_fft(&self, poly: &FpPolynomial) -> Vec<Fr> {
        let mut shifted = poly.clone();
        shifted.mul_var_assign(&Self::coset_shift());
        self.fft(shifted.get_coefs_ref())
    }

    /// Interpolate evaluations over the coset `shift * H`.
    pub fn coset_ifft(&self, evals: &[Fr]) -> FpPolynomial {
        let mut poly = self.ifft(evals);
        let shift_inv = Self::coset_shift().inverse().unwrap_or_else(Fr::one);
        poly.mul_var_assign(&shift_inv);
        poly.trim_coefs();
        poly
    }

    /// Elements of the coset `shift * H` in order.
    pub fn coset_elements(&self) -> Vec<Fr> {
        let shift = Self::coset_shift();
        self.inner.elements().map(|e| e * shift).collect()
    }

    /// Evaluate `X^size - 1` at `point`.
    pub fn evaluate_vanishing(&self, point: &Fr) -> Fr {
        self.inner.evaluate_vanishing_polynomial(*point)
    }

    /// Evaluate all Lagrange basis polynomials of the subgroup at `point`.
    pub fn lagrange_basis_at(&self, point: &Fr) -> Vec<Fr> {
        self.inner.evaluate_all_lagrange_coefficients(*point)
    }
}

#[cfg(test)]
mod test {
    use super::{EvaluationDomain, FpPolynomial};
    use crate::Fr;
    use ark_ff::{One, Zero};
    use ark_std::UniformRand;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng;

    #[test]
    fn test_fft() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        for size in [1usize, 2, 4, 16, 32] {
            let domain = EvaluationDomain::new(size).unwrap();
            let polynomial = FpPolynomial::random(&mut prng, size - 1);
            let fft = domain.fft(polynomial.get_coefs_ref());
            for (i, v) in fft.iter().enumerate() {
                assert_eq!(*v, polynomial.eval(&domain.element(i)));
            }
            assert_eq!(domain.ifft(&fft), polynomial);
        }
        assert!(EvaluationDomain::new(3).is_none());
        assert!(EvaluationDomain::new(0).is_none());
    }

    #[test]
    fn test_fft_longer_than_domain() {
        let mut prng = ChaChaRng::from_seed([3u8; 32]);
        let domain = EvaluationDomain::new(8).unwrap();
        let polynomial = FpPolynomial::random(&mut prng, 20);
        let fft = domain.fft(polynomial.get_coefs_ref());
        assert_eq!(fft.len(), 8);
        for (i, v) in fft.iter().enumerate() {
            assert_eq!(*v, polynomial.eval(&domain.element(i)));
        }

        let evals = domain.coset_fft(&polynomial);
        for (v, x) in evals.iter().zip(domain.coset_elements()) {
            assert_eq!(*v, polynomial.eval(&x));
        }
    }

    #[test]
    fn test_coset_fft() {
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let domain = EvaluationDomain::new(16).unwrap();
        let polynomial = FpPolynomial::random(&mut prng, 11);
        let evals = domain.coset_fft(&polynomial);
        for (v, x) in evals.iter().zip(domain.coset_elements()) {
            assert_eq!(*v, polynomial.eval(&x));
            assert!(!domain.evaluate_vanishing(&x).is_zero());
        }
        assert_eq!(domain.coset_ifft(&evals), polynomial);
    }

    #[test]
    fn test_div_by_linear() {
        let mut prng = ChaChaRng::from_seed([2u8; 32]);
        let poly = FpPolynomial::random(&mut prng, 9);
        let point = Fr::rand(&mut prng);
        let (q, rem) = poly.div_by_linear(&point);
        assert_eq!(rem, poly.eval(&point));
        let x = Fr::rand(&mut prng);
        assert_eq!(q.eval(&x) * (x - point) + rem, poly.eval(&x));

        let constant = FpPolynomial::from_coefs(vec![Fr::one()]);
        assert_eq!(constant.div_by_linear(&point), (FpPolynomial::zero(), Fr::one()));

        let empty = FpPolynomial { coefs: vec![] };
        assert_eq!(empty.div_by_linear(&point), (FpPolynomial::zero(), Fr::zero()));
    }

    #[test]
    fn test_lagrange_basis() {
        let domain = EvaluationDomain::new(8).unwrap();
        let basis = domain.lagrange_basis_at(&domain.element(3));
        for (i, l) in basis.iter().enumerate() {
            assert_eq!(*l, if i == 3 { Fr::one() } else { Fr::zero() });
        }
    }
}
