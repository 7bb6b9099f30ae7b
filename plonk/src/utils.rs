use crate::Fr;
use ark_ff::Field;

/// Run two independent computations, concurrently when the `parallel` feature is on.
pub fn join<A, B, RA, RB>(oper_a: A, oper_b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    #[cfg(feature = "parallel")]
    {
        rayon::join(oper_a, oper_b)
    }
    #[cfg(not(feature = "parallel"))]
    {
        (oper_a(), oper_b())
    }
}

/// Return `x^exp`.
#[inline]
pub fn pow_usize(x: &Fr, exp: usize) -> Fr {
    x.pow([exp as u64])
}
