//! Zeros of the ordinary Bessel polynomial
//!
//! `y_n(x)` is evaluated through its three-term recurrence in double-double
//! arithmetic. The expanded coefficient form is too ill-conditioned in f64
//! to locate the zeros beyond order ~15, and the recurrence loses the same
//! accuracy near the zeros when run in plain f64.

use crate::error::{EngineError, Result};
use num_complex::Complex64;
use std::ops::{Add, Mul, Neg};

const MAX_ITERATIONS: usize = 100;

/// Relative Aberth step at which the zeros are considered settled
const STEP_TOLERANCE: f64 = 1e-14;

/// The zeros of every `y_n` sum to -1; larger deviations mean no convergence
const SUM_TOLERANCE: f64 = 1e-10;

/// Unevaluated sum `hi + lo` carrying roughly twice the f64 precision
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DoubleDouble {
    hi: f64,
    lo: f64,
}

/// Error-free `a + b`
fn two_sum(a: f64, b: f64) -> DoubleDouble {
    let hi = a + b;
    let b_virtual = hi - a;
    let lo = (a - (hi - b_virtual)) + (b - b_virtual);
    DoubleDouble { hi, lo }
}

impl DoubleDouble {
    fn value(self) -> f64 {
        self.hi + self.lo
    }
}

impl From<f64> for DoubleDouble {
    fn from(hi: f64) -> Self {
        Self { hi, lo: 0.0 }
    }
}

impl Add for DoubleDouble {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let s = two_sum(self.hi, other.hi);
        two_sum(s.hi, s.lo + (self.lo + other.lo))
    }
}

impl Mul<f64> for DoubleDouble {
    type Output = Self;

    fn mul(self, b: f64) -> Self {
        let p = self.hi * b;
        // Exact rounding error of the product
        let e = self.hi.mul_add(b, -p);
        two_sum(p, e + self.lo * b)
    }
}

impl Neg for DoubleDouble {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ComplexDD {
    re: DoubleDouble,
    im: DoubleDouble,
}

impl ComplexDD {
    fn one() -> Self {
        Self {
            re: DoubleDouble::from(1.0),
            im: DoubleDouble::default(),
        }
    }

    fn value(self) -> Complex64 {
        Complex64::new(self.re.value(), self.im.value())
    }
}

impl Add for ComplexDD {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }
}

impl Mul<Complex64> for ComplexDD {
    type Output = Self;

    fn mul(self, z: Complex64) -> Self {
        Self {
            re: self.re * z.re + -(self.im * z.im),
            im: self.im * z.re + self.re * z.im,
        }
    }
}

impl Mul<f64> for ComplexDD {
    type Output = Self;

    fn mul(self, m: f64) -> Self {
        Self {
            re: self.re * m,
            im: self.im * m,
        }
    }
}

/// `y_n(x)` and `y_n'(x)` from `y_k = (2k-1)·x·y_{k-1} + y_{k-2}`
fn evaluate(order: usize, x: Complex64) -> (Complex64, Complex64) {
    let mut y_prev = ComplexDD::one();
    let mut d_prev = ComplexDD::default();
    if order == 0 {
        return (y_prev.value(), d_prev.value());
    }

    let mut y = ComplexDD {
        re: two_sum(1.0, x.re),
        im: x.im.into(),
    };
    let mut d = ComplexDD::one();

    for k in 2..=order {
        let m = (2 * k - 1) as f64;
        let y_next = y * x * m + y_prev;
        let d_next = (y + d * x) * m + d_prev;
        y_prev = y;
        d_prev = d;
        y = y_next;
        d = d_next;
    }

    (y.value(), d.value())
}

/// Campos-Calderón asymptotic estimates of the zeros
fn initial_guesses(order: usize) -> Vec<Complex64> {
    if order == 1 {
        return vec![Complex64::new(-1.0, 0.0)];
    }

    let n = order as f64;
    let s = 2.0 * n.powi(2) - 3.0 * n.powi(4) + n.powi(5);
    let b3 = (16.0 - 8.0 * n) / s;
    let b2 = (-24.0 - 12.0 * n + 12.0 * n.powi(2)) / s;
    let b1 = (8.0 + 24.0 * n - 12.0 * n.powi(2) - 2.0 * n.powi(3)) / s;
    let b0 = (-6.0 * n + 5.0 * n.powi(3) - n.powi(4)) / s;
    let r = 2.0 * n.powi(2) + n.powi(3);
    let a1 = (-6.0 - 6.0 * n) / r;
    let a2 = 6.0 / r;

    (1..=order)
        .map(|k| {
            let k = k as f64;
            Complex64::new(a1 * k + a2 * k * k, b0 + b1 * k + b2 * k * k + b3 * k.powi(3))
        })
        .collect()
}

/// All zeros of `y_n`, conjugate-symmetric and sorted by imaginary part
///
/// Uses Aberth-Ehrlich simultaneous iteration. Fails with `InvalidSpec` when
/// the iteration does not settle on a consistent set of zeros.
pub fn ordinary_zeros(order: usize) -> Result<Vec<Complex64>> {
    if order == 0 {
        return Ok(Vec::new());
    }

    let mut zeros = initial_guesses(order);
    for _ in 0..MAX_ITERATIONS {
        let mut max_step: f64 = 0.0;
        for i in 0..order {
            let (f, fp) = evaluate(order, zeros[i]);
            let ratio = f / fp;
            let repulsion: Complex64 = zeros
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &zj)| 1.0 / (zeros[i] - zj))
                .sum();
            let step = ratio / (1.0 - ratio * repulsion);
            zeros[i] -= step;
            max_step = max_step.max(step.norm() / zeros[i].norm());
        }
        if max_step < STEP_TOLERANCE {
            break;
        }
    }

    zeros.sort_by(|a, b| a.im.total_cmp(&b.im));
    let symmetric: Vec<Complex64> = zeros
        .iter()
        .zip(zeros.iter().rev())
        .map(|(&a, &b)| (a + b.conj()) / 2.0)
        .collect();

    let sum: Complex64 = symmetric.iter().sum();
    let finite = symmetric.iter().all(|z| z.re.is_finite() && z.im.is_finite());
    if !finite || (sum + 1.0).norm() > SUM_TOLERANCE {
        return Err(EngineError::invalid_spec(format!(
            "Bessel polynomial zeros of order {order} did not converge"
        )));
    }

    log::debug!("Bessel zeros of order {}: sum error {:.2e}", order, (sum + 1.0).norm());
    Ok(symmetric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_double_keeps_low_part() {
        let x = DoubleDouble::from(1.0) + DoubleDouble::from(1e-20);
        assert_eq!(x.hi, 1.0);
        assert_eq!(x.lo, 1e-20);

        // (1 + 2^-30)^2 needs more than 53 bits
        let e = 2f64.powi(-30);
        let sq = two_sum(1.0, e) * (1.0 + e);
        assert_eq!(sq.hi, 1.0 + 2.0 * e);
        assert_eq!(sq.lo, e * e);
    }

    #[test]
    fn test_low_order_zeros() {
        // y_2(x) = 3x² + 3x + 1
        let zeros = ordinary_zeros(2).unwrap();
        let expected = Complex64::new(-0.5, 3.0f64.sqrt() / 6.0);
        assert!((zeros[1] - expected).norm() < 1e-14);
        assert!((zeros[0] - expected.conj()).norm() < 1e-14);

        // y_1(x) = x + 1
        assert_eq!(ordinary_zeros(1).unwrap(), vec![Complex64::new(-1.0, 0.0)]);
        assert!(ordinary_zeros(0).unwrap().is_empty());
    }

    #[test]
    fn test_zeros_are_roots_up_to_order_30() {
        for order in 1..=30 {
            let zeros = ordinary_zeros(order).unwrap();
            assert_eq!(zeros.len(), order);

            let sum: Complex64 = zeros.iter().sum();
            assert!((sum + 1.0).norm() < 1e-12, "order {}: sum {}", order, sum);

            for (z, mirror) in zeros.iter().zip(zeros.iter().rev()) {
                assert!(z.re < 0.0);
                assert_eq!(*z, mirror.conj());
            }
        }
    }

    #[test]
    fn test_residual_is_small_relative_to_derivative() {
        for order in [20, 25, 30] {
            for z in ordinary_zeros(order).unwrap() {
                let (f, fp) = evaluate(order, z);
                assert!((f / fp).norm() < 1e-12 * z.norm(), "order {}: residual at {}", order, z);
            }
        }
    }
}
