//! Elliptic integrals and Jacobi elliptic functions
//!
//! Support routines for the elliptic (Cauer) analog prototype. All moduli
//! are given as the parameter `m = k²`.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Arithmetic-geometric mean of two non-negative numbers
fn agm(mut a: f64, mut b: f64) -> f64 {
    for _ in 0..64 {
        if (a - b).abs() <= f64::EPSILON * a {
            break;
        }
        let next_a = 0.5 * (a + b);
        b = (a * b).sqrt();
        a = next_a;
    }
    a
}

/// Complete elliptic integral of the first kind K(m)
pub fn ellipk(m: f64) -> f64 {
    if m >= 1.0 {
        return f64::INFINITY;
    }
    PI / (2.0 * agm(1.0, (1.0 - m).sqrt()))
}

/// K(1 - p), accurate for small p
pub fn ellipkm1(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::INFINITY;
    }
    PI / (2.0 * agm(1.0, p.sqrt()))
}

/// Jacobi elliptic functions (sn, cn, dn) of argument `u` and parameter `m`
///
/// Descending Landen transformation, with series limits near m = 0 and m = 1.
pub fn ellipj(u: f64, m: f64) -> (f64, f64, f64) {
    if m < 1e-9 {
        let t = u.sin();
        let b = u.cos();
        let ai = 0.25 * m * (u - t * b);
        return (t - ai * b, b + ai * t, 1.0 - 0.5 * m * t * t);
    }

    if m >= 0.999_999_999_9 {
        let ai = 0.25 * (1.0 - m);
        let b = u.cosh();
        let t = u.tanh();
        let sech = 1.0 / b;
        let twon = b * u.sinh();
        let sn = t + ai * (twon - u) / (b * b);
        let scaled = ai * t * sech;
        return (sn, sech - scaled * (twon - u), sech + scaled * (twon + u));
    }

    let mut a = [0.0f64; 9];
    let mut c = [0.0f64; 9];
    a[0] = 1.0;
    c[0] = m.sqrt();
    let mut b = (1.0 - m).sqrt();
    let mut twon = 1.0;
    let mut i = 0;

    while (c[i] / a[i]).abs() > f64::EPSILON && i < 8 {
        let ai = a[i];
        i += 1;
        c[i] = 0.5 * (ai - b);
        let t = (ai * b).sqrt();
        a[i] = 0.5 * (ai + b);
        b = t;
        twon *= 2.0;
    }

    let mut phi = twon * a[i] * u;
    let mut previous = phi;
    while i > 0 {
        let t = c[i] * phi.sin() / a[i];
        previous = phi;
        phi = 0.5 * (t.asin() + phi);
        i -= 1;
    }

    let sn = phi.sin();
    let cn = phi.cos();
    (sn, cn, cn / (phi - previous).cos())
}

/// Solve the degree equation for the selectivity parameter
///
/// Given the discrimination parameter `m1` and order `n`, returns the
/// parameter `m` with `K(m1')/(n·K(m1)) = K(m')/K(m)` (nome series).
pub fn ellipdeg(n: usize, m1: f64) -> f64 {
    let k1 = ellipk(m1);
    let k1p = ellipkm1(m1);
    let q1 = (-PI * k1p / k1).exp();
    let q = q1.powf(1.0 / n as f64);

    let num: f64 = (0..=7).map(|m: i32| q.powi(m * (m + 1))).sum();
    let den: f64 = 1.0 + 2.0 * (1..=8).map(|m: i32| q.powi(m * m)).sum::<f64>();

    16.0 * q * (num / den).powi(4)
}

/// Inverse Jacobi sn for complex argument (Landen descent)
fn arc_jac_sn(w: Complex64, m: f64) -> Complex64 {
    let complement = |kx: Complex64| ((1.0 - kx) * (1.0 + kx)).sqrt();

    let mut ks = vec![m.sqrt()];
    while let Some(&k) = ks.last() {
        if k == 0.0 || ks.len() > 10 {
            break;
        }
        let kp = ((1.0 - k) * (1.0 + k)).sqrt();
        ks.push((1.0 - kp) / (1.0 + kp));
    }

    let big_k = ks[1..].iter().map(|k| 1.0 + k).product::<f64>() * PI / 2.0;

    let mut wn = w;
    for pair in ks.windows(2) {
        let (kn, knext) = (pair[0], pair[1]);
        wn = 2.0 * wn / ((1.0 + knext) * (1.0 + complement(kn * wn)));
    }

    wn.asin() * (2.0 / PI) * big_k
}

/// Real inverse of the Jacobi sc function: solves `sc(z, 1 - m) = w`
pub fn arc_jac_sc1(w: f64, m: f64) -> f64 {
    arc_jac_sn(Complex64::new(0.0, w), m).im
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipk_known_values() {
        assert!((ellipk(0.0) - PI / 2.0).abs() < 1e-15);
        assert!((ellipk(0.5) - 1.854_074_677_301_372).abs() < 1e-12);
        assert!((ellipkm1(0.5) - ellipk(0.5)).abs() < 1e-12);
        assert!(ellipk(1.0).is_infinite());
    }

    #[test]
    fn test_ellipj_identities() {
        for &m in &[0.0, 0.1, 0.5, 0.9] {
            for &u in &[0.0, 0.3, 1.0, 2.5] {
                let (sn, cn, dn) = ellipj(u, m);
                assert!((sn * sn + cn * cn - 1.0).abs() < 1e-12);
                assert!((dn * dn + m * sn * sn - 1.0).abs() < 1e-12);
            }
        }
        // sn(K) = 1
        let m = 0.7;
        let (sn, cn, _) = ellipj(ellipk(m), m);
        assert!((sn - 1.0).abs() < 1e-10);
        assert!(cn.abs() < 1e-5);
    }

    #[test]
    fn test_ellipj_reference_value() {
        // sn(0.5 | 0.3)
        let (sn, _, _) = ellipj(0.5, 0.3);
        assert!((sn - 0.474_215_622_711_820_7).abs() < 1e-12);
    }

    #[test]
    fn test_ellipdeg_solves_degree_equation() {
        let m1 = 1e-4;
        let m = ellipdeg(4, m1);
        assert!(m > 0.0 && m < 1.0);
        // Degree equation: K'(m1)/(n·K(m1)) == K'(m)/K(m)
        let lhs = ellipkm1(m1) / (4.0 * ellipk(m1));
        let rhs = ellipkm1(m) / ellipk(m);
        assert!((lhs - rhs).abs() / lhs < 1e-9);
    }

    #[test]
    fn test_arc_jac_sc1_inverts_sc() {
        let m = 0.2;
        let w = 1.7;
        let z = arc_jac_sc1(w, m);
        let (sn, cn, _) = ellipj(z, 1.0 - m);
        assert!((sn / cn - w).abs() < 1e-9);
    }
}
