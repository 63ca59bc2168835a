//! 2x2 unitaries for single-qubit resynthesis.
//!
//! A run of single-qubit gates is multiplied out into one [`Unitary2x2`],
//! decomposed into `U(θ, φ, λ)` Euler angles, and re-emitted in the
//! target's native single-qubit gates.

use std::f64::consts::PI;

use num_complex::Complex64;
use quistik_ir::StandardGate;

/// Tolerance for floating point comparisons.
pub(crate) const EPSILON: f64 = 1e-10;

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy)]
pub struct Unitary2x2 {
    /// The matrix elements: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        Self::new(c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0))
    }

    fn diagonal(phase: f64) -> Self {
        Self::new(
            c(1.0, 0.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            Complex64::from_polar(1.0, phase),
        )
    }

    /// RZ(θ).
    pub fn rz(theta: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -theta / 2.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// U(θ, φ, λ) in the OpenQASM 3 convention.
    pub fn u(theta: f64, phi: f64, lambda: f64) -> Self {
        let (s, co) = (theta / 2.0).sin_cos();
        Self::new(
            c(co, 0.0),
            -Complex64::from_polar(s, lambda),
            Complex64::from_polar(s, phi),
            Complex64::from_polar(co, phi + lambda),
        )
    }

    /// Matrix of a single-qubit gate, `None` for multi-qubit gates.
    pub fn from_gate(gate: &StandardGate) -> Option<Self> {
        let half = std::f64::consts::FRAC_1_SQRT_2;
        let m = match *gate {
            StandardGate::I => Self::identity(),
            StandardGate::X => Self::new(c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)),
            StandardGate::Y => Self::new(c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)),
            StandardGate::Z => Self::diagonal(PI),
            StandardGate::H => Self::new(c(half, 0.0), c(half, 0.0), c(half, 0.0), c(-half, 0.0)),
            StandardGate::S => Self::diagonal(PI / 2.0),
            StandardGate::Sdg => Self::diagonal(-PI / 2.0),
            StandardGate::T => Self::diagonal(PI / 4.0),
            StandardGate::Tdg => Self::diagonal(-PI / 4.0),
            StandardGate::SX => Self::new(c(0.5, 0.5), c(0.5, -0.5), c(0.5, -0.5), c(0.5, 0.5)),
            StandardGate::SXdg => Self::new(c(0.5, -0.5), c(0.5, 0.5), c(0.5, 0.5), c(0.5, -0.5)),
            StandardGate::Rx(theta) => {
                let (s, co) = (theta / 2.0).sin_cos();
                Self::new(c(co, 0.0), c(0.0, -s), c(0.0, -s), c(co, 0.0))
            }
            StandardGate::Ry(theta) => {
                let (s, co) = (theta / 2.0).sin_cos();
                Self::new(c(co, 0.0), c(-s, 0.0), c(s, 0.0), c(co, 0.0))
            }
            StandardGate::Rz(theta) => Self::rz(theta),
            StandardGate::P(lambda) => Self::diagonal(lambda),
            StandardGate::U(theta, phi, lambda) => Self::u(theta, phi, lambda),
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::ECR
            | StandardGate::Swap => return None,
        };
        Some(m)
    }

    /// Matrix product `self · other`.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Whether the matrix is the identity up to global phase.
    pub fn is_identity(&self) -> bool {
        let [a, b, c, d] = self.data;
        b.norm() < 1e-9 && c.norm() < 1e-9 && (a - d).norm() < 1e-9
    }

    /// Euler angles `(θ, φ, λ, γ)` with `self = e^{iγ} · U(θ, φ, λ)`.
    pub fn u_angles(&self) -> (f64, f64, f64, f64) {
        let [a, b, c, d] = self.data;
        let theta = 2.0 * c.norm().atan2(a.norm());
        let (s, co) = (theta / 2.0).sin_cos();

        if s.abs() < EPSILON {
            let gamma = a.arg();
            return (0.0, 0.0, normalize_angle(d.arg() - gamma), gamma);
        }
        if co.abs() < EPSILON {
            let gamma = (-b).arg();
            return (PI, normalize_angle(c.arg() - gamma), 0.0, gamma);
        }
        let gamma = a.arg();
        (
            theta,
            normalize_angle(c.arg() - gamma),
            normalize_angle((-b).arg() - gamma),
            gamma,
        )
    }

    /// Equality up to a global phase.
    pub fn equiv(&self, other: &Self) -> bool {
        let (pivot, _) = self
            .data
            .iter()
            .enumerate()
            .map(|(i, z)| (i, z.norm()))
            .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if other.data[pivot].norm() < 1e-9 {
            return false;
        }
        let phase = self.data[pivot] / other.data[pivot];
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(x, y)| (*x - *y * phase).norm() < 1e-7)
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

/// Wrap an angle into (-π, π]. Non-finite input becomes 0.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    }
    a
}

fn is_zero_angle(angle: f64) -> bool {
    normalize_angle(angle).abs() < 1e-9
}

fn push_rz(gates: &mut Vec<StandardGate>, angle: f64) {
    if !is_zero_angle(angle) {
        gates.push(StandardGate::Rz(normalize_angle(angle)));
    }
}

/// Gates, in circuit order, implementing `u` with `rz`, `sx` and, when
/// `use_x` is set, `x`. Rotations by a multiple of 2π are dropped.
pub fn synthesize_zsx(u: &Unitary2x2, use_x: bool) -> Vec<StandardGate> {
    let (theta, phi, lambda, _) = u.u_angles();
    let mut gates = vec![];
    let rz = push_rz;

    if theta.abs() < 1e-9 {
        rz(&mut gates, phi + lambda);
    } else if (theta - PI / 2.0).abs() < 1e-9 {
        rz(&mut gates, lambda - PI / 2.0);
        gates.push(StandardGate::SX);
        rz(&mut gates, phi + PI / 2.0);
    } else if use_x && (theta - PI).abs() < 1e-9 {
        rz(&mut gates, lambda - phi + PI);
        gates.push(StandardGate::X);
    } else {
        rz(&mut gates, lambda);
        gates.push(StandardGate::SX);
        rz(&mut gates, theta + PI);
        gates.push(StandardGate::SX);
        rz(&mut gates, phi + PI);
    }
    gates
}

/// A single `U(θ, φ, λ)` gate implementing `u`, or nothing for identity.
pub fn synthesize_u(u: &Unitary2x2) -> Vec<StandardGate> {
    if u.is_identity() {
        return vec![];
    }
    let (theta, phi, lambda, _) = u.u_angles();
    vec![StandardGate::U(theta, phi, lambda)]
}

/// Product of gates applied in circuit order.
pub fn compose<'a>(gates: impl IntoIterator<Item = &'a StandardGate>) -> Option<Unitary2x2> {
    gates
        .into_iter()
        .try_fold(Unitary2x2::identity(), |acc, gate| {
            Unitary2x2::from_gate(gate).map(|m| m * acc)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_single_qubit_gates() -> Vec<StandardGate> {
        vec![
            StandardGate::I,
            StandardGate::X,
            StandardGate::Y,
            StandardGate::Z,
            StandardGate::H,
            StandardGate::S,
            StandardGate::Sdg,
            StandardGate::T,
            StandardGate::Tdg,
            StandardGate::SX,
            StandardGate::SXdg,
            StandardGate::Rx(0.7),
            StandardGate::Ry(-1.3),
            StandardGate::Rz(2.1),
            StandardGate::P(0.4),
            StandardGate::U(1.1, 0.2, -2.5),
            StandardGate::U(PI / 2.0, 0.3, 0.9),
            StandardGate::U(PI, 0.3, 0.9),
        ]
    }

    #[test]
    fn test_self_inverse_squares() {
        for gate in [StandardGate::X, StandardGate::Y, StandardGate::Z, StandardGate::H] {
            let m = compose([&gate, &gate]).unwrap();
            assert!(m.is_identity(), "{gate} squared");
        }
        let sx2 = compose([&StandardGate::SX, &StandardGate::SX]).unwrap();
        assert!(sx2.equiv(&Unitary2x2::from_gate(&StandardGate::X).unwrap()));
    }

    #[test]
    fn test_u_angles_reconstruct() {
        for gate in all_single_qubit_gates() {
            let m = Unitary2x2::from_gate(&gate).unwrap();
            let (theta, phi, lambda, _) = m.u_angles();
            assert!(
                Unitary2x2::u(theta, phi, lambda).equiv(&m),
                "u_angles failed for {gate}"
            );
        }
    }

    #[test]
    fn test_zsx_synthesis_is_equivalent() {
        for gate in all_single_qubit_gates() {
            let m = Unitary2x2::from_gate(&gate).unwrap();
            for use_x in [true, false] {
                let seq = synthesize_zsx(&m, use_x);
                assert!(
                    seq.iter().all(|g| matches!(
                        g,
                        StandardGate::Rz(_) | StandardGate::SX | StandardGate::X
                    ))
                );
                let rebuilt = compose(&seq).unwrap();
                assert!(rebuilt.equiv(&m), "synthesis failed for {gate}: {seq:?}");
            }
        }
    }

    #[test]
    fn test_zsx_short_forms() {
        let h = Unitary2x2::from_gate(&StandardGate::H).unwrap();
        assert_eq!(synthesize_zsx(&h, true).len(), 3);

        let x = Unitary2x2::from_gate(&StandardGate::X).unwrap();
        assert_eq!(synthesize_zsx(&x, true), vec![StandardGate::X]);

        let z = Unitary2x2::from_gate(&StandardGate::Z).unwrap();
        assert_eq!(synthesize_zsx(&z, true).len(), 1);

        assert!(synthesize_zsx(&Unitary2x2::identity(), true).is_empty());
    }

    #[test]
    fn test_compose_rejects_two_qubit() {
        assert!(compose([&StandardGate::H, &StandardGate::CX]).is_none());
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
    }
}
