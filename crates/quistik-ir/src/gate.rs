//! Quantum gate types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gates with known semantics.
///
/// Angles are plain radians. The set covers what circuits are written in
/// and what IBM devices accept natively (`ecr`, `sx`, `rz`, `x`, `cz`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate.
    P(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Echoed cross-resonance gate.
    ECR,
    /// SWAP gate.
    Swap,
}

impl StandardGate {
    /// Lower-case OpenQASM name of the gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(..) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::ECR => "ecr",
            StandardGate::Swap => "swap",
        }
    }

    /// Number of qubits the gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::ECR
            | StandardGate::Swap => 2,
            _ => 1,
        }
    }

    /// Rotation angles, in declaration order.
    pub fn params(&self) -> Vec<f64> {
        match *self {
            StandardGate::Rx(a) | StandardGate::Ry(a) | StandardGate::Rz(a) | StandardGate::P(a) => {
                vec![a]
            }
            StandardGate::U(theta, phi, lambda) => vec![theta, phi, lambda],
            _ => vec![],
        }
    }

    /// Whether applying the gate twice in a row is the identity.
    pub fn is_self_inverse(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::X
                | StandardGate::Y
                | StandardGate::Z
                | StandardGate::H
                | StandardGate::CX
                | StandardGate::CY
                | StandardGate::CZ
                | StandardGate::ECR
                | StandardGate::Swap
        )
    }

    /// Whether the gate is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::Z
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::T
                | StandardGate::Tdg
                | StandardGate::Rz(_)
                | StandardGate::P(_)
                | StandardGate::CZ
        )
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        if params.is_empty() {
            return write!(f, "{}", self.name());
        }
        let rendered: Vec<String> = params.iter().map(|p| format_angle(*p)).collect();
        write!(f, "{}({})", self.name(), rendered.join(","))
    }
}

/// Render an angle, using multiples of π where that is exact enough.
pub fn format_angle(angle: f64) -> String {
    use std::f64::consts::PI;

    const NAMED: [(f64, &str); 8] = [
        (PI, "π"),
        (-PI, "-π"),
        (PI / 2.0, "π/2"),
        (-PI / 2.0, "-π/2"),
        (PI / 4.0, "π/4"),
        (-PI / 4.0, "-π/4"),
        (3.0 * PI / 4.0, "3π/4"),
        (-3.0 * PI / 4.0, "-3π/4"),
    ];
    if angle.abs() < 1e-12 {
        return "0".into();
    }
    for (value, name) in NAMED {
        if (angle - value).abs() < 1e-9 {
            return name.into();
        }
    }
    format!("{angle:.4}")
}
