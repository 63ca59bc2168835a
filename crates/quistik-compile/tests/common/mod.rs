//! Circuit generators and fake devices shared by the integration tests.

#![allow(dead_code)]

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use proptest::prelude::*;
use quistik_compile::{BasisGates, CouplingMap, Target};
use quistik_ir::{Circuit, QubitId};

#[derive(Debug, Clone)]
pub enum GateOp {
    H(u32),
    Sdg(u32),
    T(u32),
    SX(u32),
    Rz(f64, u32),
    Ry(f64, u32),
    CX(u32, u32),
    CY(u32, u32),
    CZ(u32, u32),
    Ecr(u32, u32),
    Swap(u32, u32),
}

impl GateOp {
    pub fn apply(self, circuit: &mut Circuit) {
        // Operand clashes (q, q) are rejected by the IR and simply skipped.
        let _ = match self {
            GateOp::H(q) => circuit.h(QubitId(q)),
            GateOp::Sdg(q) => circuit.sdg(QubitId(q)),
            GateOp::T(q) => circuit.t(QubitId(q)),
            GateOp::SX(q) => circuit.sx(QubitId(q)),
            GateOp::Rz(theta, q) => circuit.rz(theta, QubitId(q)),
            GateOp::Ry(theta, q) => circuit.ry(theta, QubitId(q)),
            GateOp::CX(a, b) => circuit.cx(QubitId(a), QubitId(b)),
            GateOp::CY(a, b) => circuit.cy(QubitId(a), QubitId(b)),
            GateOp::CZ(a, b) => circuit.cz(QubitId(a), QubitId(b)),
            GateOp::Ecr(a, b) => circuit.ecr(QubitId(a), QubitId(b)),
            GateOp::Swap(a, b) => circuit.swap(QubitId(a), QubitId(b)),
        };
    }
}

pub fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    let q = 0..num_qubits;
    let angle = -PI..PI;
    prop_oneof![
        q.clone().prop_map(GateOp::H),
        q.clone().prop_map(GateOp::Sdg),
        q.clone().prop_map(GateOp::T),
        q.clone().prop_map(GateOp::SX),
        (angle.clone(), q.clone()).prop_map(|(t, q)| GateOp::Rz(t, q)),
        (angle, q.clone()).prop_map(|(t, q)| GateOp::Ry(t, q)),
        (q.clone(), q.clone()).prop_map(|(a, b)| GateOp::CX(a, b)),
        (q.clone(), q.clone()).prop_map(|(a, b)| GateOp::CY(a, b)),
        (q.clone(), q.clone()).prop_map(|(a, b)| GateOp::CZ(a, b)),
        (q.clone(), q.clone()).prop_map(|(a, b)| GateOp::Ecr(a, b)),
        (q.clone(), q).prop_map(|(a, b)| GateOp::Swap(a, b)),
    ]
}

/// Random gates on `qubits` qubits, every qubit measured at the end.
pub fn arb_circuit(
    qubits: RangeInclusive<u32>,
    max_gates: usize,
) -> impl Strategy<Value = Circuit> {
    qubits.prop_flat_map(move |n| {
        prop::collection::vec(arb_gate_op(n), 1..=max_gates).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", n, n);
            for op in ops {
                op.apply(&mut circuit);
            }
            let _ = circuit.measure_all();
            circuit
        })
    })
}

/// A small T-shaped device with one-way calibrated pairs.
pub fn eagle_t() -> Target {
    Target::new(
        "fake_eagle_t",
        CouplingMap::from_pairs(5, [(0, 1), (2, 1), (1, 3), (4, 3)]),
        BasisGates::ibm_eagle(),
    )
}

pub fn heron_line() -> Target {
    Target::new("fake_heron_line", CouplingMap::linear(5), BasisGates::ibm_heron())
}

/// A `cx` device whose line is only calibrated from the higher qubit down.
pub fn cx_descending_line() -> Target {
    Target::new(
        "fake_cx_line",
        CouplingMap::from_pairs(4, [(1, 0), (2, 1), (3, 2)]),
        BasisGates::new(["cx", "rz", "sx", "x"]),
    )
}
