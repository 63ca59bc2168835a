//! Property-based tests for DAG editing.
//!
//! Splicing and removing operations must keep every wire a single ordered
//! chain, and topological order must agree with each wire's order.

use proptest::prelude::*;
use quistik_ir::{Circuit, CircuitDag, Instruction, QubitId, StandardGate};

#[derive(Debug, Clone)]
enum Op {
    H(u32),
    T(u32),
    Cx(u32, u32),
    Cz(u32, u32),
}

fn arb_op(n: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..n).prop_map(Op::H),
        (0..n).prop_map(Op::T),
        (0..n, 0..n).prop_map(|(a, b)| Op::Cx(a, b)),
        (0..n, 0..n).prop_map(|(a, b)| Op::Cz(a, b)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=4).prop_flat_map(|n| {
        prop::collection::vec(arb_op(n), 1..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", n, 0);
            for op in ops {
                let _ = match op {
                    Op::H(q) => circuit.h(QubitId(q)),
                    Op::T(q) => circuit.t(QubitId(q)),
                    Op::Cx(a, b) => circuit.cx(QubitId(a), QubitId(b)),
                    Op::Cz(a, b) => circuit.cz(QubitId(a), QubitId(b)),
                };
            }
            circuit
        })
    })
}

/// Every wire's ops appear in the same relative order in the topological walk.
fn wires_agree_with_topology(dag: &CircuitDag) -> bool {
    let order: Vec<_> = dag.topological_ops().into_iter().map(|(n, _)| n).collect();
    let position = |node| order.iter().position(|&n| n == node);
    dag.qubits().all(|q| {
        let positions: Vec<_> = dag.wire_ops(q).into_iter().map(position).collect();
        positions.iter().all(Option::is_some) && positions.windows(2).all(|w| w[0] < w[1])
    })
}

fn wire_total(dag: &CircuitDag) -> usize {
    dag.topological_ops()
        .iter()
        .map(|(_, inst)| inst.qubits.len())
        .sum()
}

proptest! {
    #[test]
    fn built_circuits_are_consistent(circuit in arb_circuit()) {
        let dag = circuit.dag();
        prop_assert!(wires_agree_with_topology(dag));
        let per_wire: usize = dag.qubits().map(|q| dag.wire_ops(q).len()).sum();
        prop_assert_eq!(per_wire, wire_total(dag));
        prop_assert!(dag.depth() <= dag.num_ops());
    }

    #[test]
    fn removing_an_op_keeps_wires_chained(circuit in arb_circuit(), pick in any::<prop::sample::Index>()) {
        let mut dag = circuit.into_dag();
        let ops = dag.topological_ops();
        prop_assume!(!ops.is_empty());
        let (node, _) = ops[pick.index(ops.len())];
        let before = dag.num_ops();

        dag.remove_op(node).unwrap();
        prop_assert_eq!(dag.num_ops(), before - 1);
        prop_assert!(wires_agree_with_topology(&dag));
    }

    #[test]
    fn splicing_single_qubit_ops(circuit in arb_circuit(), pick in any::<prop::sample::Index>()) {
        let mut dag = circuit.into_dag();
        let singles: Vec<_> = dag
            .topological_ops()
            .into_iter()
            .filter(|(_, inst)| inst.qubits.len() == 1)
            .map(|(n, inst)| (n, inst.qubits[0]))
            .collect();
        prop_assume!(!singles.is_empty());
        let (node, qubit) = singles[pick.index(singles.len())];
        let before = dag.num_ops();

        let replacement = vec![
            Instruction::single_qubit_gate(StandardGate::Rz(0.25), qubit),
            Instruction::single_qubit_gate(StandardGate::SX, qubit),
        ];
        dag.replace_op(node, replacement).unwrap();
        prop_assert_eq!(dag.num_ops(), before + 1);
        prop_assert!(wires_agree_with_topology(&dag));
    }
}
