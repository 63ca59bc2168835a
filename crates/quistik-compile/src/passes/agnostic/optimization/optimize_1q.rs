//! Single-qubit gate optimization pass.

use quistik_ir::{CircuitDag, Instruction, NodeIndex, QubitId, StandardGate};
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::{BasisGates, PropertySet};
use crate::unitary::{compose, synthesize_u, synthesize_zsx};

/// Target basis for single-qubit resynthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneQubitBasis {
    /// `rz` and `sx`, plus `x` when `with_x` is set (IBM native).
    ZSX {
        /// Whether the target accepts `x`.
        with_x: bool,
    },
    /// A single `u(θ, φ, λ)`.
    U,
}

impl OneQubitBasis {
    /// The basis to synthesize into for the given target gates.
    pub fn for_target(basis: Option<&BasisGates>) -> Self {
        match basis {
            Some(b) if b.supports_zsx() => OneQubitBasis::ZSX {
                with_x: b.contains("x"),
            },
            _ => OneQubitBasis::U,
        }
    }

    fn synthesize(self, gates: &[StandardGate]) -> Option<Vec<StandardGate>> {
        let unitary = compose(gates)?;
        Some(match self {
            OneQubitBasis::ZSX { with_x } => synthesize_zsx(&unitary, with_x),
            OneQubitBasis::U => synthesize_u(&unitary),
        })
    }
}

/// Merges maximal runs of single-qubit gates on each wire and resynthesizes
/// them in the target's single-qubit basis.
///
/// A run is only rewritten when the result is cheaper (fewer `sx`/`x`
/// pulses, then fewer gates) or when the run holds gates outside the basis.
pub struct Optimize1qGates;

/// Pulse count first, total length second.
fn cost(gates: &[StandardGate]) -> (usize, usize) {
    let pulses = gates
        .iter()
        .filter(|g| !matches!(g, StandardGate::Rz(_) | StandardGate::I))
        .count();
    (pulses, gates.len())
}

fn runs_on_wire(dag: &CircuitDag, qubit: QubitId) -> Vec<Vec<NodeIndex>> {
    let mut runs = vec![];
    let mut current = vec![];
    for node in dag.wire_ops(qubit) {
        let single = dag
            .get_instruction(node)
            .is_some_and(|inst| inst.is_gate() && inst.qubits.len() == 1);
        if single {
            current.push(node);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

impl Pass for Optimize1qGates {
    fn name(&self) -> &'static str {
        "Optimize1qGates"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = OneQubitBasis::for_target(properties.basis_gates.as_ref());
        let in_basis = |gate: &StandardGate| {
            properties
                .basis_gates
                .as_ref()
                .is_none_or(|b| b.contains(gate.name()))
        };

        let qubits: Vec<_> = dag.qubits().collect();
        let mut rewritten = 0usize;
        for qubit in qubits {
            for run in runs_on_wire(dag, qubit) {
                let gates: Vec<StandardGate> = run
                    .iter()
                    .filter_map(|&n| dag.get_instruction(n).and_then(|i| i.as_gate()).copied())
                    .collect();
                let Some(synthesized) = basis.synthesize(&gates) else {
                    continue;
                };
                let foreign = gates.iter().any(|g| !in_basis(g));
                if !foreign && cost(&synthesized) >= cost(&gates) {
                    continue;
                }

                let replacement = synthesized
                    .into_iter()
                    .map(|g| Instruction::single_qubit_gate(g, qubit))
                    .collect();
                dag.replace_op(run[0], replacement)?;
                for &node in &run[1..] {
                    dag.remove_op(node)?;
                }
                rewritten += 1;
            }
        }

        debug!("Optimize1qGates rewrote {rewritten} runs");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quistik_ir::Circuit;

    fn names(dag: &CircuitDag) -> Vec<&'static str> {
        dag.topological_ops()
            .into_iter()
            .map(|(_, inst)| inst.name())
            .collect()
    }

    #[test]
    fn test_hh_cancels() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.h(QubitId(0)).unwrap().h(QubitId(0)).unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();
        props.basis_gates = Some(BasisGates::ibm_eagle());

        Optimize1qGates.run(&mut dag, &mut props).unwrap();
        assert_eq!(dag.num_ops(), 0);
    }

    #[test]
    fn test_rz_run_merges() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit
            .rz(0.25, QubitId(0))
            .unwrap()
            .rz(0.5, QubitId(0))
            .unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();
        props.basis_gates = Some(BasisGates::ibm_eagle());

        Optimize1qGates.run(&mut dag, &mut props).unwrap();
        let ops = dag.topological_ops();
        assert_eq!(ops.len(), 1);
        match ops[0].1.as_gate() {
            Some(StandardGate::Rz(theta)) => assert!((theta - 0.75).abs() < 1e-9),
            other => panic!("expected rz, got {other:?}"),
        }
    }

    #[test]
    fn test_runs_stop_at_two_qubit_gates() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .h(QubitId(0))
            .unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();
        props.basis_gates = Some(BasisGates::new(["cx", "rz", "sx", "x"]));

        Optimize1qGates.run(&mut dag, &mut props).unwrap();
        assert_eq!(
            names(&dag),
            vec!["rz", "sx", "rz", "cx", "rz", "sx", "rz"]
        );
    }

    #[test]
    fn test_optimal_run_is_left_alone() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.sx(QubitId(0)).unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();
        props.basis_gates = Some(BasisGates::ibm_eagle());

        Optimize1qGates.run(&mut dag, &mut props).unwrap();
        assert_eq!(names(&dag), vec!["sx"]);
    }

    #[test]
    fn test_u_basis_without_target() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit
            .h(QubitId(0))
            .unwrap()
            .t(QubitId(0))
            .unwrap()
            .h(QubitId(0))
            .unwrap();
        let mut dag = circuit.into_dag();
        let mut props = PropertySet::new();

        Optimize1qGates.run(&mut dag, &mut props).unwrap();
        assert_eq!(names(&dag), vec!["u"]);
    }
}
