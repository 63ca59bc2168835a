//! Cancellation of adjacent inverse pairs.

use quistik_ir::{CircuitDag, NodeIndex, StandardGate, WireId};
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Removes pairs of identical, self-inverse two-qubit gates that follow
/// each other directly on both of their wires (`cx·cx`, `ecr·ecr`,
/// `cz·cz`, `swap·swap`).
///
/// Direction matters for `cx`, `cy` and `ecr`; `cz` and `swap` are
/// symmetric and cancel in either operand order.
pub struct CancelInversePairs;

fn symmetric(gate: &StandardGate) -> bool {
    matches!(gate, StandardGate::CZ | StandardGate::Swap)
}

fn find_partner(dag: &CircuitDag, node: NodeIndex) -> Option<NodeIndex> {
    let inst = dag.get_instruction(node)?;
    let gate = inst.as_gate()?;
    if gate.num_qubits() != 2 || !gate.is_self_inverse() {
        return None;
    }
    let (a, b) = (inst.qubits[0], inst.qubits[1]);

    let next = dag.next_on_wire(node, WireId::Qubit(a))?;
    if dag.next_on_wire(node, WireId::Qubit(b)) != Some(next) {
        return None;
    }
    let other = dag.get_instruction(next)?;
    if other.as_gate() != Some(gate) {
        return None;
    }
    let same_order = other.qubits == [a, b];
    let swapped = other.qubits == [b, a];
    (same_order || (swapped && symmetric(gate))).then_some(next)
}

impl Pass for CancelInversePairs {
    fn name(&self) -> &'static str {
        "CancelInversePairs"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut cancelled = 0usize;
        loop {
            let pair = dag
                .topological_ops()
                .into_iter()
                .find_map(|(node, _)| find_partner(dag, node).map(|next| (node, next)));
            let Some((first, second)) = pair else {
                break;
            };
            dag.remove_op(first)?;
            dag.remove_op(second)?;
            cancelled += 1;
        }
        debug!("CancelInversePairs removed {cancelled} pairs");
        Ok(())
    }
}
