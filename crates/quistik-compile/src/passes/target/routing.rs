//! Routing: rewrite the circuit onto physical qubits, inserting SWAPs.

use quistik_ir::{CircuitDag, CircuitLevel, Instruction, QubitId, StandardGate};
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{CouplingMap, Layout, PropertySet};

/// Greedy shortest-path SWAP routing.
///
/// Walks the circuit in topological order with the current layout. A
/// two-qubit gate on uncoupled physical qubits first moves its first
/// operand along a shortest path towards the second, one SWAP per hop,
/// updating the layout as it goes. The result is a new DAG whose qubit ids
/// are physical qubit indices; the layout after the last SWAP is stored as
/// [`PropertySet::final_layout`].
pub struct SwapRouting;

fn physical(layout: &Layout, qubit: QubitId) -> CompileResult<QubitId> {
    layout
        .get_physical(qubit)
        .map(QubitId)
        .ok_or(CompileError::MissingLayout)
}

fn bring_together(
    routed: &mut CircuitDag,
    layout: &mut Layout,
    coupling_map: &CouplingMap,
    from: u32,
    to: u32,
) -> CompileResult<usize> {
    let path = coupling_map
        .shortest_path(from, to)
        .ok_or(CompileError::RoutingFailed { from, to })?;
    let hops = path.len().saturating_sub(2);
    for pair in path.windows(2).take(hops) {
        let (a, b) = (QubitId(pair[0]), QubitId(pair[1]));
        routed.add_qubit(a);
        routed.add_qubit(b);
        routed.apply(Instruction::two_qubit_gate(StandardGate::Swap, a, b))?;
        layout.swap(pair[0], pair[1]);
    }
    Ok(hops)
}

impl Pass for SwapRouting {
    fn name(&self) -> &'static str {
        "SwapRouting"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        let mut layout = properties
            .layout
            .clone()
            .ok_or(CompileError::MissingLayout)?;

        let mut routed = CircuitDag::new();
        routed.add_global_phase(dag.global_phase());
        for clbit in dag.clbits() {
            routed.add_clbit(clbit);
        }
        for qubit in dag.qubits() {
            routed.add_qubit(physical(&layout, qubit)?);
        }

        let mut swaps = 0usize;
        for (_, inst) in dag.topological_ops() {
            let is_entangler = inst.is_gate() && inst.qubits.len() == 2;
            if is_entangler {
                let p0 = physical(&layout, inst.qubits[0])?.0;
                let p1 = physical(&layout, inst.qubits[1])?.0;
                if !coupling_map.is_connected(p0, p1) {
                    swaps += bring_together(&mut routed, &mut layout, coupling_map, p0, p1)?;
                }
            }

            let qubits = inst
                .qubits
                .iter()
                .map(|&q| physical(&layout, q))
                .collect::<CompileResult<Vec<_>>>()?;
            routed.apply(Instruction {
                kind: inst.kind.clone(),
                qubits,
                clbits: inst.clbits.clone(),
            })?;
        }

        debug!("SwapRouting inserted {swaps} SWAPs");
        routed.set_level(CircuitLevel::Physical);
        *dag = routed;
        properties.final_layout = Some(layout);
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, properties: &PropertySet) -> bool {
        dag.level() == CircuitLevel::Logical
            && properties.coupling_map.is_some()
            && properties.layout.is_some()
    }
}
