//! Removal of diagonal gates directly before measurement.

use quistik_ir::{CircuitDag, NodeIndex, WireId};
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Drops gates that are diagonal in the computational basis (`rz`, `z`,
/// `s`, `t`, `p`, `cz`, ...) when every wire they touch is measured next.
/// Such gates only change phases and cannot affect the sampled bits.
pub struct RemoveDiagonalBeforeMeasure;

fn removable(dag: &CircuitDag, node: NodeIndex) -> bool {
    let Some(inst) = dag.get_instruction(node) else {
        return false;
    };
    if !inst.as_gate().is_some_and(|g| g.is_diagonal()) {
        return false;
    }
    inst.qubits.iter().all(|&q| {
        dag.next_on_wire(node, WireId::Qubit(q))
            .and_then(|next| dag.get_instruction(next))
            .is_some_and(|next| next.is_measure())
    })
}

impl Pass for RemoveDiagonalBeforeMeasure {
    fn name(&self) -> &'static str {
        "RemoveDiagonalBeforeMeasure"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut removed = 0usize;
        loop {
            let doomed: Vec<NodeIndex> = dag
                .topological_ops()
                .into_iter()
                .map(|(node, _)| node)
                .filter(|&node| removable(dag, node))
                .collect();
            if doomed.is_empty() {
                break;
            }
            for node in doomed {
                dag.remove_op(node)?;
                removed += 1;
            }
        }
        debug!("RemoveDiagonalBeforeMeasure dropped {removed} gates");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quistik_ir::{Circuit, ClbitId, QubitId};

    #[test]
    fn test_rz_chain_before_measure_removed() {
        let mut circuit = Circuit::with_size("test", 1, 1);
        circuit
            .h(QubitId(0))
            .unwrap()
            .rz(0.3, QubitId(0))
            .unwrap()
            .t(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();
        let mut dag = circuit.into_dag();
        RemoveDiagonalBeforeMeasure
            .run(&mut dag, &mut PropertySet::new())
            .unwrap();
        let names: Vec<_> = dag
            .topological_ops()
            .into_iter()
            .map(|(_, i)| i.name())
            .collect();
        assert_eq!(names, vec!["h", "measure"]);
    }

    #[test]
    fn test_cz_needs_both_wires_measured() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .cz(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .h(QubitId(1))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();
        let mut dag = circuit.into_dag();
        RemoveDiagonalBeforeMeasure
            .run(&mut dag, &mut PropertySet::new())
            .unwrap();
        assert_eq!(dag.count_ops().get("cz"), Some(&1));
    }

    #[test]
    fn test_unmeasured_diagonal_kept() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.z(QubitId(0)).unwrap();
        let mut dag = circuit.into_dag();
        RemoveDiagonalBeforeMeasure
            .run(&mut dag, &mut PropertySet::new())
            .unwrap();
        assert_eq!(dag.num_ops(), 1);
    }
}
