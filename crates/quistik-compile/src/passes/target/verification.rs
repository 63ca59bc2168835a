//! Final check that a compiled circuit is executable on the target.

use quistik_ir::{CircuitDag, StandardGate};
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Fails compilation when a gate is outside the basis or a two-qubit gate
/// does not sit on a coupled pair in a calibrated direction.
///
/// This pass never touches the DAG.
pub struct BasisVerification;

impl Pass for BasisVerification {
    fn name(&self) -> &'static str {
        "BasisVerification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties.basis_gates.as_ref();
        let coupling_map = properties.coupling_map.as_ref();

        for (_, inst) in dag.topological_ops() {
            if let Some(basis) = basis {
                if !basis.contains(inst.name()) {
                    return Err(CompileError::GateNotInBasis {
                        gate: inst.name().to_string(),
                        qubits: inst.qubits.iter().map(|q| q.0).collect(),
                    });
                }
            }

            let (Some(gate), Some(cm)) = (inst.as_gate(), coupling_map) else {
                continue;
            };
            if gate.num_qubits() != 2 {
                continue;
            }
            let (control, target) = (inst.qubits[0].0, inst.qubits[1].0);
            let symmetric = matches!(gate, StandardGate::CZ | StandardGate::Swap);
            let ok = if symmetric {
                cm.is_connected(control, target)
            } else {
                cm.supports(control, target)
            };
            if !ok {
                return Err(CompileError::UncoupledGate {
                    gate: gate.name().to_string(),
                    control,
                    target,
                });
            }
        }

        debug!("BasisVerification passed on {} ops", dag.num_ops());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{BasisGates, CouplingMap};
    use quistik_ir::{Circuit, QubitId};

    fn eagle_pair(pairs: &[(u32, u32)]) -> PropertySet {
        PropertySet::new().with_target(
            CouplingMap::from_pairs(3, pairs.iter().copied()),
            BasisGates::ibm_eagle(),
        )
    }

    #[test]
    fn test_accepts_native_circuit() {
        let mut circuit = Circuit::with_size("ok", 2, 2);
        circuit
            .rz(0.5, QubitId(0))
            .unwrap()
            .sx(QubitId(0))
            .unwrap()
            .ecr(QubitId(0), QubitId(1))
            .unwrap()
            .measure_all()
            .unwrap();
        let mut dag = circuit.into_dag();
        BasisVerification
            .run(&mut dag, &mut eagle_pair(&[(0, 1)]))
            .unwrap();
    }

    #[test]
    fn test_rejects_foreign_gate() {
        let mut circuit = Circuit::with_size("h", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let mut dag = circuit.into_dag();
        let err = BasisVerification
            .run(&mut dag, &mut eagle_pair(&[(0, 1)]))
            .unwrap_err();
        assert!(matches!(err, CompileError::GateNotInBasis { ref gate, .. } if gate == "h"));
    }

    #[test]
    fn test_rejects_wrong_direction() {
        let mut circuit = Circuit::with_size("ecr", 2, 0);
        circuit.ecr(QubitId(1), QubitId(0)).unwrap();
        let mut dag = circuit.into_dag();
        let err = BasisVerification
            .run(&mut dag, &mut eagle_pair(&[(0, 1)]))
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::UncoupledGate { control: 1, target: 0, .. }
        ));
    }

    #[test]
    fn test_rejects_uncoupled_pair() {
        let mut circuit = Circuit::with_size("ecr", 3, 0);
        circuit.ecr(QubitId(0), QubitId(2)).unwrap();
        let mut dag = circuit.into_dag();
        assert!(
            BasisVerification
                .run(&mut dag, &mut eagle_pair(&[(0, 1), (1, 2)]))
                .is_err()
        );
    }

    #[test]
    fn test_cz_either_direction() {
        let mut props = PropertySet::new()
            .with_target(CouplingMap::from_pairs(2, [(0, 1)]), BasisGates::ibm_heron());
        let mut circuit = Circuit::with_size("cz", 2, 0);
        circuit.cz(QubitId(1), QubitId(0)).unwrap();
        let mut dag = circuit.into_dag();
        BasisVerification.run(&mut dag, &mut props).unwrap();
    }
}
