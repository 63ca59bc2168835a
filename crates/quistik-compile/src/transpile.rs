//! One-call compilation entry point.

use quistik_ir::Circuit;
use tracing::info;

use crate::error::{CompileError, CompileResult};
use crate::manager::PassManagerBuilder;
use crate::target::Target;

/// Highest supported optimization level.
pub const MAX_OPTIMIZATION_LEVEL: u8 = 3;

/// Compile `circuit` into an ISA circuit for `target`.
///
/// The result is a physical circuit: qubit ids are device qubit indices,
/// every gate is in the target basis, and every two-qubit gate acts on a
/// coupled pair in a calibrated direction.
pub fn transpile(
    circuit: &Circuit,
    target: &Target,
    optimization_level: u8,
) -> CompileResult<Circuit> {
    if optimization_level > MAX_OPTIMIZATION_LEVEL {
        return Err(CompileError::InvalidOptimizationLevel(optimization_level));
    }

    let (pm, mut props) = PassManagerBuilder::new()
        .with_optimization_level(optimization_level)
        .with_properties(target.properties())
        .build();

    let mut dag = circuit.dag().clone();
    pm.run(&mut dag, &mut props)?;

    let compiled = Circuit::from_dag(dag).with_name(circuit.name());
    info!(
        target = %target.name,
        depth = compiled.depth(),
        "Transpiled '{}' at level {optimization_level}",
        circuit.name()
    );
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{BasisGates, CouplingMap, ErrorMap};
    use quistik_ir::{CircuitLevel, QubitId};

    fn eagle_line(n: u32) -> Target {
        let pairs: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Target::new("fake_line", CouplingMap::from_pairs(n, pairs), BasisGates::ibm_eagle())
    }

    #[test]
    fn test_bell_on_eagle() {
        let circuit = Circuit::bell().unwrap();
        for level in 0..=3 {
            let compiled = transpile(&circuit, &eagle_line(5), level).unwrap();
            assert_eq!(compiled.level(), CircuitLevel::Physical);
            assert_eq!(compiled.name(), "bell");
            let ops = compiled.dag().count_ops();
            assert_eq!(ops.get("ecr"), Some(&1), "level {level}");
            assert_eq!(ops.get("measure"), Some(&2));
            assert!(ops.get("h").is_none());
            assert!(ops.get("cx").is_none());
        }
    }

    #[test]
    fn test_level_above_three_rejected() {
        let err = transpile(&Circuit::bell().unwrap(), &eagle_line(2), 4).unwrap_err();
        assert!(matches!(err, CompileError::InvalidOptimizationLevel(4)));
    }

    #[test]
    fn test_circuit_too_large() {
        let circuit = Circuit::with_size("big", 3, 0);
        let mut circuit = circuit;
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        let err = transpile(&circuit, &eagle_line(2), 1).unwrap_err();
        assert!(matches!(err, CompileError::CircuitTooLarge { .. }));
    }

    #[test]
    fn test_level3_avoids_noisy_pair() {
        let mut errors = ErrorMap::default();
        errors.two_qubit.insert((0, 1), 0.2);
        errors.two_qubit.insert((1, 2), 0.2);
        errors.two_qubit.insert((2, 3), 0.005);
        let target = eagle_line(4).with_error_map(errors);

        let compiled = transpile(&Circuit::bell().unwrap(), &target, 3).unwrap();
        let ecr: Vec<_> = compiled
            .instructions()
            .into_iter()
            .filter(|i| i.name() == "ecr")
            .collect();
        assert_eq!(ecr.len(), 1);
        let mut pair: Vec<u32> = ecr[0].qubits.iter().map(|q| q.0).collect();
        pair.sort_unstable();
        assert_eq!(pair, vec![2, 3]);
    }
}
