//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use quistik_ir::CircuitDag;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::passes::{
    BasisTranslation, BasisVerification, CancelInversePairs, Optimize1qGates,
    RemoveDiagonalBeforeMeasure, SubgraphLayout, SwapRouting, TrivialLayout,
};
use crate::property::{BasisGates, CouplingMap, ErrorMap, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        run_passes(&self.passes, dag, properties)?;

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            dag.depth(),
            dag.num_ops()
        );
        Ok(())
    }

    /// Names of the scheduled passes, in order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

fn run_passes(
    passes: &[Box<dyn Pass>],
    dag: &mut CircuitDag,
    properties: &mut PropertySet,
) -> CompileResult<()> {
    for pass in passes {
        if pass.should_run(dag, properties) {
            debug!("Running pass: {}", pass.name());
            pass.run(dag, properties)?;
            debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
        } else {
            debug!("Skipping pass: {}", pass.name());
        }
    }
    Ok(())
}

/// Repeats a group of passes until neither the op count nor the depth
/// changes, or `max_iterations` rounds have run.
pub struct FixedPoint {
    passes: Vec<Box<dyn Pass>>,
    max_iterations: usize,
}

impl FixedPoint {
    /// Default bound on the number of rounds.
    pub const DEFAULT_MAX_ITERATIONS: usize = 10;

    pub fn new() -> Self {
        Self {
            passes: vec![],
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }
}

impl Default for FixedPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for FixedPoint {
    fn name(&self) -> &'static str {
        "FixedPoint"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let mut last = (dag.num_ops(), dag.depth());
        for round in 1..=self.max_iterations {
            run_passes(&self.passes, dag, properties)?;
            let now = (dag.num_ops(), dag.depth());
            if now == last {
                debug!("FixedPoint converged after {round} rounds");
                return Ok(());
            }
            last = now;
        }
        debug!(
            "FixedPoint stopped after {} rounds without converging",
            self.max_iterations
        );
        Ok(())
    }
}

/// Builder for creating pass managers with preset configurations.
pub struct PassManagerBuilder {
    optimization_level: u8,
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            optimization_level: 1,
            properties: PropertySet::new(),
        }
    }

    /// Set the optimization level, clamped to 3.
    ///
    /// - Level 0: layout, routing and translation only
    /// - Level 1: merge single-qubit runs
    /// - Level 2: repeat cancellation and merging until nothing changes
    /// - Level 3: error-aware layout and diagonal removal before measurement
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(3);
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Set calibration data used by the level 3 layout.
    #[must_use]
    pub fn with_error_map(mut self, error_map: ErrorMap) -> Self {
        self.properties.error_map = Some(error_map);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let level = self.optimization_level;
        let mut pm = PassManager::new();

        if self.properties.coupling_map.is_some() {
            if level >= 3 {
                pm.add_pass(SubgraphLayout::new());
            } else {
                pm.add_pass(TrivialLayout);
            }
            pm.add_pass(SwapRouting);
        }

        if level >= 3 {
            pm.add_pass(RemoveDiagonalBeforeMeasure);
        }

        if self.properties.basis_gates.is_some() {
            pm.add_pass(BasisTranslation);
        }

        match level {
            0 => {}
            1 => pm.add_pass(Optimize1qGates),
            _ => {
                let mut loop_passes = FixedPoint::new()
                    .with_pass(CancelInversePairs)
                    .with_pass(Optimize1qGates);
                if level >= 3 {
                    loop_passes = loop_passes.with_pass(RemoveDiagonalBeforeMeasure);
                }
                pm.add_pass(loop_passes);
            }
        }

        pm.add_pass(BasisVerification);

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quistik_ir::{Circuit, QubitId};

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_pass_manager_run() {
        let pm = PassManager::new();
        let mut props = PropertySet::new();

        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let mut dag = circuit.into_dag();
        pm.run(&mut dag, &mut props).unwrap();

        assert_eq!(dag.num_ops(), 2);
    }

    #[test]
    fn test_level_pipelines() {
        let names = |level| {
            let (pm, _) = PassManagerBuilder::new()
                .with_optimization_level(level)
                .with_target(CouplingMap::linear(5), BasisGates::ibm_eagle())
                .build();
            pm.pass_names()
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        };

        assert_eq!(
            names(0),
            ["TrivialLayout", "SwapRouting", "BasisTranslation", "BasisVerification"]
        );
        assert_eq!(names(1)[3], "Optimize1qGates");
        assert_eq!(names(2)[3], "FixedPoint");
        assert_eq!(names(3)[0], "SubgraphLayout");
        assert_eq!(names(3)[2], "RemoveDiagonalBeforeMeasure");
        assert_eq!(names(3).last().map(String::as_str), Some("BasisVerification"));
    }

    #[test]
    fn test_level_is_clamped() {
        let (pm3, _) = PassManagerBuilder::new()
            .with_optimization_level(3)
            .with_target(CouplingMap::linear(2), BasisGates::ibm_eagle())
            .build();
        let (pm9, _) = PassManagerBuilder::new()
            .with_optimization_level(9)
            .with_target(CouplingMap::linear(2), BasisGates::ibm_eagle())
            .build();
        assert_eq!(pm3.pass_names(), pm9.pass_names());
    }

    #[test]
    fn test_fixed_point_cancels_nested_pairs() {
        // h cx cx h collapses only once the inner pair is gone.
        let mut circuit = Circuit::with_size("nested", 2, 0);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .h(QubitId(0))
            .unwrap();
        let mut dag = circuit.into_dag();

        let pass = FixedPoint::new()
            .with_pass(CancelInversePairs)
            .with_pass(Optimize1qGates);
        pass.run(&mut dag, &mut PropertySet::new()).unwrap();
        assert_eq!(dag.num_ops(), 0);
    }
}
