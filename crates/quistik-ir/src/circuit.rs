//! High-level circuit builder API.

use crate::dag::{CircuitDag, CircuitLevel};
use crate::error::IrResult;
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit.
///
/// A named wrapper over [`CircuitDag`] with builder methods for the
/// standard gates. Builder methods return `&mut Self` so calls chain with
/// `?`.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    dag: CircuitDag,
    next_qubit_id: u32,
    next_clbit_id: u32,
}

macro_rules! single_qubit_gates {
    ($($(#[$doc:meta])* $method:ident => $gate:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
                self.dag
                    .apply(Instruction::single_qubit_gate(StandardGate::$gate, qubit))?;
                Ok(self)
            }
        )*
    };
}

macro_rules! two_qubit_gates {
    ($($(#[$doc:meta])* $method:ident => $gate:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
                self.dag
                    .apply(Instruction::two_qubit_gate(StandardGate::$gate, q1, q2))?;
                Ok(self)
            }
        )*
    };
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dag: CircuitDag::new(),
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a qubit and return its id.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.dag.add_qubit(id);
        id
    }

    /// Add a classical bit and return its id.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        self.dag.add_clbit(id);
        id
    }

    single_qubit_gates! {
        /// Apply the identity gate.
        id => I;
        /// Apply Pauli-X.
        x => X;
        /// Apply Pauli-Y.
        y => Y;
        /// Apply Pauli-Z.
        z => Z;
        /// Apply Hadamard.
        h => H;
        /// Apply S.
        s => S;
        /// Apply S-dagger.
        sdg => Sdg;
        /// Apply T.
        t => T;
        /// Apply T-dagger.
        tdg => Tdg;
        /// Apply sqrt(X).
        sx => SX;
        /// Apply sqrt(X)-dagger.
        sxdg => SXdg;
    }

    two_qubit_gates! {
        /// Apply CNOT with `q1` as control.
        cx => CX;
        /// Apply controlled-Y with `q1` as control.
        cy => CY;
        /// Apply controlled-Z.
        cz => CZ;
        /// Apply ECR with `q1` as the cross-resonance control.
        ecr => ECR;
        /// Swap two qubits.
        swap => Swap;
    }

    /// Apply RX(θ).
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::Rx(theta), qubit))?;
        Ok(self)
    }

    /// Apply RY(θ).
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::Ry(theta), qubit))?;
        Ok(self)
    }

    /// Apply RZ(θ).
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::Rz(theta), qubit))?;
        Ok(self)
    }

    /// Apply the phase gate P(λ).
    pub fn p(&mut self, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::P(lambda), qubit))?;
        Ok(self)
    }

    /// Apply U(θ, φ, λ).
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::single_qubit_gate(
            StandardGate::U(theta, phi, lambda),
            qubit,
        ))?;
        Ok(self)
    }

    /// Append an arbitrary instruction.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure `qubits[i]` into `clbits[i]`, one measurement per pair.
    pub fn measure_many(&mut self, qubits: &[QubitId], clbits: &[ClbitId]) -> IrResult<&mut Self> {
        // Validates the lengths before anything is appended.
        Instruction::measure_many(qubits.iter().copied(), clbits.iter().copied())?;
        for (&q, &c) in qubits.iter().zip(clbits) {
            self.dag.apply(Instruction::measure(q, c))?;
        }
        Ok(self)
    }

    /// Measure every qubit into the bit with the same index, adding bits
    /// as needed.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.num_clbits() < self.num_qubits() {
            self.add_clbit();
        }
        let qubits: Vec<_> = self.dag.qubits().collect();
        let clbits: Vec<_> = self.dag.clbits().take(qubits.len()).collect();
        self.measure_many(&qubits, &clbits)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::reset(qubit))?;
        Ok(self)
    }

    /// Apply a barrier to the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.dag.qubits().collect();
        self.barrier(qubits)
    }

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.dag.num_qubits()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.dag.num_clbits()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Get the abstraction level.
    pub fn level(&self) -> CircuitLevel {
        self.dag.level()
    }

    /// Instructions in topological order.
    pub fn instructions(&self) -> Vec<Instruction> {
        self.dag
            .topological_ops()
            .into_iter()
            .map(|(_, inst)| inst.clone())
            .collect()
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Get a mutable reference to the underlying DAG.
    pub fn dag_mut(&mut self) -> &mut CircuitDag {
        &mut self.dag
    }

    /// Consume the circuit and return the DAG.
    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }

    /// Create a circuit from a DAG.
    pub fn from_dag(dag: CircuitDag) -> Self {
        let next_qubit_id = dag.qubits().last().map_or(0, |q| q.0 + 1);
        let next_clbit_id = dag.clbits().last().map_or(0, |c| c.0 + 1);
        Self {
            name: "circuit".into(),
            dag,
            next_qubit_id,
            next_clbit_id,
        }
    }

    /// The two-qubit Bell-state circuit: `h(0)`, `cx(0, 1)`, then
    /// qubit `i` measured into bit `i`.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        let (q0, q1) = (QubitId(0), QubitId(1));

        circuit
            .h(q0)?
            .cx(q0, q1)?
            .measure_many(&[q0, q1], &[ClbitId(0), ClbitId(1)])?;

        Ok(circuit)
    }
}
