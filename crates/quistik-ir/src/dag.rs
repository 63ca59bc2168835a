//! DAG-based circuit representation.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex as PetNodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }

    #[inline]
    fn instruction_mut(&mut self) -> Option<&mut Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG, carrying the wire it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// The abstraction level of a circuit in the compilation pipeline.
///
/// Circuits start `Logical` and become `Physical` once routing has
/// rewritten their qubits onto device positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CircuitLevel {
    /// Qubits are abstract.
    #[default]
    Logical,
    /// Qubits name physical device positions.
    Physical,
}

/// DAG-based circuit representation.
///
/// Every wire runs from its `In` node through the operations touching it
/// to its `Out` node, one edge per hop. Nodes live in a stable graph, so
/// indices held by a pass stay valid while other nodes are removed.
///
/// `wire_front` maps each wire to the node just before its `Out` node,
/// which keeps `apply` O(operands).
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: StableDiGraph<DagNode, DagEdge, u32>,
    qubit_io: BTreeMap<QubitId, (NodeIndex, NodeIndex)>,
    clbit_io: BTreeMap<ClbitId, (NodeIndex, NodeIndex)>,
    wire_front: FxHashMap<WireId, NodeIndex>,
    global_phase: f64,
    level: CircuitLevel,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit wire. Adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.qubit_io.contains_key(&qubit) {
            return;
        }
        let io = self.add_wire(WireId::Qubit(qubit));
        self.qubit_io.insert(qubit, io);
    }

    /// Add a classical wire. Adding an existing bit is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.clbit_io.contains_key(&clbit) {
            return;
        }
        let io = self.add_wire(WireId::Clbit(clbit));
        self.clbit_io.insert(clbit, io);
    }

    fn add_wire(&mut self, wire: WireId) -> (NodeIndex, NodeIndex) {
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.wire_front.insert(wire, in_node);
        (in_node, out_node)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        match &instruction.kind {
            InstructionKind::Gate(gate) if gate.num_qubits() != instruction.qubits.len() => {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: gate.num_qubits(),
                    got: instruction.qubits.len(),
                });
            }
            InstructionKind::Measure if instruction.qubits.len() != instruction.clbits.len() => {
                return Err(IrError::MeasureMismatch {
                    qubits: instruction.qubits.len(),
                    clbits: instruction.clbits.len(),
                });
            }
            _ => {}
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.qubit_io.contains_key(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if !self.clbit_io.contains_key(&clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Append an instruction at the end of its wires.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.validate(&instruction)?;
        let wires = wires_of(&instruction);
        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for wire in wires {
            let out_node = self.output_node(wire)?;
            let prev_node = self.wire_front[&wire];
            let edge = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!("wire {wire:?} is not connected to its output"))
                })?;
            self.graph.remove_edge(edge);
            self.graph.add_edge(prev_node, op_node, DagEdge { wire });
            self.graph.add_edge(op_node, out_node, DagEdge { wire });
            self.wire_front.insert(wire, op_node);
        }

        Ok(op_node)
    }

    fn output_node(&self, wire: WireId) -> IrResult<NodeIndex> {
        let io = match wire {
            WireId::Qubit(q) => self.qubit_io.get(&q),
            WireId::Clbit(c) => self.clbit_io.get(&c),
        };
        io.map(|&(_, out)| out)
            .ok_or_else(|| IrError::InvalidDag(format!("unknown wire {wire:?}")))
    }

    /// Operations in topological order.
    ///
    /// Among ready nodes the one inserted first comes first, so a circuit
    /// built gate by gate iterates in the order it was written.
    pub fn topological_ops(&self) -> Vec<(NodeIndex, &Instruction)> {
        self.topological_nodes()
            .into_iter()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
            .collect()
    }

    fn topological_nodes(&self) -> Vec<NodeIndex> {
        let mut in_degree: FxHashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|n| {
                let degree = self.graph.edges_directed(n, Direction::Incoming).count();
                (n, degree)
            })
            .collect();
        let mut ready: BinaryHeap<Reverse<NodeIndex>> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| Reverse(*n))
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&edge.target()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(edge.target()));
                    }
                }
            }
        }
        order
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// Get a mutable instruction by node index.
    ///
    /// Callers may change the gate and its angles but not the operands.
    #[inline]
    pub fn get_instruction_mut(&mut self, node: NodeIndex) -> Option<&mut Instruction> {
        self.graph
            .node_weight_mut(node)
            .and_then(DagNode::instruction_mut)
    }

    /// The operation node immediately after `node` on `wire`, if any.
    pub fn next_on_wire(&self, node: NodeIndex, wire: WireId) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire)
            .map(|e| e.target())
            .filter(|n| matches!(self.graph[*n], DagNode::Op(_)))
    }

    /// The operation node immediately before `node` on `wire`, if any.
    pub fn prev_on_wire(&self, node: NodeIndex, wire: WireId) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find(|e| e.weight().wire == wire)
            .map(|e| e.source())
            .filter(|n| matches!(self.graph[*n], DagNode::Op(_)))
    }

    /// Operations on a qubit wire, first to last.
    pub fn wire_ops(&self, qubit: QubitId) -> Vec<NodeIndex> {
        let wire = WireId::Qubit(qubit);
        let mut ops = vec![];
        let Some(&(input, _)) = self.qubit_io.get(&qubit) else {
            return ops;
        };
        let mut current = input;
        while let Some(next) = self.next_on_wire(current, wire) {
            ops.push(next);
            current = next;
        }
        ops
    }

    /// Remove an operation, joining its neighbours on every wire it touched.
    pub fn remove_op(&mut self, node: NodeIndex) -> IrResult<Instruction> {
        self.replace_op(node, Vec::new())
    }

    /// Replace an operation by a sequence of instructions, in place.
    ///
    /// The replacement may only touch wires of the replaced operation; it
    /// is spliced between the operation's predecessors and successors, so
    /// the rest of the circuit keeps its order.
    pub fn replace_op(
        &mut self,
        node: NodeIndex,
        replacement: Vec<Instruction>,
    ) -> IrResult<Instruction> {
        let old = self
            .get_instruction(node)
            .ok_or(IrError::InvalidNode)?
            .clone();
        let old_wires = wires_of(&old);

        for inst in &replacement {
            self.validate(inst)?;
            if let Some(stray) = wires_of(inst).into_iter().find(|w| !old_wires.contains(w)) {
                return Err(IrError::InvalidDag(format!(
                    "replacement for '{}' touches foreign wire {stray:?}",
                    old.name()
                )));
            }
        }

        let mut ends: FxHashMap<WireId, (NodeIndex, NodeIndex)> = FxHashMap::default();
        for edge in self.graph.edges_directed(node, Direction::Incoming) {
            ends.entry(edge.weight().wire).or_insert((edge.source(), edge.source())).0 = edge.source();
        }
        for edge in self.graph.edges_directed(node, Direction::Outgoing) {
            if let Some(entry) = ends.get_mut(&edge.weight().wire) {
                entry.1 = edge.target();
            }
        }
        self.graph.remove_node(node);

        let mut current: FxHashMap<WireId, NodeIndex> =
            ends.iter().map(|(w, (pred, _))| (*w, *pred)).collect();
        for inst in replacement {
            let wires = wires_of(&inst);
            let new_node = self.graph.add_node(DagNode::Op(inst));
            for wire in wires {
                let prev = current[&wire];
                self.graph.add_edge(prev, new_node, DagEdge { wire });
                current.insert(wire, new_node);
            }
        }

        for (wire, (_, succ)) in ends {
            let last = current[&wire];
            self.graph.add_edge(last, succ, DagEdge { wire });
            if self.wire_front.get(&wire) == Some(&node) {
                self.wire_front.insert(wire, last);
            }
        }

        Ok(old)
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubit_io.len()
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.clbit_io.len()
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        let io_nodes = 2 * (self.qubit_io.len() + self.clbit_io.len());
        self.graph.node_count().saturating_sub(io_nodes)
    }

    /// Longest chain of operations, not counting barriers.
    pub fn depth(&self) -> usize {
        let mut depths: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut max_depth = 0;

        for node in self.topological_nodes() {
            let max_pred = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths.get(&e.source()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            let counts = self.graph[node]
                .instruction()
                .is_some_and(|inst| !inst.is_barrier());
            let node_depth = max_pred + usize::from(counts);
            max_depth = max_depth.max(node_depth);
            depths.insert(node, node_depth);
        }
        max_depth
    }

    /// Number of operations per instruction name.
    pub fn count_ops(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for node in self.graph.node_weights() {
            if let Some(inst) = node.instruction() {
                *counts.entry(inst.name()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Qubits in ascending order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.qubit_io.keys().copied()
    }

    /// Classical bits in ascending order.
    pub fn clbits(&self) -> impl Iterator<Item = ClbitId> + '_ {
        self.clbit_io.keys().copied()
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Accumulate a global phase.
    pub fn add_global_phase(&mut self, phase: f64) {
        self.global_phase += phase;
    }

    /// Get the abstraction level.
    pub fn level(&self) -> CircuitLevel {
        self.level
    }

    /// Set the abstraction level.
    pub fn set_level(&mut self, level: CircuitLevel) {
        self.level = level;
    }
}

fn wires_of(instruction: &Instruction) -> Vec<WireId> {
    instruction
        .qubits
        .iter()
        .map(|&q| WireId::Qubit(q))
        .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn bell_dag() -> CircuitDag {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));
        dag.add_clbit(ClbitId(0));
        dag.add_clbit(ClbitId(1));
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::two_qubit_gate(
            StandardGate::CX,
            QubitId(0),
            QubitId(1),
        ))
        .unwrap();
        dag.apply(Instruction::measure(QubitId(0), ClbitId(0)))
            .unwrap();
        dag.apply(Instruction::measure(QubitId(1), ClbitId(1)))
            .unwrap();
        dag
    }

    fn names(dag: &CircuitDag) -> Vec<&'static str> {
        dag.topological_ops()
            .into_iter()
            .map(|(_, inst)| inst.name())
            .collect()
    }

    #[test]
    fn test_apply_and_order() {
        let dag = bell_dag();
        assert_eq!(dag.num_ops(), 4);
        assert_eq!(names(&dag), vec!["h", "cx", "measure", "measure"]);
        assert_eq!(dag.depth(), 3);
    }

    #[test]
    fn test_apply_validation() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        dag.add_qubit(QubitId(1));

        let err = dag
            .apply(Instruction::gate(StandardGate::CX, [QubitId(0)]))
            .unwrap_err();
        assert!(matches!(err, IrError::QubitCountMismatch { .. }));

        let err = dag
            .apply(Instruction::two_qubit_gate(
                StandardGate::CX,
                QubitId(0),
                QubitId(0),
            ))
            .unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));

        let err = dag
            .apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(7)))
            .unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { .. }));

        let err = dag
            .apply(Instruction::measure(QubitId(0), ClbitId(0)))
            .unwrap_err();
        assert!(matches!(err, IrError::ClbitNotFound { .. }));
    }

    #[test]
    fn test_remove_op_reconnects() {
        let mut dag = bell_dag();
        let (h, _) = dag.topological_ops()[0];
        let removed = dag.remove_op(h).unwrap();
        assert_eq!(removed.name(), "h");
        assert_eq!(names(&dag), vec!["cx", "measure", "measure"]);

        // Appending after a removal still lands at the end of the wire.
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        assert_eq!(dag.wire_ops(QubitId(0)).len(), 3);
        let last = *dag.wire_ops(QubitId(0)).last().unwrap();
        assert_eq!(dag.get_instruction(last).unwrap().name(), "x");
    }

    #[test]
    fn test_replace_op_splices_in_place() {
        let mut dag = bell_dag();
        let (cx, _) = dag.topological_ops()[1];
        dag.replace_op(
            cx,
            vec![
                Instruction::single_qubit_gate(StandardGate::H, QubitId(1)),
                Instruction::two_qubit_gate(StandardGate::CZ, QubitId(0), QubitId(1)),
                Instruction::single_qubit_gate(StandardGate::H, QubitId(1)),
            ],
        )
        .unwrap();

        let wire1: Vec<_> = dag
            .wire_ops(QubitId(1))
            .into_iter()
            .map(|n| dag.get_instruction(n).unwrap().name())
            .collect();
        assert_eq!(wire1, vec!["h", "cz", "h", "measure"]);
        let wire0: Vec<_> = dag
            .wire_ops(QubitId(0))
            .into_iter()
            .map(|n| dag.get_instruction(n).unwrap().name())
            .collect();
        assert_eq!(wire0, vec!["h", "cz", "measure"]);
    }

    #[test]
    fn test_replace_op_rejects_foreign_wire() {
        let mut dag = bell_dag();
        let (h, _) = dag.topological_ops()[0];
        let err = dag
            .replace_op(
                h,
                vec![Instruction::single_qubit_gate(StandardGate::X, QubitId(1))],
            )
            .unwrap_err();
        assert!(matches!(err, IrError::InvalidDag(_)));
        assert_eq!(dag.num_ops(), 4);
    }

    #[test]
    fn test_replace_last_op_updates_front() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(0));
        let h = dag
            .apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.replace_op(
            h,
            vec![
                Instruction::single_qubit_gate(StandardGate::Rz(1.0), QubitId(0)),
                Instruction::single_qubit_gate(StandardGate::SX, QubitId(0)),
            ],
        )
        .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        assert_eq!(names(&dag), vec!["rz", "sx", "x"]);
    }

    #[test]
    fn test_count_ops_and_barrier_depth() {
        let mut dag = bell_dag();
        dag.apply(Instruction::barrier([QubitId(0), QubitId(1)]))
            .unwrap();
        let counts = dag.count_ops();
        assert_eq!(counts["measure"], 2);
        assert_eq!(counts["barrier"], 1);
        assert_eq!(dag.depth(), 3);
    }
}
