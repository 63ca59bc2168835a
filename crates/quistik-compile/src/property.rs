//! Target properties and the [`PropertySet`] shared between passes.
//!
//! Layout passes write [`PropertySet::layout`], routing consumes it and
//! records where every logical qubit ended up in
//! [`PropertySet::final_layout`], and translation and verification read
//! the coupling map and basis gates.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use quistik_ir::QubitId;

/// A mapping from logical qubits to physical qubits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    logical_to_physical: FxHashMap<QubitId, u32>,
    physical_to_logical: FxHashMap<u32, QubitId>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical qubit i on physical qubit i.
    pub fn trivial(num_qubits: u32) -> Self {
        let mut layout = Self::new();
        for i in 0..num_qubits {
            layout.add(QubitId(i), i);
        }
        layout
    }

    /// Map `logical` onto `physical`, dropping any mapping either side
    /// previously had.
    pub fn add(&mut self, logical: QubitId, physical: u32) {
        if let Some(old_logical) = self.physical_to_logical.insert(physical, logical) {
            if old_logical != logical {
                self.logical_to_physical.remove(&old_logical);
            }
        }
        if let Some(old_physical) = self.logical_to_physical.insert(logical, physical) {
            if old_physical != physical {
                self.physical_to_logical.remove(&old_physical);
            }
        }
    }

    /// Get the physical qubit for a logical qubit.
    pub fn get_physical(&self, logical: QubitId) -> Option<u32> {
        self.logical_to_physical.get(&logical).copied()
    }

    /// Get the logical qubit for a physical qubit.
    pub fn get_logical(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_logical.get(&physical).copied()
    }

    /// Exchange the contents of two physical qubits.
    pub fn swap(&mut self, p1: u32, p2: u32) {
        let l1 = self.physical_to_logical.remove(&p1);
        let l2 = self.physical_to_logical.remove(&p2);

        if let Some(l1) = l1 {
            self.logical_to_physical.insert(l1, p2);
            self.physical_to_logical.insert(p2, l1);
        }
        if let Some(l2) = l2 {
            self.logical_to_physical.insert(l2, p1);
            self.physical_to_logical.insert(p1, l2);
        }
    }

    /// Get the number of mapped qubits.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// (logical, physical) pairs ordered by logical qubit.
    pub fn pairs(&self) -> Vec<(QubitId, u32)> {
        let mut pairs: Vec<_> = self
            .logical_to_physical
            .iter()
            .map(|(&l, &p)| (l, p))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

/// Device connectivity.
///
/// Keeps the directed pairs the device reports, since some entanglers
/// (`ecr`, `cx` on Eagle devices) are only calibrated in one direction,
/// plus an undirected adjacency and all-pairs BFS tables for routing.
#[derive(Debug, Clone)]
pub struct CouplingMap {
    num_qubits: u32,
    directed: Vec<(u32, u32)>,
    directed_set: FxHashSet<(u32, u32)>,
    adjacency: Vec<Vec<u32>>,
    dist_matrix: Vec<Vec<u32>>,
    pred_matrix: Vec<Vec<u32>>,
}

impl CouplingMap {
    /// Build a map from directed `(control, target)` pairs.
    ///
    /// Pairs naming a qubit `>= num_qubits` and duplicates are ignored.
    pub fn from_pairs(num_qubits: u32, pairs: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let n = num_qubits as usize;
        let mut directed = vec![];
        let mut directed_set = FxHashSet::default();
        let mut adjacency = vec![Vec::new(); n];

        for (a, b) in pairs {
            if a == b || a >= num_qubits || b >= num_qubits || !directed_set.insert((a, b)) {
                continue;
            }
            directed.push((a, b));
            if !adjacency[a as usize].contains(&b) {
                adjacency[a as usize].push(b);
                adjacency[b as usize].push(a);
            }
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        let mut map = Self {
            num_qubits,
            directed,
            directed_set,
            adjacency,
            dist_matrix: vec![],
            pred_matrix: vec![],
        };
        map.precompute_distances();
        map
    }

    /// A linear chain 0-1-2-... coupled in both directions.
    pub fn linear(n: u32) -> Self {
        let pairs = (0..n.saturating_sub(1)).flat_map(|i| [(i, i + 1), (i + 1, i)]);
        Self::from_pairs(n, pairs)
    }

    /// Every qubit coupled to every other, both directions.
    pub fn full(n: u32) -> Self {
        let pairs = (0..n).flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)));
        Self::from_pairs(n, pairs)
    }

    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.dist_matrix = vec![vec![u32::MAX; n]; n];
        self.pred_matrix = vec![vec![u32::MAX; n]; n];

        for src in 0..n {
            self.dist_matrix[src][src] = 0;
            let mut queue = VecDeque::from([src]);
            while let Some(cur) = queue.pop_front() {
                for &neighbor in &self.adjacency[cur] {
                    let nb = neighbor as usize;
                    if self.dist_matrix[src][nb] == u32::MAX {
                        self.dist_matrix[src][nb] = self.dist_matrix[src][cur] + 1;
                        self.pred_matrix[src][nb] = cur as u32;
                        queue.push_back(nb);
                    }
                }
            }
        }
    }

    /// Whether the two qubits are coupled in either direction.
    #[inline]
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.adjacency
            .get(q1 as usize)
            .is_some_and(|neighbors| neighbors.binary_search(&q2).is_ok())
    }

    /// Whether the device supports a two-qubit gate with `control` first.
    #[inline]
    pub fn supports(&self, control: u32, target: u32) -> bool {
        self.directed_set.contains(&(control, target))
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The directed pairs, in the order given.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.directed
    }

    /// Undirected neighbours of a qubit, ascending.
    pub fn neighbors(&self, qubit: u32) -> &[u32] {
        self.adjacency
            .get(qubit as usize)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Shortest-path length in hops, `None` when unreachable.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        let d = *self.dist_matrix.get(from as usize)?.get(to as usize)?;
        (d != u32::MAX).then_some(d)
    }

    /// Shortest path from `from` to `to`, both ends included.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        self.distance(from, to)?;
        let preds = &self.pred_matrix[from as usize];
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            current = preds[current as usize];
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

/// Native gate names of the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisGates {
    gates: Vec<String>,
}

/// Instructions every backend accepts in addition to its basis gates.
const DIRECTIVES: [&str; 4] = ["measure", "reset", "barrier", "delay"];

impl BasisGates {
    /// Create a basis from gate names.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a gate or directive is accepted by the target.
    pub fn contains(&self, gate: &str) -> bool {
        DIRECTIVES.contains(&gate) || self.gates.iter().any(|g| g == gate)
    }

    /// Get the basis gate names.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// The two-qubit entangler used for translation, by preference
    /// `cx`, then `ecr`, then `cz`.
    pub fn entangler(&self) -> Option<&'static str> {
        ["cx", "ecr", "cz"]
            .into_iter()
            .find(|name| self.gates.iter().any(|g| g == name))
    }

    /// Whether single-qubit gates can be synthesized as `rz`/`sx`.
    pub fn supports_zsx(&self) -> bool {
        self.contains("rz") && self.contains("sx")
    }

    /// IBM Eagle processors (`ecr` entangler).
    pub fn ibm_eagle() -> Self {
        Self::new(["ecr", "id", "rz", "sx", "x"])
    }

    /// IBM Heron processors (`cz` entangler).
    pub fn ibm_heron() -> Self {
        Self::new(["cz", "id", "rz", "sx", "x"])
    }
}

impl std::fmt::Display for BasisGates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.gates.join(", "))
    }
}

/// Calibrated error rates, used to score candidate layouts.
#[derive(Debug, Clone, Default)]
pub struct ErrorMap {
    /// Single-qubit gate error per physical qubit.
    pub single_qubit: FxHashMap<u32, f64>,
    /// Two-qubit gate error per directed pair.
    pub two_qubit: FxHashMap<(u32, u32), f64>,
    /// Readout error per physical qubit.
    pub readout: FxHashMap<u32, f64>,
}

impl ErrorMap {
    /// Two-qubit error on a pair in either direction, the lower if both are
    /// calibrated.
    pub fn pair_error(&self, a: u32, b: u32) -> Option<f64> {
        match (self.two_qubit.get(&(a, b)), self.two_qubit.get(&(b, a))) {
            (Some(x), Some(y)) => Some(x.min(*y)),
            (Some(x), None) | (None, Some(x)) => Some(*x),
            (None, None) => None,
        }
    }
}

/// Properties shared between compilation passes.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    /// Initial logical-to-physical mapping, set by layout passes.
    pub layout: Option<Layout>,
    /// Mapping after routing has moved qubits around with SWAPs.
    pub final_layout: Option<Layout>,
    /// Target connectivity.
    pub coupling_map: Option<CouplingMap>,
    /// Target native gates.
    pub basis_gates: Option<BasisGates>,
    /// Calibration data, when the backend publishes it.
    pub error_map: Option<ErrorMap>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.coupling_map = Some(coupling_map);
        self.basis_gates = Some(basis_gates);
        self
    }

    /// Set the initial layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Set calibration data.
    #[must_use]
    pub fn with_error_map(mut self, error_map: ErrorMap) -> Self {
        self.error_map = Some(error_map);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_trivial() {
        let layout = Layout::trivial(5);
        assert_eq!(layout.get_physical(QubitId(0)), Some(0));
        assert_eq!(layout.get_physical(QubitId(4)), Some(4));
        assert_eq!(layout.get_logical(2), Some(QubitId(2)));
    }

    #[test]
    fn test_layout_swap() {
        let mut layout = Layout::trivial(3);
        layout.swap(0, 2);

        assert_eq!(layout.get_physical(QubitId(0)), Some(2));
        assert_eq!(layout.get_physical(QubitId(2)), Some(0));
        assert_eq!(layout.get_logical(0), Some(QubitId(2)));
        assert_eq!(layout.get_logical(2), Some(QubitId(0)));
    }

    #[test]
    fn test_layout_swap_into_empty_slot() {
        let mut layout = Layout::new();
        layout.add(QubitId(0), 4);
        layout.swap(4, 7);
        assert_eq!(layout.get_physical(QubitId(0)), Some(7));
        assert_eq!(layout.get_logical(4), None);
        assert_eq!(layout.len(), 1);
    }

    #[test]
    fn test_layout_add_replaces() {
        let mut layout = Layout::new();
        layout.add(QubitId(0), 1);
        layout.add(QubitId(1), 1);
        assert_eq!(layout.get_physical(QubitId(0)), None);
        assert_eq!(layout.pairs(), vec![(QubitId(1), 1)]);
    }

    #[test]
    fn test_coupling_map_linear() {
        let map = CouplingMap::linear(5);
        assert!(map.is_connected(0, 1));
        assert!(map.is_connected(1, 0));
        assert!(!map.is_connected(0, 2));
        assert_eq!(map.distance(0, 4), Some(4));
        assert_eq!(map.shortest_path(0, 3), Some(vec![0, 1, 2, 3]));
    }

    #[test]
    fn test_coupling_map_direction() {
        let map = CouplingMap::from_pairs(3, [(0, 1), (2, 1), (1, 2), (0, 9)]);
        assert!(map.supports(0, 1));
        assert!(!map.supports(1, 0));
        assert!(map.is_connected(1, 0));
        assert_eq!(map.edges(), &[(0, 1), (2, 1), (1, 2)]);
        assert_eq!(map.neighbors(1), &[0, 2]);
    }

    #[test]
    fn test_coupling_map_disconnected() {
        let map = CouplingMap::from_pairs(4, [(0, 1), (2, 3)]);
        assert_eq!(map.distance(0, 3), None);
        assert_eq!(map.shortest_path(0, 3), None);
    }

    #[test]
    fn test_basis_gates() {
        let eagle = BasisGates::ibm_eagle();
        assert!(eagle.contains("ecr"));
        assert!(eagle.contains("measure"));
        assert!(!eagle.contains("cx"));
        assert_eq!(eagle.entangler(), Some("ecr"));
        assert!(eagle.supports_zsx());

        assert_eq!(BasisGates::ibm_heron().entangler(), Some("cz"));
        assert_eq!(BasisGates::new(["cz", "cx"]).entangler(), Some("cx"));
        assert_eq!(BasisGates::new(["rz"]).entangler(), None);
    }

    #[test]
    fn test_pair_error() {
        let mut errors = ErrorMap::default();
        errors.two_qubit.insert((0, 1), 0.02);
        errors.two_qubit.insert((1, 0), 0.01);
        errors.two_qubit.insert((1, 2), 0.03);
        assert_eq!(errors.pair_error(0, 1), Some(0.01));
        assert_eq!(errors.pair_error(2, 1), Some(0.03));
        assert_eq!(errors.pair_error(0, 2), None);
    }
}
