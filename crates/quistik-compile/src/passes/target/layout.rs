//! Layout passes for mapping logical qubits to physical qubits.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use quistik_ir::{CircuitDag, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{CouplingMap, ErrorMap, Layout, PropertySet};

fn check_fits(dag: &CircuitDag, coupling_map: &CouplingMap) -> CompileResult<()> {
    if dag.num_qubits() > coupling_map.num_qubits() as usize {
        return Err(CompileError::CircuitTooLarge {
            required: dag.num_qubits(),
            available: coupling_map.num_qubits(),
        });
    }
    Ok(())
}

/// Trivial layout pass.
///
/// Maps logical qubit i to physical qubit i.
pub struct TrivialLayout;

impl Pass for TrivialLayout {
    fn name(&self) -> &'static str {
        "TrivialLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        check_fits(dag, coupling_map)?;

        let mut layout = Layout::new();
        for (i, qubit) in dag.qubits().enumerate() {
            layout.add(qubit, i as u32);
        }
        properties.layout = Some(layout);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}

/// Connectivity- and noise-aware layout.
///
/// Searches for an embedding of the circuit's interaction graph (logical
/// qubits joined by two-qubit gates) into the coupling map, so that every
/// two-qubit gate lands on a coupled pair and routing inserts no SWAPs.
/// When the backend publishes calibration data, the embedding with the
/// lowest summed two-qubit, single-qubit and readout error wins.
///
/// The search is bounded; if no embedding is found within the budget the
/// pass falls back to [`TrivialLayout`] semantics.
pub struct SubgraphLayout {
    max_steps: usize,
}

impl Default for SubgraphLayout {
    fn default() -> Self {
        Self { max_steps: 50_000 }
    }
}

impl SubgraphLayout {
    /// Create a layout pass with the default search budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of search steps.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Penalty for a qubit or pair the calibration data says nothing about.
const UNCALIBRATED: f64 = 1.0;

struct Scorer<'a> {
    errors: Option<&'a ErrorMap>,
}

impl Scorer<'_> {
    fn qubit(&self, physical: u32, measured: bool) -> f64 {
        let Some(errors) = self.errors else {
            return 0.0;
        };
        let gate = errors
            .single_qubit
            .get(&physical)
            .copied()
            .unwrap_or(UNCALIBRATED);
        let readout = if measured {
            errors
                .readout
                .get(&physical)
                .copied()
                .unwrap_or(UNCALIBRATED)
        } else {
            0.0
        };
        gate + readout
    }

    fn pair(&self, a: u32, b: u32) -> f64 {
        self.errors
            .map_or(0.0, |e| e.pair_error(a, b).unwrap_or(UNCALIBRATED))
    }
}

struct Search<'a> {
    coupling_map: &'a CouplingMap,
    scorer: Scorer<'a>,
    order: Vec<QubitId>,
    neighbors: FxHashMap<QubitId, Vec<QubitId>>,
    measured: FxHashSet<QubitId>,
    assignment: FxHashMap<QubitId, u32>,
    used: FxHashSet<u32>,
    best: Option<(f64, FxHashMap<QubitId, u32>)>,
    steps: usize,
    max_steps: usize,
}

impl Search<'_> {
    fn candidates(&self, logical: QubitId) -> Vec<u32> {
        let mapped: Vec<u32> = self.neighbors[&logical]
            .iter()
            .filter_map(|n| self.assignment.get(n).copied())
            .collect();

        let pool: Vec<u32> = match mapped.first() {
            Some(&anchor) => self.coupling_map.neighbors(anchor).to_vec(),
            None => (0..self.coupling_map.num_qubits()).collect(),
        };
        let measured = self.measured.contains(&logical);
        let mut pool: Vec<u32> = pool
            .into_iter()
            .filter(|p| !self.used.contains(p))
            .filter(|&p| mapped.iter().all(|&m| self.coupling_map.is_connected(m, p)))
            .collect();
        pool.sort_by(|a, b| {
            self.scorer
                .qubit(*a, measured)
                .total_cmp(&self.scorer.qubit(*b, measured))
                .then(a.cmp(b))
        });
        pool
    }

    fn step_cost(&self, logical: QubitId, physical: u32) -> f64 {
        let mut cost = self
            .scorer
            .qubit(physical, self.measured.contains(&logical));
        for n in &self.neighbors[&logical] {
            if let Some(&p) = self.assignment.get(n) {
                cost += self.scorer.pair(physical, p);
            }
        }
        cost
    }

    fn descend(&mut self, depth: usize, score: f64) {
        if self.steps >= self.max_steps {
            return;
        }
        self.steps += 1;
        if self.best.as_ref().is_some_and(|(best, _)| score >= *best) {
            return;
        }
        let Some(&logical) = self.order.get(depth) else {
            self.best = Some((score, self.assignment.clone()));
            return;
        };
        for physical in self.candidates(logical) {
            let cost = self.step_cost(logical, physical);
            self.assignment.insert(logical, physical);
            self.used.insert(physical);
            self.descend(depth + 1, score + cost);
            self.assignment.remove(&logical);
            self.used.remove(&physical);
        }
    }
}

/// Logical qubits touched by two-qubit gates, breadth-first from the
/// busiest one, so that each qubit after the first has a mapped neighbour.
fn search_order(neighbors: &FxHashMap<QubitId, Vec<QubitId>>) -> Vec<QubitId> {
    let mut by_degree: Vec<QubitId> = neighbors.keys().copied().collect();
    by_degree.sort_by_key(|q| (std::cmp::Reverse(neighbors[q].len()), *q));

    let mut seen = FxHashSet::default();
    let mut order = vec![];
    for root in by_degree {
        if !seen.insert(root) {
            continue;
        }
        let mut queue = std::collections::VecDeque::from([root]);
        while let Some(q) = queue.pop_front() {
            order.push(q);
            for &n in &neighbors[&q] {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
    }
    order
}

impl Pass for SubgraphLayout {
    fn name(&self) -> &'static str {
        "SubgraphLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        check_fits(dag, coupling_map)?;

        let mut neighbors: FxHashMap<QubitId, Vec<QubitId>> = FxHashMap::default();
        let mut measured = FxHashSet::default();
        for (_, inst) in dag.topological_ops() {
            if inst.is_measure() {
                measured.extend(inst.qubits.iter().copied());
            }
            if inst.is_gate() && inst.qubits.len() == 2 {
                let (a, b) = (inst.qubits[0], inst.qubits[1]);
                let entry = neighbors.entry(a).or_default();
                if !entry.contains(&b) {
                    entry.push(b);
                }
                let entry = neighbors.entry(b).or_default();
                if !entry.contains(&a) {
                    entry.push(a);
                }
            }
        }

        let mut search = Search {
            coupling_map,
            scorer: Scorer {
                errors: properties.error_map.as_ref(),
            },
            order: search_order(&neighbors),
            neighbors,
            measured,
            assignment: FxHashMap::default(),
            used: FxHashSet::default(),
            best: None,
            steps: 0,
            max_steps: self.max_steps,
        };
        search.descend(0, 0.0);
        debug!("SubgraphLayout explored {} states", search.steps);

        let Some((score, assignment)) = search.best else {
            warn!("No interaction-preserving layout found; using trivial layout");
            return TrivialLayout.run(dag, properties);
        };

        // Idle and single-qubit-only qubits take the best remaining slots.
        let mut used: FxHashSet<u32> = assignment.values().copied().collect();
        let mut layout = Layout::new();
        for (&logical, &physical) in &assignment {
            layout.add(logical, physical);
        }
        for logical in dag.qubits().filter(|q| !assignment.contains_key(q)) {
            let measured = search.measured.contains(&logical);
            let best_free = (0..coupling_map.num_qubits())
                .filter(|p| !used.contains(p))
                .min_by(|a, b| {
                    search
                        .scorer
                        .qubit(*a, measured)
                        .total_cmp(&search.scorer.qubit(*b, measured))
                        .then(a.cmp(b))
                })
                .ok_or(CompileError::CircuitTooLarge {
                    required: dag.num_qubits(),
                    available: coupling_map.num_qubits(),
                })?;
            used.insert(best_free);
            layout.add(logical, best_free);
        }

        info!("Selected layout {:?} (error score {score:.4})", layout.pairs());
        properties.layout = Some(layout);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}
