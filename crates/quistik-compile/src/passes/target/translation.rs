//! Basis translation pass.

use std::f64::consts::FRAC_PI_2;

use quistik_ir::{CircuitDag, Instruction, QubitId, StandardGate};
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::passes::agnostic::OneQubitBasis;
use crate::property::{BasisGates, CouplingMap, PropertySet};
use crate::unitary::{Unitary2x2, synthesize_u, synthesize_zsx};

/// Rewrites every gate outside the target basis into basis gates, and
/// flips two-qubit gates that sit on a pair only calibrated in the other
/// direction.
///
/// Two-qubit gates go through the target's entangler (`cx`, `ecr` or
/// `cz`); single-qubit gates are resynthesized as `rz`/`sx`/`x` (or `u`).
pub struct BasisTranslation;

/// Nesting bound for recursive decompositions.
const MAX_DEPTH: usize = 6;

struct Translator<'a> {
    basis: &'a BasisGates,
    coupling_map: Option<&'a CouplingMap>,
    one_qubit: OneQubitBasis,
}

fn gate1(gate: StandardGate, q: QubitId) -> Instruction {
    Instruction::single_qubit_gate(gate, q)
}

fn gate2(gate: StandardGate, a: QubitId, b: QubitId) -> Instruction {
    Instruction::two_qubit_gate(gate, a, b)
}

impl Translator<'_> {
    fn untranslatable(&self, gate: &StandardGate) -> CompileError {
        CompileError::UntranslatableGate {
            gate: gate.name().to_string(),
            basis: self.basis.to_string(),
        }
    }

    /// Whether a two-qubit gate may run with `a` first. Pairs the map
    /// does not couple at all are accepted, routing owns those.
    fn direction_ok(&self, gate: &StandardGate, a: QubitId, b: QubitId) -> bool {
        let Some(cm) = self.coupling_map else {
            return true;
        };
        matches!(gate, StandardGate::CZ | StandardGate::Swap)
            || !cm.is_connected(a.0, b.0)
            || cm.supports(a.0, b.0)
    }

    fn translate(&self, inst: Instruction, depth: usize) -> CompileResult<Vec<Instruction>> {
        let Some(gate) = inst.as_gate().copied() else {
            return Ok(vec![inst]);
        };
        if depth > MAX_DEPTH {
            return Err(self.untranslatable(&gate));
        }

        if gate.num_qubits() == 1 {
            if self.basis.contains(gate.name()) {
                return Ok(vec![inst]);
            }
            return self.translate_1q(&gate, inst.qubits[0]);
        }

        let (a, b) = (inst.qubits[0], inst.qubits[1]);
        if self.basis.contains(gate.name()) && self.direction_ok(&gate, a, b) {
            return Ok(vec![inst]);
        }

        let mut out = vec![];
        for step in self.expand_2q(&gate, a, b)? {
            out.extend(self.translate(step, depth + 1)?);
        }
        Ok(out)
    }

    fn translate_1q(&self, gate: &StandardGate, q: QubitId) -> CompileResult<Vec<Instruction>> {
        let unitary = Unitary2x2::from_gate(gate).ok_or_else(|| self.untranslatable(gate))?;
        let gates = match self.one_qubit {
            OneQubitBasis::ZSX { with_x } => synthesize_zsx(&unitary, with_x),
            OneQubitBasis::U if self.basis.contains("u") => synthesize_u(&unitary),
            OneQubitBasis::U => return Err(self.untranslatable(gate)),
        };
        Ok(gates.into_iter().map(|g| gate1(g, q)).collect())
    }

    /// One decomposition step; the result may still need translating.
    fn expand_2q(
        &self,
        gate: &StandardGate,
        a: QubitId,
        b: QubitId,
    ) -> CompileResult<Vec<Instruction>> {
        use StandardGate as G;

        let steps = match gate {
            G::Swap => vec![gate2(G::CX, a, b), gate2(G::CX, b, a), gate2(G::CX, a, b)],
            G::CY => vec![gate1(G::Sdg, b), gate2(G::CX, a, b), gate1(G::S, b)],
            G::CZ => vec![gate1(G::H, b), gate2(G::CX, a, b), gate1(G::H, b)],
            // ECR = X(a) · RZX(π/2), with RZX built from two CX.
            G::ECR => vec![
                gate1(G::H, b),
                gate2(G::CX, a, b),
                gate1(G::Rz(FRAC_PI_2), b),
                gate2(G::CX, a, b),
                gate1(G::H, b),
                gate1(G::X, a),
            ],
            G::CX => self.expand_cx(a, b)?,
            other => return Err(self.untranslatable(other)),
        };
        Ok(steps)
    }

    fn expand_cx(&self, a: QubitId, b: QubitId) -> CompileResult<Vec<Instruction>> {
        use StandardGate as G;

        let forward = self.direction_ok(&G::CX, a, b);
        let steps = match self.basis.entangler() {
            Some("cx") if !forward => vec![
                gate1(G::H, a),
                gate1(G::H, b),
                gate2(G::CX, b, a),
                gate1(G::H, a),
                gate1(G::H, b),
            ],
            Some("ecr") if forward => vec![
                gate1(G::X, a),
                gate2(G::ECR, a, b),
                gate1(G::Rz(FRAC_PI_2), a),
                gate1(G::SX, b),
            ],
            Some("ecr") => vec![
                gate1(G::H, a),
                gate1(G::H, b),
                gate1(G::X, b),
                gate2(G::ECR, b, a),
                gate1(G::Rz(FRAC_PI_2), b),
                gate1(G::SX, a),
                gate1(G::H, a),
                gate1(G::H, b),
            ],
            Some("cz") => vec![gate1(G::H, b), gate2(G::CZ, a, b), gate1(G::H, b)],
            _ => return Err(self.untranslatable(&G::CX)),
        };
        Ok(steps)
    }
}

impl Pass for BasisTranslation {
    fn name(&self) -> &'static str {
        "BasisTranslation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties
            .basis_gates
            .as_ref()
            .ok_or(CompileError::MissingBasisGates)?;
        let translator = Translator {
            basis,
            coupling_map: properties.coupling_map.as_ref(),
            one_qubit: OneQubitBasis::for_target(Some(basis)),
        };

        // Rebuilt in topological order so replacements land where the
        // original gate stood.
        let mut translated = CircuitDag::new();
        for qubit in dag.qubits() {
            translated.add_qubit(qubit);
        }
        for clbit in dag.clbits() {
            translated.add_clbit(clbit);
        }
        translated.add_global_phase(dag.global_phase());
        translated.set_level(dag.level());

        let mut rewritten = 0usize;
        for (_, inst) in dag.topological_ops() {
            let replacement = translator.translate(inst.clone(), 0)?;
            if replacement.len() != 1 || replacement[0] != *inst {
                rewritten += 1;
            }
            for r in replacement {
                translated.apply(r)?;
            }
        }

        debug!("BasisTranslation rewrote {rewritten} instructions");
        *dag = translated;
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.basis_gates.is_some()
    }
}
