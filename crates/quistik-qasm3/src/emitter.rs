//! QASM3 emitter for serializing circuits.

use std::f64::consts::PI;
use std::fmt::Write;

use quistik_ir::{Circuit, CircuitLevel, ClbitId, Instruction, InstructionKind, QubitId, StandardGate};

use crate::error::{Qasm3Error, Qasm3Result};

/// Emit a circuit as `OpenQASM` 3 source.
///
/// Logical circuits declare `qubit[n] q;` and address `q[i]`. Physical
/// circuits (the output of the transpiler) address hardware qubits as
/// `$p` and declare no qubit register.
pub fn emit(circuit: &Circuit) -> Qasm3Result<String> {
    let mut emitter = Emitter {
        output: String::new(),
        physical: circuit.level() == CircuitLevel::Physical,
    };
    emitter.emit_circuit(circuit)?;
    Ok(emitter.output)
}

struct Emitter {
    output: String,
    physical: bool,
}

impl Emitter {
    fn emit_circuit(&mut self, circuit: &Circuit) -> Qasm3Result<()> {
        writeln!(self.output, "OPENQASM 3.0;")?;
        writeln!(self.output, "include \"stdgates.inc\";")?;

        let num_clbits = circuit.num_clbits();
        if num_clbits > 0 {
            writeln!(self.output, "bit[{num_clbits}] c;")?;
        }
        if !self.physical && circuit.num_qubits() > 0 {
            writeln!(self.output, "qubit[{}] q;", circuit.num_qubits())?;
        }

        for (_, instruction) in circuit.dag().topological_ops() {
            self.emit_instruction(instruction)?;
        }
        Ok(())
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> Qasm3Result<()> {
        let qubits = self.qubits(&instruction.qubits);
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let params = gate.params();
                if params.iter().any(|p| !p.is_finite()) {
                    return Err(Qasm3Error::NonFiniteParameter {
                        gate: gate.name().into(),
                    });
                }
                if params.is_empty() {
                    writeln!(self.output, "{} {qubits};", gate.name())?;
                } else {
                    let params: Vec<_> = params.into_iter().map(format_param).collect();
                    writeln!(self.output, "{}({}) {qubits};", gate.name(), params.join(", "))?;
                }
            }

            InstructionKind::Measure => {
                if instruction.qubits.len() != instruction.clbits.len() {
                    return Err(Qasm3Error::MeasureMismatch {
                        qubits: instruction.qubits.len(),
                        clbits: instruction.clbits.len(),
                    });
                }
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    writeln!(self.output, "{} = measure {};", clbit(*c), self.qubit(*q))?;
                }
            }

            InstructionKind::Reset => {
                for q in &instruction.qubits {
                    writeln!(self.output, "reset {};", self.qubit(*q))?;
                }
            }

            InstructionKind::Barrier => {
                if qubits.is_empty() {
                    writeln!(self.output, "barrier;")?;
                } else {
                    writeln!(self.output, "barrier {qubits};")?;
                }
            }
        }
        Ok(())
    }

    fn qubit(&self, qubit: QubitId) -> String {
        if self.physical {
            format!("${}", qubit.0)
        } else {
            format!("q[{}]", qubit.0)
        }
    }

    fn qubits(&self, qubits: &[QubitId]) -> String {
        qubits
            .iter()
            .map(|q| self.qubit(*q))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn clbit(clbit: ClbitId) -> String {
    format!("c[{}]", clbit.0)
}

/// Angles at common multiples of π are written symbolically, anything else
/// with full round-trip precision.
fn format_param(value: f64) -> String {
    const NAMED: [(f64, &str); 8] = [
        (PI, "pi"),
        (-PI, "-pi"),
        (PI / 2.0, "pi/2"),
        (-PI / 2.0, "-pi/2"),
        (PI / 4.0, "pi/4"),
        (-PI / 4.0, "-pi/4"),
        (3.0 * PI / 4.0, "3*pi/4"),
        (-3.0 * PI / 4.0, "-3*pi/4"),
    ];
    NAMED
        .iter()
        .find(|(v, _)| (value - v).abs() < 1e-12)
        .map_or_else(|| format!("{value}"), |(_, name)| (*name).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quistik_ir::CircuitDag;

    #[test]
    fn test_emit_bell_state() {
        let circuit = Circuit::bell().unwrap();
        let qasm = emit(&circuit).unwrap();

        assert!(qasm.starts_with("OPENQASM 3.0;\ninclude \"stdgates.inc\";\n"));
        assert!(qasm.contains("qubit[2] q;"));
        assert!(qasm.contains("bit[2] c;"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("cx q[0], q[1];"));
        assert!(qasm.contains("c[0] = measure q[0];"));
        assert!(qasm.contains("c[1] = measure q[1];"));
    }

    #[test]
    fn test_emit_parameterized() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit
            .rz(PI / 2.0, QubitId(0))
            .unwrap()
            .rz(0.123, QubitId(0))
            .unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("rz(pi/2) q[0];"));
        assert!(qasm.contains("rz(0.123) q[0];"));
        assert!(qasm.contains("qubit[1] q;"));
        assert!(!qasm.lines().any(|line| line.starts_with("bit[")));
    }

    #[test]
    fn test_emit_physical_qubits() {
        let mut dag = CircuitDag::new();
        dag.add_qubit(QubitId(13));
        dag.add_qubit(QubitId(14));
        dag.add_clbit(ClbitId(0));
        dag.add_clbit(ClbitId(1));
        dag.apply(Instruction::two_qubit_gate(StandardGate::ECR, QubitId(13), QubitId(14)))
            .unwrap();
        dag.apply(Instruction::measure(QubitId(14), ClbitId(1))).unwrap();
        dag.set_level(CircuitLevel::Physical);

        let qasm = emit(&Circuit::from_dag(dag)).unwrap();
        assert!(qasm.contains("ecr $13, $14;"));
        assert!(qasm.contains("c[1] = measure $14;"));
        assert!(!qasm.contains("qubit["));
    }

    #[test]
    fn test_non_finite_parameter_rejected() {
        let mut circuit = Circuit::with_size("nan", 1, 0);
        circuit.rz(f64::NAN, QubitId(0)).unwrap();
        assert!(matches!(
            emit(&circuit),
            Err(Qasm3Error::NonFiniteParameter { .. })
        ));
    }

    #[test]
    fn test_format_param() {
        assert_eq!(format_param(PI), "pi");
        assert_eq!(format_param(-PI / 4.0), "-pi/4");
        assert_eq!(format_param(0.5), "0.5");
    }
}
