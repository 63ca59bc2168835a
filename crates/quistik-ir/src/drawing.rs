//! Text drawing of a circuit.
//!
//! One row per qubit that carries at least one operation, operations
//! packed left into columns, multi-qubit operations joined by a vertical
//! connector. Physical circuits on large devices stay readable because
//! idle qubits are omitted.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::circuit::Circuit;
use crate::gate::{StandardGate, format_angle};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::QubitId;

struct Cell {
    column: usize,
    row: usize,
    label: String,
}

struct Span {
    column: usize,
    top: usize,
    bottom: usize,
}

fn operand_labels(inst: &Instruction) -> Vec<String> {
    match &inst.kind {
        InstructionKind::Gate(gate) => match gate {
            StandardGate::CX => vec!["■".into(), "X".into()],
            StandardGate::CY => vec!["■".into(), "Y".into()],
            StandardGate::CZ => vec!["■".into(), "■".into()],
            StandardGate::Swap => vec!["x".into(), "x".into()],
            StandardGate::ECR => vec!["ecr:0".into(), "ecr:1".into()],
            other => vec![other.to_string()],
        },
        InstructionKind::Measure => inst.clbits.iter().map(|c| format!("M→{c}")).collect(),
        InstructionKind::Reset => vec!["|0⟩".into()],
        InstructionKind::Barrier => vec!["░".into(); inst.qubits.len()],
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops = self.dag().topological_ops();

        let mut active: Vec<QubitId> = ops
            .iter()
            .flat_map(|(_, inst)| inst.qubits.iter().copied())
            .collect();
        active.sort_unstable();
        active.dedup();

        if self.dag().global_phase().abs() > 1e-12 {
            writeln!(f, "global phase: {}", format_angle(self.dag().global_phase()))?;
        }
        if active.is_empty() {
            return writeln!(f, "(empty circuit: {} qubits)", self.num_qubits());
        }

        let row_of: FxHashMap<QubitId, usize> =
            active.iter().enumerate().map(|(i, q)| (*q, i)).collect();

        let mut next_free = vec![0usize; active.len()];
        let mut cells = vec![];
        let mut spans = vec![];
        for (_, inst) in &ops {
            let rows: Vec<usize> = inst.qubits.iter().map(|q| row_of[q]).collect();
            let (Some(&top), Some(&bottom)) = (rows.iter().min(), rows.iter().max()) else {
                continue;
            };
            let column = next_free[top..=bottom].iter().copied().max().unwrap_or(0);
            for slot in &mut next_free[top..=bottom] {
                *slot = column + 1;
            }
            for (row, label) in rows.iter().zip(operand_labels(inst)) {
                cells.push(Cell {
                    column,
                    row: *row,
                    label,
                });
            }
            if bottom > top && !inst.is_barrier() {
                spans.push(Span {
                    column,
                    top,
                    bottom,
                });
            }
        }

        let num_columns = next_free.iter().copied().max().unwrap_or(0);
        let mut widths = vec![1usize; num_columns];
        for cell in &cells {
            widths[cell.column] = widths[cell.column].max(cell.label.chars().count());
        }

        let names: Vec<String> = active.iter().map(|q| format!("{q}: ")).collect();
        let prefix = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);

        let mut grid: Vec<Vec<Option<String>>> = vec![vec![None; num_columns]; active.len()];
        for cell in cells {
            grid[cell.row][cell.column] = Some(cell.label);
        }
        for span in &spans {
            for row in &mut grid[span.top + 1..span.bottom] {
                row[span.column].get_or_insert_with(|| "┼".into());
            }
        }

        for (row, name) in names.iter().enumerate() {
            write!(f, "{name:<prefix$}─")?;
            for (column, width) in widths.iter().enumerate() {
                let label = grid[row][column].as_deref().unwrap_or("─");
                let pad = width - label.chars().count();
                let left = pad / 2;
                write!(
                    f,
                    "─{}{}{}─",
                    "─".repeat(left),
                    label,
                    "─".repeat(pad - left)
                )?;
            }
            writeln!(f, "─")?;

            if row + 1 < active.len() {
                let mut connector = " ".repeat(prefix + 1);
                for (column, width) in widths.iter().enumerate() {
                    let joined = spans
                        .iter()
                        .any(|s| s.column == column && s.top <= row && row < s.bottom);
                    let mark = if joined { "│" } else { " " };
                    let left = 1 + width / 2;
                    connector.push_str(&" ".repeat(left));
                    connector.push_str(mark);
                    connector.push_str(&" ".repeat(width + 2 - left - 1));
                }
                writeln!(f, "{}", connector.trim_end())?;
            }
        }
        Ok(())
    }
}
