//! Trace driver
//!
//! Orchestrates the three-pass algorithm over the normalized units:
//!
//! - **Pass A** applies statements up to the first loop header with emission
//!   suppressed, so variables that name loop bounds exist before discovery.
//! - **Pass B** discovers loop extents by brace matching.
//! - **Pass C** replays from the top of `main` on a fresh variable table and
//!   heap, expanding loops (bounds re-resolved at entry against the live
//!   map) and emitting one deep-copied snapshot per observable change.
//!
//! Emission is a mode flag on the driver, not a separate code path. A trace
//! that would otherwise be empty gets one synthetic "Program start" state.

use tracing::debug;

use crate::config::Limits;
use crate::eval::eval_cond;
use crate::exec;
use crate::flow::{self, LoopBlock, LoopKind, SourceUnit};
use crate::parser;
use crate::state::{StackFrame, State, Variable};
use crate::store::{Heap, VarTable};
use crate::value::Value;

/// Produce the full state sequence for one source text. Total: any input
/// yields at least one state.
pub fn trace(source: &str, limits: &Limits) -> Vec<State> {
    let units = flow::split_units(source);
    let mut driver = Driver {
        vars: VarTable::new(),
        heap: Heap::new(),
        states: Vec::new(),
        emitting: false,
        limits: limits.clone(),
    };

    if let Some((start, end)) = flow::main_body(&units) {
        // Pass A
        for i in start..end {
            if flow::loop_kind(&units[i].text).is_some() {
                break;
            }
            if parser::is_structural(&units[i].text) {
                continue;
            }
            driver.exec_unit(&units[i]);
        }

        // Pass B
        let blocks = flow::discover_loops(&units, start, end);
        debug!(units = units.len(), loops = blocks.len(), "loop discovery");

        // Pass C: fresh state, emission on
        driver.vars = VarTable::new();
        driver.heap = Heap::new();
        driver.emitting = true;
        driver.replay(&units, start, end, &blocks);
    }

    if driver.states.is_empty() {
        driver.states.push(synthetic_start(source));
    }
    debug!(steps = driver.states.len(), "trace complete");
    driver.states
}

struct Driver {
    vars: VarTable,
    heap: Heap,
    states: Vec<State>,
    emitting: bool,
    limits: Limits,
}

impl Driver {
    fn replay(&mut self, units: &[SourceUnit], start: usize, end: usize, blocks: &[LoopBlock]) {
        let mut i = start;
        while i < end {
            if let Some(block) = blocks.iter().find(|b| b.header == i) {
                self.run_loop(units, block);
                i = block.end + 1;
                continue;
            }
            if !parser::is_structural(&units[i].text) {
                self.exec_unit(&units[i]);
            }
            i += 1;
        }
    }

    fn run_loop(&mut self, units: &[SourceUnit], block: &LoopBlock) {
        match block.kind {
            LoopKind::For => {
                let Some(header) = flow::parse_for_header(&units[block.header].text) else {
                    return;
                };
                // bounds resolve at entry, against the live map
                let from = flow::resolve(&header.init, &self.vars);
                let to = flow::resolve(&header.limit, &self.vars);
                let count =
                    flow::iteration_count(from, to, header.cmp, self.limits.max_loop_iterations);
                debug!(var = %header.var, from, to, count, "expanding for loop");
                for n in 0..count {
                    let current = from + header.step * n as i64;
                    self.vars.insert(Variable::primitive(
                        header.var.clone(),
                        "int",
                        Value::Int(current),
                    ));
                    self.run_body(units, block, Some((header.var.as_str(), current)));
                }
            }
            LoopKind::While => {
                // the condition is never consulted; iteration count is fixed
                for _ in 0..self.limits.while_iterations {
                    self.run_body(units, block, None);
                }
            }
        }
    }

    fn run_body(&mut self, units: &[SourceUnit], block: &LoopBlock, subst: Option<(&str, i64)>) {
        let mut j = block.body_start;
        while j < block.end {
            let unit = &units[j];
            let text = match subst {
                Some((name, value)) => flow::substitute_ident(&unit.text, name, value),
                None => unit.text.clone(),
            };

            if let Some(cond) = flow::if_condition(&text) {
                if units.get(j + 1).map(|u| u.text.as_str()) == Some("{") {
                    if eval_cond(&cond, &self.vars) {
                        j += 2;
                    } else {
                        j = flow::matching_close(units, j + 1, block.end)
                            .map(|close| close + 1)
                            .unwrap_or(block.end);
                    }
                    continue;
                }
                j += 1;
                continue;
            }

            if !parser::is_structural(&text) {
                self.exec_substituted(unit, &text);
            }
            j += 1;
        }
    }

    fn exec_unit(&mut self, unit: &SourceUnit) {
        let text = unit.text.clone();
        self.exec_substituted(unit, &text);
    }

    fn exec_substituted(&mut self, unit: &SourceUnit, text: &str) {
        let Some(stmt) = parser::recognize(text) else {
            return;
        };
        if let Some(action) = exec::apply(&stmt, &mut self.vars, &mut self.heap) {
            self.emit(unit.line, &unit.text, action);
        }
    }

    fn emit(&mut self, line: usize, source_code: &str, action: String) {
        if !self.emitting {
            return;
        }
        let variables = self.vars.snapshot();
        self.states.push(State {
            step: self.states.len(),
            current_line: line,
            source_code: source_code.trim().to_string(),
            action: Some(action),
            variables: variables.clone(),
            stack_frames: vec![StackFrame {
                id: "frame_0".to_string(),
                function_name: "main".to_string(),
                line,
                variables,
            }],
            heap: self.heap.snapshot(),
        });
    }
}

fn synthetic_start(source: &str) -> State {
    State {
        step: 0,
        current_line: 1,
        source_code: source.lines().next().unwrap_or("").trim().to_string(),
        action: Some("Program start".to_string()),
        variables: Vec::new(),
        stack_frames: vec![StackFrame {
            id: "frame_0".to_string(),
            function_name: "main".to_string(),
            line: 1,
            variables: Vec::new(),
        }],
        heap: Vec::new(),
    }
}
