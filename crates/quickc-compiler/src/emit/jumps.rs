//! Loop contexts for `break` and `continue`.

use super::JumpLabel;

/// Stack of enclosing loops, innermost last.
#[derive(Debug, Default)]
pub struct JumpManager {
    loops: Vec<LoopContext>,
}

#[derive(Debug)]
struct LoopContext {
    /// Known when `continue` jumps backward (`while`); `None` when the
    /// target is emitted after the body (`for`, `do`).
    continue_target: Option<usize>,
    continue_labels: Vec<JumpLabel>,
    break_labels: Vec<JumpLabel>,
    has_break: bool,
    has_continue: bool,
}

/// What a finished loop contained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopExit {
    pub break_labels: Vec<JumpLabel>,
    pub has_break: bool,
    pub has_continue: bool,
}

impl JumpManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_loop(&mut self, continue_target: Option<usize>) {
        self.loops.push(LoopContext {
            continue_target,
            continue_labels: Vec::new(),
            break_labels: Vec::new(),
            has_break: false,
            has_continue: false,
        });
    }

    pub fn exit_loop(&mut self) -> LoopExit {
        self.loops
            .pop()
            .map(|ctx| LoopExit {
                break_labels: ctx.break_labels,
                has_break: ctx.has_break,
                has_continue: ctx.has_continue,
            })
            .unwrap_or_default()
    }

    pub fn in_loop(&self) -> bool {
        !self.loops.is_empty()
    }

    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }

    /// A `break` only makes the loop's end reachable if it is reachable
    /// itself.
    pub fn add_break(&mut self, label: JumpLabel, reachable: bool) {
        if let Some(ctx) = self.loops.last_mut() {
            ctx.break_labels.push(label);
            ctx.has_break |= reachable;
        }
    }

    pub fn add_continue(&mut self, label: JumpLabel, reachable: bool) {
        if let Some(ctx) = self.loops.last_mut() {
            ctx.continue_labels.push(label);
            ctx.has_continue |= reachable;
        }
    }

    /// Record a backward `continue`, returning its target.
    pub fn note_continue(&mut self, reachable: bool) -> Option<Option<usize>> {
        let ctx = self.loops.last_mut()?;
        ctx.has_continue |= reachable;
        Some(ctx.continue_target)
    }

    /// Forward `continue` jumps of the innermost loop.
    pub fn take_continue_labels(&mut self) -> Vec<JumpLabel> {
        self.loops
            .last_mut()
            .map(|ctx| std::mem::take(&mut ctx.continue_labels))
            .unwrap_or_default()
    }

    /// Forget pending jumps whose operand lies at or after `offset`.
    pub fn discard_from(&mut self, offset: usize) {
        for ctx in &mut self.loops {
            ctx.break_labels.retain(|label| label.0 < offset);
            ctx.continue_labels.retain(|label| label.0 < offset);
        }
    }

    /// Move pending jumps at or after `offset` by `delta` bytes.
    pub fn shift_from(&mut self, offset: usize, delta: usize) {
        for ctx in &mut self.loops {
            for label in ctx.break_labels.iter_mut().chain(ctx.continue_labels.iter_mut()) {
                if label.0 >= offset {
                    label.0 += delta;
                }
            }
        }
    }
}
