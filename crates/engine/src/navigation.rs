// EDTrace - Execution Trace Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Stepping primitives over a recorded trace.
//!
//! Every move is a linear scan from the current step in one direction, stopping at
//! the first step that satisfies a predicate built from the [`stack`](crate::stack)
//! relations. [`StepScan`] is the one scan primitive; the moves differ only in their
//! starting point and predicate.
//!
//! A move that finds nothing returns `None`, and the caller leaves its cursor where it
//! was. Running off either end of the trace is never an error.

use edtrace_common::{Location, Trace};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stack::{is_ancestor_context, same_activation};

/// Direction of travel through the trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards later steps
    #[default]
    Forward,
    /// Towards earlier steps
    Backward,
}

impl Direction {
    /// The index one step away from `index`, if it does not underflow
    pub fn offset(self, index: usize) -> Option<usize> {
        match self {
            Self::Forward => index.checked_add(1),
            Self::Backward => index.checked_sub(1),
        }
    }
}

/// Lazy sequence of step indices walking away from a starting point.
///
/// The sequence ends at the trace boundary. It is cheap to create, so a scan is
/// restarted by building a new one rather than rewinding.
#[derive(Debug, Clone)]
pub struct StepScan {
    next: Option<usize>,
    len: usize,
    direction: Direction,
}

impl StepScan {
    /// Scan that yields `start` first
    pub fn starting_at(start: usize, len: usize, direction: Direction) -> Self {
        Self { next: (start < len).then_some(start), len, direction }
    }

    /// Scan that yields the neighbour of `current` first
    pub fn after(current: usize, len: usize, direction: Direction) -> Self {
        let next = if current < len { direction.offset(current).filter(|i| *i < len) } else { None };
        Self { next, len, direction }
    }
}

impl Iterator for StepScan {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.next?;
        self.next = self.direction.offset(index).filter(|i| *i < self.len);
        Some(index)
    }
}

impl std::iter::FusedIterator for StepScan {}

/// A stepping request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Move {
    /// Move to the adjacent step, entering or leaving calls as they come
    Into {
        /// Direction of travel
        direction: Direction,
    },
    /// Move to the next step of the current activation, skipping nested calls
    Over {
        /// Direction of travel
        direction: Direction,
        /// Skip steps that stay on the current line
        #[serde(default)]
        require_new_line: bool,
    },
    /// Move to the first step in an enclosing activation
    Up {
        /// Direction of travel
        direction: Direction,
    },
}

/// Outcome of jumping to a source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum GotoTarget {
    /// A step executing the location was found
    Step(usize),
    /// No step executes the location; show it without step context
    Detached(Location),
}

/// Computes step moves over one trace
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    trace: &'a Trace,
}

impl<'a> Navigator<'a> {
    /// Create a navigator over `trace`
    pub fn new(trace: &'a Trace) -> Self {
        Self { trace }
    }

    /// Apply a stepping request
    pub fn apply(&self, current: usize, mv: Move) -> Option<usize> {
        match mv {
            Move::Into { direction } => self.step_into(current, direction),
            Move::Over { direction, require_new_line } => {
                self.step_over(current, direction, require_new_line)
            }
            Move::Up { direction } => self.step_up(current, direction),
        }
    }

    /// The adjacent step in `direction`
    pub fn step_into(&self, current: usize, direction: Direction) -> Option<usize> {
        StepScan::after(current, self.trace.len(), direction).next()
    }

    /// The next step in `direction` that is in the current activation, or the first
    /// step that has escaped it into a shallower stack.
    ///
    /// With `require_new_line`, steps of the current activation that are still on the
    /// current line are skipped.
    pub fn step_over(
        &self,
        current: usize,
        direction: Direction,
        require_new_line: bool,
    ) -> Option<usize> {
        let origin = self.trace.step(current)?;
        let origin_line = origin.active_frame().line_number;
        let steps = self.trace.steps();

        let target = StepScan::after(current, steps.len(), direction).find(|&i| {
            let stack = &steps[i].stack;
            let same = same_activation(stack, &origin.stack)
                && (!require_new_line || steps[i].active_frame().line_number != origin_line);
            same || is_ancestor_context(stack, &origin.stack)
        });

        debug!(current, ?direction, require_new_line, ?target, "step over");
        target
    }

    /// The first step in `direction` that is strictly in an enclosing context
    pub fn step_up(&self, current: usize, direction: Direction) -> Option<usize> {
        let origin = self.trace.step(current)?;
        let steps = self.trace.steps();

        let target = StepScan::after(current, steps.len(), direction).find(|&i| {
            let stack = &steps[i].stack;
            is_ancestor_context(stack, &origin.stack) && !same_activation(stack, &origin.stack)
        });

        debug!(current, ?direction, ?target, "step up");
        target
    }

    /// The nearest step executing `target`, searching towards it from the current
    /// position.
    ///
    /// If the target line is at or below `current_line` the search runs forward from
    /// the step after `current`; otherwise it runs backward starting at `current`
    /// itself.
    pub fn goto_location(&self, target: &Location, current: usize, current_line: u32) -> GotoTarget {
        let len = self.trace.len();
        let mut scan = if current_line <= target.line_number {
            StepScan::after(current, len, Direction::Forward)
        } else {
            StepScan::starting_at(current, len, Direction::Backward)
        };

        let steps = self.trace.steps();
        match scan.find(|&i| steps[i].active_frame().is_at(target)) {
            Some(index) => {
                debug!(%target, index, "resolved location to step");
                GotoTarget::Step(index)
            }
            None => {
                debug!(%target, "location not executed near cursor, detaching");
                GotoTarget::Detached(target.clone())
            }
        }
    }
}
