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

//! Structural relations between call stacks.
//!
//! Both relations are pure, total and linear in stack depth at worst. They are the
//! only notion of "function boundary" the engine has: a trace records stacks, not
//! call/return events, so entering and leaving activations is inferred by comparing
//! the stacks of two steps.

use edtrace_common::StackFrame;

/// Whether two stacks belong to the same function activation.
///
/// True iff both have the same depth and agree on every frame except the last one,
/// i.e. the same chain of callers is active and only the current line may differ.
pub fn same_activation(a: &[StackFrame], b: &[StackFrame]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let callers = a.len().saturating_sub(1);
    a[..callers] == b[..callers]
}

/// Whether `a` is an ancestor context of `b`.
///
/// This compares depth only: any strictly shallower stack counts, whether or not its
/// frames are a prefix of `b`. Navigation uses it as the "has returned to an enclosing
/// frame" signal.
pub fn is_ancestor_context(a: &[StackFrame], b: &[StackFrame]) -> bool {
    a.len() < b.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(frames: &[(&str, u32)]) -> Vec<StackFrame> {
        frames.iter().map(|(path, line)| StackFrame::new(*path, *line)).collect()
    }

    #[test]
    fn test_same_activation_is_reflexive() {
        for s in [stack(&[("A", 1)]), stack(&[("A", 2), ("B", 1)]), stack(&[("A", 2), ("B", 3), ("C", 9)])] {
            assert!(same_activation(&s, &s));
        }
    }

    #[test]
    fn test_same_activation_ignores_current_line() {
        assert!(same_activation(&stack(&[("A", 1)]), &stack(&[("A", 7)])));
        assert!(same_activation(&stack(&[("A", 2), ("B", 1)]), &stack(&[("A", 2), ("B", 5)])));
        // Only the last frame is free, even if it moved to another file
        assert!(same_activation(&stack(&[("A", 2), ("B", 1)]), &stack(&[("A", 2), ("C", 1)])));
    }

    #[test]
    fn test_same_activation_requires_same_callers() {
        assert!(!same_activation(&stack(&[("A", 2), ("B", 1)]), &stack(&[("A", 3), ("B", 1)])));
        assert!(!same_activation(&stack(&[("A", 2), ("B", 1)]), &stack(&[("X", 2), ("B", 1)])));
        assert!(!same_activation(&stack(&[("A", 2)]), &stack(&[("A", 2), ("B", 1)])));
    }

    #[test]
    fn test_ancestor_context_is_length_only() {
        let shallow = stack(&[("A", 2)]);
        let deep = stack(&[("A", 2), ("B", 1)]);
        let unrelated = stack(&[("Z", 40)]);

        assert!(is_ancestor_context(&shallow, &deep));
        assert!(!is_ancestor_context(&deep, &shallow));
        assert!(!is_ancestor_context(&deep, &deep));
        // Not a prefix, still classified as an ancestor
        assert!(is_ancestor_context(&unrelated, &deep));
    }
}
