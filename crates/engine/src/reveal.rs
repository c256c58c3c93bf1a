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

//! Lines revealed by progressive (animated) display.
//!
//! When a front end animates a trace, lines stay cloaked until execution reaches
//! them. Reaching a line also reveals the statements enclosing it: from the executed
//! line we walk upward until we hit a line that starts in column one, revealing every
//! line on the way. The set only ever grows as the cursor advances.

use std::collections::{BTreeSet, HashMap};

use edtrace_common::{Location, Step, Trace, TraceError};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Locations revealed up to some step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevealedSet(BTreeSet<Location>);

impl RevealedSet {
    /// Whether `location` is revealed
    pub fn contains(&self, location: &Location) -> bool {
        self.0.contains(location)
    }

    /// Whether line `line_number` of `path` is revealed
    pub fn contains_line(&self, path: &str, line_number: u32) -> bool {
        self.0.contains(&Location::new(path, line_number))
    }

    /// Number of revealed locations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is revealed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Revealed locations in (path, line) order
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.0.iter()
    }

    /// Whether every location of `other` is revealed here too
    pub fn is_superset(&self, other: &Self) -> bool {
        self.0.is_superset(&other.0)
    }
}

/// Incrementally accumulates a [`RevealedSet`] one executed step at a time
#[derive(Debug)]
pub struct RevealTracker<'a> {
    trace: &'a Trace,
    lines: HashMap<&'a str, Vec<&'a str>>,
    revealed: RevealedSet,
}

impl<'a> RevealTracker<'a> {
    /// Start with nothing revealed
    pub fn new(trace: &'a Trace) -> Self {
        Self { trace, lines: HashMap::new(), revealed: RevealedSet::default() }
    }

    /// Reveal the active line of `step` and the enclosing lines above it
    pub fn visit(&mut self, step: &'a Step) {
        let frame = step.active_frame();
        let trace = self.trace;
        let lines = self
            .lines
            .entry(frame.path.as_str())
            .or_insert_with(|| trace.file(&frame.path).unwrap_or_default().split('\n').collect());

        let mut line_number = frame.line_number;
        loop {
            if !self.revealed.0.insert(Location::new(frame.path.as_str(), line_number)) {
                break;
            }

            let text = usize::try_from(line_number)
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| lines.get(i));
            match text {
                Some(text) if is_indented(text) => {}
                // Column-one statement, or past the end of the recorded source
                _ => break,
            }

            line_number -= 1;
            if line_number == 0 {
                break;
            }
        }
    }

    /// The locations revealed so far
    pub fn revealed(&self) -> &RevealedSet {
        &self.revealed
    }

    /// Finish and take the revealed set
    pub fn finish(self) -> RevealedSet {
        self.revealed
    }
}

/// A line that does not start with a non-whitespace character
fn is_indented(text: &str) -> bool {
    !text.chars().next().is_some_and(|c| !c.is_whitespace())
}

/// Compute the locations revealed once steps `0..=index` have executed
pub fn compute_revealed(trace: &Trace, index: usize) -> Result<RevealedSet, TraceError> {
    trace.get_step(index)?;

    let mut tracker = RevealTracker::new(trace);
    for step in &trace.steps()[..=index] {
        tracker.visit(step);
    }

    let revealed = tracker.finish();
    trace!(index, revealed = revealed.len(), "computed revealed lines");
    Ok(revealed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edtrace_common::test_utils::{nested_call_trace, TraceBuilder};

    fn lines(revealed: &RevealedSet, path: &str) -> Vec<u32> {
        revealed.iter().filter(|l| l.path == path).map(|l| l.line_number).collect()
    }

    #[test]
    fn test_reveals_enclosing_block() {
        let trace = TraceBuilder::new()
            .file("f.py", "def f():\n  a = 1\n  b = 2")
            .step(&[("f.py", 3)])
            .build();

        let revealed = compute_revealed(&trace, 0).unwrap();
        assert_eq!(lines(&revealed, "f.py"), vec![1, 2, 3]);
    }

    #[test]
    fn test_unindented_line_reveals_only_itself() {
        let trace = TraceBuilder::new()
            .file("m.py", "x = 1\ny = 2\nz = 3\n")
            .step(&[("m.py", 3)])
            .build();
        assert_eq!(lines(&compute_revealed(&trace, 0).unwrap(), "m.py"), vec![3]);
    }

    #[test]
    fn test_blank_lines_do_not_stop_the_walk() {
        let trace = TraceBuilder::new()
            .file("m.py", "for i in r:\n\n\tx = i\n")
            .step(&[("m.py", 3)])
            .build();
        assert_eq!(lines(&compute_revealed(&trace, 0).unwrap(), "m.py"), vec![1, 2, 3]);
    }

    #[test]
    fn test_walk_stops_at_already_revealed_line() {
        let trace = TraceBuilder::new()
            .file("f.py", "def f():\n  a = 1\n  b = 2\n  c = 3")
            .step(&[("f.py", 2)])
            .step(&[("f.py", 4)])
            .build();

        let mut tracker = RevealTracker::new(&trace);
        tracker.visit(&trace.steps()[0]);
        assert_eq!(lines(tracker.revealed(), "f.py"), vec![1, 2]);
        tracker.visit(&trace.steps()[1]);
        // Line 3 is revealed on the way up, line 2 stops the walk
        assert_eq!(lines(tracker.revealed(), "f.py"), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_indented_first_line_stops_at_top() {
        let trace = TraceBuilder::new()
            .file("s.py", "    a\n    b\n")
            .step(&[("s.py", 2)])
            .build();
        assert_eq!(lines(&compute_revealed(&trace, 0).unwrap(), "s.py"), vec![1, 2]);
    }

    #[test]
    fn test_line_past_end_of_file_is_revealed_alone() {
        let trace = TraceBuilder::new().file("s.py", "  a\n").step(&[("s.py", 9)]).build();
        assert_eq!(lines(&compute_revealed(&trace, 0).unwrap(), "s.py"), vec![9]);
    }

    #[test]
    fn test_revealed_set_grows_monotonically() {
        let trace = nested_call_trace();
        let mut previous = compute_revealed(&trace, 0).unwrap();
        for index in 1..trace.len() {
            let current = compute_revealed(&trace, index).unwrap();
            assert!(current.is_superset(&previous), "shrunk at step {index}");
            previous = current;
        }

        assert!(previous.contains_line("B", 2));
        assert!(previous.contains_line("B", 1));
        assert!(!previous.contains_line("A", 4));
    }

    #[test]
    fn test_out_of_bounds_index() {
        let trace = nested_call_trace();
        assert!(matches!(compute_revealed(&trace, 9), Err(TraceError::StepOutOfBounds { .. })));
    }
}
