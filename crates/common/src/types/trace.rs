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

//! Recorded execution trace.
//!
//! A [`Trace`] is loaded once, validated, and never mutated afterwards. Every
//! navigation query addresses it by step index, so the step vector is private and
//! only handed out by shared reference.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Rendering, TraceError, Value};

/// One frame of a recorded call stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StackFrame {
    /// Source file identifier
    pub path: String,
    /// 1-based line number in that file
    pub line_number: u32,
}

impl StackFrame {
    /// Create a new stack frame
    pub fn new(path: impl Into<String>, line_number: u32) -> Self {
        Self { path: path.into(), line_number }
    }

    /// The source location this frame points at
    pub fn location(&self) -> Location {
        Location::new(self.path.clone(), self.line_number)
    }

    /// Whether this frame points at the given location
    pub fn is_at(&self, location: &Location) -> bool {
        self.line_number == location.line_number && self.path == location.path
    }
}

/// A (source path, line number) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Source file identifier
    pub path: String,
    /// 1-based line number in that file
    pub line_number: u32,
}

impl Location {
    /// Create a new location
    pub fn new(path: impl Into<String>, line_number: u32) -> Self {
        Self { path: path.into(), line_number }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line_number)
    }
}

impl From<&StackFrame> for Location {
    fn from(frame: &StackFrame) -> Self {
        frame.location()
    }
}

/// Bindings that changed at a step, in recording order. `None` clears the variable.
pub type EnvDelta = IndexMap<String, Option<Value>>;

/// One recorded execution point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Call stack, root frame first, currently executing frame last
    pub stack: Vec<StackFrame>,
    /// Environment delta relative to the previous step of the same activation
    #[serde(default)]
    pub env: EnvDelta,
    /// Display directives attached to the current line
    #[serde(default)]
    pub renderings: Vec<Rendering>,
}

impl Step {
    /// Create a step with the given stack and no bindings or renderings
    pub fn new(stack: Vec<StackFrame>) -> Self {
        Self { stack, env: EnvDelta::new(), renderings: Vec::new() }
    }

    /// The currently executing frame.
    ///
    /// Stacks are non-empty in every validated trace.
    pub fn active_frame(&self) -> &StackFrame {
        &self.stack[self.stack.len() - 1]
    }
}

/// Wire shape of a trace file
#[derive(Debug, Deserialize)]
struct RawTrace {
    steps: Vec<Step>,
    #[serde(default)]
    files: HashMap<String, String>,
    #[serde(default)]
    hidden_line_numbers: HashMap<String, BTreeSet<u32>>,
}

/// Immutable in-memory representation of one recorded execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    steps: Vec<Step>,
    files: HashMap<String, String>,
    hidden_line_numbers: HashMap<String, BTreeSet<u32>>,
}

impl Trace {
    /// Build a trace from its parts, rejecting structurally invalid input
    pub fn new(
        steps: Vec<Step>,
        files: HashMap<String, String>,
        hidden_line_numbers: HashMap<String, BTreeSet<u32>>,
    ) -> Result<Self, TraceError> {
        let trace = Self { steps, files, hidden_line_numbers };
        trace.validate()?;
        Ok(trace)
    }

    /// Decode and validate a trace from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, TraceError> {
        let raw: RawTrace = serde_json::from_str(json)?;
        Self::new(raw.steps, raw.files, raw.hidden_line_numbers)
    }

    /// Decode and validate a trace from a reader
    pub fn from_reader(reader: impl Read) -> Result<Self, TraceError> {
        let raw: RawTrace = serde_json::from_reader(reader)?;
        Self::new(raw.steps, raw.files, raw.hidden_line_numbers)
    }

    /// Load a trace file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|source| TraceError::Io { path: path.to_path_buf(), source })?;
        let trace = Self::from_reader(BufReader::new(file))?;

        info!(
            path = %path.display(),
            steps = trace.len(),
            files = trace.files.len(),
            "Loaded trace"
        );
        Ok(trace)
    }

    /// Check the structural preconditions every navigation query relies on
    fn validate(&self) -> Result<(), TraceError> {
        if self.steps.is_empty() {
            return Err(TraceError::Empty);
        }

        for (index, step) in self.steps.iter().enumerate() {
            let Some(active) = step.stack.last() else {
                return Err(TraceError::Malformed { step: index, reason: "empty stack".into() });
            };

            if let Some(frame) = step.stack.iter().find(|frame| frame.line_number == 0) {
                return Err(TraceError::Malformed {
                    step: index,
                    reason: format!("frame in {} has line number 0", frame.path),
                });
            }

            if !self.files.contains_key(&active.path) {
                return Err(TraceError::Malformed {
                    step: index,
                    reason: format!("no source text for {}", active.path),
                });
            }
        }

        debug!("Validated trace with {} steps", self.steps.len());
        Ok(())
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a validated trace
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All steps in execution order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The step at `index`, if any
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// The step at `index`, or a [`TraceError::StepOutOfBounds`]
    pub fn get_step(&self, index: usize) -> Result<&Step, TraceError> {
        self.steps.get(index).ok_or(TraceError::StepOutOfBounds { index, total: self.len() })
    }

    /// Full source text of a file
    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Paths of all source files, sorted
    pub fn file_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.files.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Whether a line is excluded from display
    pub fn is_hidden(&self, path: &str, line_number: u32) -> bool {
        self.hidden_line_numbers.get(path).is_some_and(|lines| lines.contains(&line_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "steps": [
            {"stack": [{"path": "a.py", "line_number": 1}], "env": {"x": {"type": "int", "contents": 1}}, "renderings": []},
            {"stack": [{"path": "a.py", "line_number": 2}], "env": {"x": null}}
        ],
        "files": {"a.py": "x = 1\ndel x\n"},
        "hidden_line_numbers": {"a.py": [3]}
    }"#;

    #[test]
    fn test_decode_minimal_trace() {
        let trace = Trace::from_json_str(MINIMAL).unwrap();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.step(0).unwrap().active_frame(), &StackFrame::new("a.py", 1));
        assert_eq!(trace.step(0).unwrap().env.get("x"), Some(&Some(Value::int(1))));
        assert_eq!(trace.step(1).unwrap().env.get("x"), Some(&None));
        assert!(trace.step(1).unwrap().renderings.is_empty());
        assert!(trace.is_hidden("a.py", 3));
        assert!(!trace.is_hidden("a.py", 1));
    }

    #[test]
    fn test_missing_steps_is_decode_error() {
        let err = Trace::from_json_str(r#"{"files": {}}"#).unwrap_err();
        assert!(matches!(err, TraceError::Json(_)));
        assert!(err.is_load_error());
    }

    #[test]
    fn test_negative_line_number_is_decode_error() {
        let json = r#"{"steps": [{"stack": [{"path": "a.py", "line_number": -1}]}], "files": {"a.py": ""}}"#;
        assert!(matches!(Trace::from_json_str(json), Err(TraceError::Json(_))));
    }

    #[test]
    fn test_non_array_stack_is_decode_error() {
        let json = r#"{"steps": [{"stack": {"path": "a.py"}}], "files": {"a.py": ""}}"#;
        assert!(matches!(Trace::from_json_str(json), Err(TraceError::Json(_))));
    }

    #[test]
    fn test_empty_stack_is_malformed() {
        let json = r#"{"steps": [{"stack": []}], "files": {}}"#;
        let err = Trace::from_json_str(json).unwrap_err();
        assert!(matches!(err, TraceError::Malformed { step: 0, .. }));
    }

    #[test]
    fn test_unknown_source_is_malformed() {
        let json = r#"{"steps": [
            {"stack": [{"path": "a.py", "line_number": 1}]},
            {"stack": [{"path": "b.py", "line_number": 1}]}
        ], "files": {"a.py": "pass"}}"#;
        let err = Trace::from_json_str(json).unwrap_err();
        assert!(matches!(err, TraceError::Malformed { step: 1, .. }));
    }

    #[test]
    fn test_zero_line_number_is_malformed() {
        let json = r#"{"steps": [{"stack": [{"path": "a.py", "line_number": 0}]}], "files": {"a.py": ""}}"#;
        assert!(matches!(Trace::from_json_str(json), Err(TraceError::Malformed { .. })));
    }

    #[test]
    fn test_empty_trace_is_rejected() {
        let json = r#"{"steps": [], "files": {}}"#;
        assert!(matches!(Trace::from_json_str(json), Err(TraceError::Empty)));
    }

    #[test]
    fn test_get_step_out_of_bounds() {
        let trace = Trace::from_json_str(MINIMAL).unwrap();
        let err = trace.get_step(5).unwrap_err();
        assert!(matches!(err, TraceError::StepOutOfBounds { index: 5, total: 2 }));
        assert!(!err.is_load_error());
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new("src/main.py", 42).to_string(), "src/main.py:42");
        assert_eq!(StackFrame::new("a.py", 3).location(), Location::new("a.py", 3));
    }
}
