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

//! Test fixtures for building traces.
//!
//! [`TraceBuilder`] assembles a validated [`Trace`] step by step. Files referenced by
//! an active frame but never registered get a placeholder body of unindented lines,
//! so tests that do not care about source text need not spell it out.

use std::collections::{BTreeSet, HashMap};

use crate::{Rendering, StackFrame, Step, Trace, Value};

/// The call-and-return trace used throughout the navigation tests:
///
/// ```text
/// 0: A@1
/// 1: A@2
/// 2: A@2 > B@1
/// 3: A@2 > B@2
/// 4: A@3
/// ```
pub const NESTED_CALL_TRACE_JSON: &str = r#"{
    "steps": [
        {"stack": [{"path": "A", "line_number": 1}], "env": {"x": {"type": "int", "contents": 1}}, "renderings": []},
        {"stack": [{"path": "A", "line_number": 2}], "env": {"y": {"type": "int", "contents": 2}}, "renderings": []},
        {"stack": [{"path": "A", "line_number": 2}, {"path": "B", "line_number": 1}], "env": {"z": {"type": "str", "contents": "inner"}}, "renderings": []},
        {"stack": [{"path": "A", "line_number": 2}, {"path": "B", "line_number": 2}], "env": {}, "renderings": [{"type": "note", "data": "returning"}]},
        {"stack": [{"path": "A", "line_number": 3}], "env": {"x": null}, "renderings": [{"type": "markdown", "data": "**done**"}]}
    ],
    "files": {
        "A": "x = 1\ny = f(x)\ndel x\n",
        "B": "def f(x):\n    return x + 1\n"
    },
    "hidden_line_numbers": {}
}"#;

/// Builder for in-memory traces
#[derive(Debug, Default)]
pub struct TraceBuilder {
    steps: Vec<Step>,
    files: HashMap<String, String>,
    hidden: HashMap<String, BTreeSet<u32>>,
}

impl TraceBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the source text of a file
    pub fn file(mut self, path: &str, text: &str) -> Self {
        self.files.insert(path.to_string(), text.to_string());
        self
    }

    /// Mark lines of a file as hidden
    pub fn hidden(mut self, path: &str, lines: impl IntoIterator<Item = u32>) -> Self {
        self.hidden.entry(path.to_string()).or_default().extend(lines);
        self
    }

    /// Append a step with the given `(path, line)` stack and no bindings
    pub fn step(self, stack: &[(&str, u32)]) -> Self {
        self.step_with_env(stack, &[])
    }

    /// Append a step with the given stack and environment delta
    pub fn step_with_env(mut self, stack: &[(&str, u32)], env: &[(&str, Option<Value>)]) -> Self {
        let mut step =
            Step::new(stack.iter().map(|(path, line)| StackFrame::new(*path, *line)).collect());
        step.env = env.iter().map(|(name, value)| (name.to_string(), value.clone())).collect();
        self.steps.push(step);
        self
    }

    /// Attach a rendering to the most recently added step
    pub fn rendering(mut self, rendering: Rendering) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.renderings.push(rendering);
        }
        self
    }

    /// Build the trace, panicking if it is structurally invalid
    pub fn build(mut self) -> Trace {
        let mut longest: HashMap<String, u32> = HashMap::new();
        for frame in self.steps.iter().filter_map(|step| step.stack.last()) {
            let entry = longest.entry(frame.path.clone()).or_default();
            *entry = (*entry).max(frame.line_number);
        }
        for (path, lines) in longest {
            self.files.entry(path).or_insert_with(|| placeholder_source(lines));
        }

        Trace::new(self.steps, self.files, self.hidden).expect("test trace must be well formed")
    }
}

fn placeholder_source(lines: u32) -> String {
    (1..=lines).map(|n| format!("stmt_{n}\n")).collect()
}

/// Parse [`NESTED_CALL_TRACE_JSON`]
pub fn nested_call_trace() -> Trace {
    Trace::from_json_str(NESTED_CALL_TRACE_JSON).expect("fixture must be well formed")
}
