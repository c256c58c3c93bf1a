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

//! Mapping between step indices and source locations.

use edtrace_common::{Location, Trace, TraceError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Source location of the active frame at step `index`
pub fn resolve_location(trace: &Trace, index: usize) -> Result<Location, TraceError> {
    Ok(trace.get_step(index)?.active_frame().location())
}

/// First step whose active frame is at `location`
pub fn first_step_at(trace: &Trace, location: &Location) -> Option<usize> {
    trace.steps().iter().position(|step| step.active_frame().is_at(location))
}

/// A position in the trace as seen by a front end.
///
/// A cursor is either bound to a step, in which case `location` is that step's active
/// frame, or detached, showing a location no step executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    /// Bound step, `None` when detached
    pub step: Option<usize>,
    /// Displayed source location
    pub location: Location,
}

impl Cursor {
    /// Cursor showing `location` without step context
    pub fn detached(location: Location) -> Self {
        Self { step: None, location }
    }

    /// Whether the cursor has no bound step
    pub fn is_detached(&self) -> bool {
        self.step.is_none()
    }
}

/// Where a front end asks to start, e.g. from an address bar or the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorTarget {
    /// Requested step index
    #[serde(default)]
    pub step: Option<usize>,
    /// Requested source location
    #[serde(default)]
    pub location: Option<Location>,
}

impl CursorTarget {
    /// Target a step
    pub fn step(index: usize) -> Self {
        Self { step: Some(index), location: None }
    }

    /// Target a source location
    pub fn location(location: Location) -> Self {
        Self { step: None, location: Some(location) }
    }
}

/// Resolve a requested start position into a cursor.
///
/// A step index wins over a location and is clamped to the last step. A location
/// alone binds to the first step executing it, or detaches when none does. Without
/// either the cursor starts at step 0.
pub fn resolve_cursor(trace: &Trace, target: &CursorTarget) -> Cursor {
    let last = trace.len().saturating_sub(1);
    let index = match (target.step, &target.location) {
        (Some(step), _) => step.min(last),
        (None, Some(location)) => match first_step_at(trace, location) {
            Some(index) => index,
            None => {
                debug!(%location, "no step executes requested location");
                return Cursor::detached(location.clone());
            }
        },
        (None, None) => 0,
    };

    let location = trace.steps()[index].active_frame().location();
    Cursor { step: Some(index), location }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edtrace_common::test_utils::nested_call_trace;

    #[test]
    fn test_resolve_location_is_active_frame() {
        let trace = nested_call_trace();
        assert_eq!(resolve_location(&trace, 1).unwrap(), Location::new("A", 2));
        assert_eq!(resolve_location(&trace, 3).unwrap(), Location::new("B", 2));
        assert!(matches!(resolve_location(&trace, 5), Err(TraceError::StepOutOfBounds { .. })));
    }

    #[test]
    fn test_first_step_at() {
        let trace = nested_call_trace();
        assert_eq!(first_step_at(&trace, &Location::new("A", 2)), Some(1));
        assert_eq!(first_step_at(&trace, &Location::new("B", 1)), Some(2));
        assert_eq!(first_step_at(&trace, &Location::new("B", 9)), None);
    }

    #[test]
    fn test_resolve_cursor_defaults_to_first_step() {
        let trace = nested_call_trace();
        let cursor = resolve_cursor(&trace, &CursorTarget::default());
        assert_eq!(cursor, Cursor { step: Some(0), location: Location::new("A", 1) });
    }

    #[test]
    fn test_resolve_cursor_clamps_step() {
        let trace = nested_call_trace();
        let cursor = resolve_cursor(&trace, &CursorTarget::step(99));
        assert_eq!(cursor.step, Some(4));
        assert_eq!(cursor.location, Location::new("A", 3));
    }

    #[test]
    fn test_resolve_cursor_step_wins_over_location() {
        let trace = nested_call_trace();
        let target = CursorTarget { step: Some(2), location: Some(Location::new("A", 3)) };
        assert_eq!(resolve_cursor(&trace, &target).location, Location::new("B", 1));
    }

    #[test]
    fn test_resolve_cursor_by_location() {
        let trace = nested_call_trace();

        let cursor = resolve_cursor(&trace, &CursorTarget::location(Location::new("B", 2)));
        assert_eq!(cursor.step, Some(3));

        let cursor = resolve_cursor(&trace, &CursorTarget::location(Location::new("B", 7)));
        assert!(cursor.is_detached());
        assert_eq!(cursor.location, Location::new("B", 7));
    }

    #[test]
    fn test_cursor_serialization() {
        let json = serde_json::to_value(Cursor::detached(Location::new("A", 1))).unwrap();
        assert_eq!(json, serde_json::json!({"step": null, "location": {"path": "A", "line_number": 1}}));
    }
}
