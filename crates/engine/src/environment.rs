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

//! Reconstruction of the live variable environment at a step.
//!
//! Steps record environment deltas only. To get the bindings in effect at a step we
//! walk backward through the trace, collect the deltas of every step in the same
//! activation until the walk climbs into an enclosing context, and fold them in
//! execution order. A name keeps the position where it was first bound, and bindings
//! whose final value is the cleared sentinel are dropped.

use edtrace_common::{EnvDelta, Trace, TraceError, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    navigation::{Direction, StepScan},
    stack::{is_ancestor_context, same_activation},
};

/// Live variable bindings at a step, in the order they were first bound
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(IndexMap<String, Value>);

impl Environment {
    /// Value bound to `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bindings in binding order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Unwrap into the underlying map
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Reconstruct the bindings live at step `index`.
///
/// An activation without any recorded bindings yields an empty environment.
pub fn reconstruct_env(trace: &Trace, index: usize) -> Result<Environment, TraceError> {
    let current = &trace.get_step(index)?.stack;
    let steps = trace.steps();

    // Newest first
    let deltas: Vec<&EnvDelta> = StepScan::starting_at(index, steps.len(), Direction::Backward)
        .map(|i| &steps[i])
        .take_while(|step| {
            same_activation(&step.stack, current) || !is_ancestor_context(&step.stack, current)
        })
        .filter(|step| same_activation(&step.stack, current) && !step.env.is_empty())
        .map(|step| &step.env)
        .collect();

    // Re-inserting an existing key keeps its slot, so a name stays where it was first bound
    let mut folded: IndexMap<&str, Option<&Value>> = IndexMap::new();
    for delta in deltas.iter().rev() {
        for (name, value) in delta.iter() {
            folded.insert(name.as_str(), value.as_ref());
        }
    }

    trace!(index, deltas = deltas.len(), names = folded.len(), "reconstructed environment");

    Ok(Environment(
        folded
            .into_iter()
            .filter_map(|(name, value)| Some((name.to_string(), value?.clone())))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edtrace_common::test_utils::{nested_call_trace, TraceBuilder};

    #[test]
    fn test_fold_clears_null_bindings() {
        let trace = TraceBuilder::new()
            .step_with_env(&[("m", 1)], &[("x", Some(Value::int(1)))])
            .step_with_env(&[("m", 2)], &[("y", Some(Value::int(2)))])
            .step_with_env(&[("m", 3)], &[("x", None)])
            .build();

        let env = reconstruct_env(&trace, 2).unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("y"), Some(&Value::int(2)));
        assert_eq!(env.get("x"), None);

        let env = reconstruct_env(&trace, 1).unwrap();
        assert_eq!(env.get("x"), Some(&Value::int(1)));
        assert_eq!(env.get("y"), Some(&Value::int(2)));
    }

    #[test]
    fn test_bindings_keep_recording_order() {
        let trace = TraceBuilder::new()
            .step_with_env(&[("m", 1)], &[("zeta", Some(Value::int(1)))])
            .step_with_env(&[("m", 2)], &[("alpha", Some(Value::int(2))), ("mid", Some(Value::int(3)))])
            .step_with_env(&[("m", 3)], &[("zeta", Some(Value::int(4))), ("mid", None)])
            .build();

        let names = |index| {
            reconstruct_env(&trace, index)
                .unwrap()
                .iter()
                .map(|(name, _)| name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(1), vec!["zeta", "alpha", "mid"]);
        // Rebinding keeps the first position and clearing removes only that name
        assert_eq!(names(2), vec!["zeta", "alpha"]);
        assert_eq!(reconstruct_env(&trace, 2).unwrap().get("zeta"), Some(&Value::int(4)));

        let json = serde_json::to_string(&reconstruct_env(&trace, 1).unwrap()).unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
    }

    #[test]
    fn test_later_deltas_overwrite_earlier() {
        let trace = TraceBuilder::new()
            .step_with_env(&[("m", 1)], &[("x", Some(Value::int(1)))])
            .step_with_env(&[("m", 2)], &[("x", Some(Value::int(5)))])
            .build();
        assert_eq!(reconstruct_env(&trace, 1).unwrap().get("x"), Some(&Value::int(5)));
    }

    #[test]
    fn test_python_none_is_a_live_binding() {
        let trace = TraceBuilder::new()
            .step_with_env(&[("m", 1)], &[("x", Some(Value::None))])
            .build();
        assert_eq!(reconstruct_env(&trace, 0).unwrap().get("x"), Some(&Value::None));
    }

    #[test]
    fn test_walk_stops_at_enclosing_context() {
        let trace = nested_call_trace();

        // Inside B only B's bindings are visible
        let env = reconstruct_env(&trace, 3).unwrap();
        assert_eq!(env.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(), vec!["z"]);
    }

    #[test]
    fn test_walk_skips_nested_activations() {
        let trace = nested_call_trace();

        // Back in A the deltas recorded inside B are ignored
        let env = reconstruct_env(&trace, 4).unwrap();
        assert_eq!(env.get("y"), Some(&Value::int(2)));
        assert_eq!(env.get("z"), None);
        assert_eq!(env.get("x"), None);
    }

    #[test]
    fn test_empty_activation_yields_empty_environment() {
        let trace = TraceBuilder::new().step(&[("m", 1)]).step(&[("m", 1), ("f", 1)]).build();
        assert!(reconstruct_env(&trace, 1).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_bounds_index() {
        let trace = nested_call_trace();
        assert!(matches!(
            reconstruct_env(&trace, 5),
            Err(TraceError::StepOutOfBounds { index: 5, total: 5 })
        ));
    }

    #[test]
    fn test_environment_serializes_as_map() {
        let trace = nested_call_trace();
        let json = serde_json::to_value(reconstruct_env(&trace, 1).unwrap()).unwrap();
        assert_eq!(json["y"]["contents"], serde_json::json!(2));
        assert_eq!(json["x"]["type"], "int");
    }
}
