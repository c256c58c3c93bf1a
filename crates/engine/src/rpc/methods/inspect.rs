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

//! Inspection RPC methods
//!
//! Read-only queries over the trace. Each method addresses an explicit `index` when
//! one is given and the cursor's step otherwise.

use edtrace_common::Trace;
use serde_json::Value;

use crate::{
    environment::{reconstruct_env, Environment},
    location::resolve_location as resolve_step_location,
    reveal::{compute_revealed, RevealedSet},
    rpc::{
        types::{IndexParams, RpcError, TraceInfo},
        utils::{parse_optional_params, to_result, trace_error},
    },
    session::Session,
    source::SourceView,
};

/// Explicit index, else the cursor's step. `None` only for a detached cursor.
fn target_index(session: &Session, params: Option<Value>) -> Result<Option<usize>, RpcError> {
    let IndexParams { index } = parse_optional_params(params)?;
    Ok(index.or(session.step_index()))
}

/// Get the step count and source file paths
pub fn get_info(trace: &Trace) -> Result<Value, RpcError> {
    to_result(&TraceInfo::new(trace))
}

/// Get the live bindings at a step
pub fn get_environment(trace: &Trace, session: &Session, params: Option<Value>) -> Result<Value, RpcError> {
    let environment = match target_index(session, params)? {
        Some(index) => reconstruct_env(trace, index).map_err(trace_error)?,
        None => Environment::default(),
    };
    to_result(&environment)
}

/// Get the locations revealed up to a step, sorted
pub fn get_revealed(trace: &Trace, session: &Session, params: Option<Value>) -> Result<Value, RpcError> {
    let revealed = match target_index(session, params)? {
        Some(index) => compute_revealed(trace, index).map_err(trace_error)?,
        None => RevealedSet::default(),
    };
    to_result(&revealed)
}

/// Get the source location of a step
pub fn resolve_location(trace: &Trace, session: &Session, params: Option<Value>) -> Result<Value, RpcError> {
    match target_index(session, params)? {
        Some(index) => to_result(&resolve_step_location(trace, index).map_err(trace_error)?),
        None => to_result(session.location()),
    }
}

/// Get the source view of the session
pub fn get_source_view(trace: &Trace, session: &Session) -> Result<Value, RpcError> {
    to_result(&SourceView::build(trace, session).map_err(trace_error)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::types::error_codes;
    use edtrace_common::{test_utils::nested_call_trace, Location};
    use serde_json::json;

    #[test]
    fn test_environment_defaults_to_cursor() {
        let trace = nested_call_trace();
        let mut session = Session::start(&trace);
        session.goto_step(&trace, 4).unwrap();

        let env = get_environment(&trace, &session, None).unwrap();
        assert_eq!(env, json!({"y": {"type": "int", "contents": 2}}));

        let env = get_environment(&trace, &session, Some(json!({"index": 2}))).unwrap();
        assert_eq!(env["z"]["contents"], "inner");
    }

    #[test]
    fn test_out_of_bounds_index() {
        let trace = nested_call_trace();
        let session = Session::start(&trace);
        let err = get_revealed(&trace, &session, Some(json!({"index": 12}))).unwrap_err();
        assert_eq!(err.code, error_codes::STEP_OUT_OF_BOUNDS);
        let err = resolve_location(&trace, &session, Some(json!({"index": 12}))).unwrap_err();
        assert_eq!(err.code, error_codes::STEP_OUT_OF_BOUNDS);
    }

    #[test]
    fn test_revealed_is_sorted_list() {
        let trace = nested_call_trace();
        let session = Session::start(&trace);
        let revealed = get_revealed(&trace, &session, Some(json!({"index": 3}))).unwrap();
        assert_eq!(
            revealed,
            json!([
                {"path": "A", "line_number": 1},
                {"path": "A", "line_number": 2},
                {"path": "B", "line_number": 1},
                {"path": "B", "line_number": 2},
            ])
        );
    }

    #[test]
    fn test_detached_cursor_inspection() {
        let trace = nested_call_trace();
        let mut session = Session::start(&trace);
        session.goto_location(&trace, Location::new("B", 30));

        assert_eq!(get_environment(&trace, &session, None).unwrap(), json!({}));
        assert_eq!(get_revealed(&trace, &session, None).unwrap(), json!([]));
        assert_eq!(
            resolve_location(&trace, &session, None).unwrap(),
            json!({"path": "B", "line_number": 30})
        );
    }

    #[test]
    fn test_info_and_source_view() {
        let trace = nested_call_trace();
        let session = Session::start(&trace);

        assert_eq!(get_info(&trace).unwrap(), json!({"steps": 5, "files": ["A", "B"]}));

        let view = get_source_view(&trace, &session).unwrap();
        assert_eq!(view["path"], "A");
        assert_eq!(view["lines"][0]["is_current"], true);
    }
}
