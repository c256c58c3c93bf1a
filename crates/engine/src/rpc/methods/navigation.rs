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

//! Navigation RPC methods
//!
//! This module implements RPC methods that move the session cursor and change
//! display modes. Running off either end of the trace is a successful call that
//! reports `moved: false`.

use edtrace_common::Trace;
use serde_json::Value;
use tracing::debug;

use crate::{
    navigation::Move,
    rpc::{
        types::{
            CursorInfo, GotoLocationParams, GotoStepParams, KeyParams, MoveResult, RpcError,
            StepParams, ToggleParams,
        },
        utils::{invalid_params, parse_optional_params, parse_params, to_result, trace_error},
    },
    session::{Key, Session},
};

fn moved(trace: &Trace, session: &Session, moved: bool) -> Result<Value, RpcError> {
    to_result(&MoveResult { moved, cursor: CursorInfo::new(trace, session) })
}

/// Get the cursor position, display flags and progress
pub fn get_cursor(trace: &Trace, session: &Session) -> Result<Value, RpcError> {
    to_result(&CursorInfo::new(trace, session))
}

/// Step to the adjacent step
pub fn step_into(trace: &Trace, session: &mut Session, params: Option<Value>) -> Result<Value, RpcError> {
    let StepParams { direction, .. } = parse_optional_params(params)?;
    let result = session.apply(trace, Move::Into { direction });
    moved(trace, session, result)
}

/// Step over nested calls
pub fn step_over(trace: &Trace, session: &mut Session, params: Option<Value>) -> Result<Value, RpcError> {
    let StepParams { direction, require_new_line } = parse_optional_params(params)?;
    let result = session.apply(trace, Move::Over { direction, require_new_line });
    moved(trace, session, result)
}

/// Step out of the current function
pub fn step_up(trace: &Trace, session: &mut Session, params: Option<Value>) -> Result<Value, RpcError> {
    let StepParams { direction, .. } = parse_optional_params(params)?;
    let result = session.apply(trace, Move::Up { direction });
    moved(trace, session, result)
}

/// Set the cursor to a specific step
pub fn goto_step(trace: &Trace, session: &mut Session, params: Option<Value>) -> Result<Value, RpcError> {
    let GotoStepParams { index } = parse_params(params)?;
    let result = session.goto_step(trace, index).map_err(trace_error)?;
    debug!("Set cursor to step: {index}");
    moved(trace, session, result)
}

/// Jump to the nearest step executing a source line
pub fn goto_location(trace: &Trace, session: &mut Session, params: Option<Value>) -> Result<Value, RpcError> {
    let params: GotoLocationParams = parse_params(params)?;
    let result = session.goto_location(trace, params.into());
    moved(trace, session, result)
}

/// Flip a display flag
pub fn toggle(trace: &Trace, session: &mut Session, params: Option<Value>) -> Result<Value, RpcError> {
    let ToggleParams { flag } = parse_params(params)?;
    session.toggle(flag);
    to_result(&CursorInfo::new(trace, session))
}

/// Apply a single keyboard command
pub fn handle_key(trace: &Trace, session: &mut Session, params: Option<Value>) -> Result<Value, RpcError> {
    let KeyParams { key } = parse_params(params)?;

    let mut chars = key.chars();
    let key = match (chars.next(), chars.next()) {
        (Some(c), None) => Key::from_char(c),
        _ => None,
    }
    .ok_or_else(|| invalid_params(&format!("Invalid params: unknown key '{key}'")))?;

    let result = session.handle_key(trace, key);
    moved(trace, session, result)
}
