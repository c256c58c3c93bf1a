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

//! RPC method handlers
//!
//! This module contains all the RPC method implementations for the debug server.
//! Navigation methods move the shared session cursor; inspection methods are read
//! only and may address any step.

pub mod inspect;
pub mod navigation;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use edtrace_common::Trace;
use tracing::debug;

use super::{
    types::RpcError,
    utils::{internal_error, method_not_found},
};
use crate::session::Session;

/// Method handler for dispatching RPC calls
#[derive(Debug)]
pub struct MethodHandler {
    /// The trace being debugged
    trace: Arc<Trace>,
    /// Cursor and display state shared by all clients
    session: Arc<RwLock<Session>>,
}

impl MethodHandler {
    /// Create a handler over a trace and its shared session
    pub fn new(trace: Arc<Trace>, session: Arc<RwLock<Session>>) -> Self {
        Self { trace, session }
    }

    /// Handle an RPC method call
    pub fn handle_method(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, RpcError> {
        debug!("Handling RPC method: {method}");
        let trace = &self.trace;

        match method {
            // Inspection methods - implemented in inspect.rs
            "trace.getInfo" => inspect::get_info(trace),
            "debug.getEnvironment" => inspect::get_environment(trace, &*self.read()?, params),
            "debug.getRevealed" => inspect::get_revealed(trace, &*self.read()?, params),
            "debug.resolveLocation" => inspect::resolve_location(trace, &*self.read()?, params),
            "debug.getSourceView" => inspect::get_source_view(trace, &*self.read()?),

            // Navigation methods - implemented in navigation.rs
            "debug.getCursor" => navigation::get_cursor(trace, &*self.read()?),
            "debug.stepInto" => navigation::step_into(trace, &mut *self.write()?, params),
            "debug.stepOver" => navigation::step_over(trace, &mut *self.write()?, params),
            "debug.stepUp" => navigation::step_up(trace, &mut *self.write()?, params),
            "debug.gotoStep" => navigation::goto_step(trace, &mut *self.write()?, params),
            "debug.gotoLocation" => navigation::goto_location(trace, &mut *self.write()?, params),
            "debug.toggle" => navigation::toggle(trace, &mut *self.write()?, params),
            "debug.handleKey" => navigation::handle_key(trace, &mut *self.write()?, params),

            _ => Err(method_not_found(method)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Session>, RpcError> {
        self.session.read().map_err(|_| internal_error("Session lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Session>, RpcError> {
        self.session.write().map_err(|_| internal_error("Session lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::types::error_codes;
    use edtrace_common::test_utils::nested_call_trace;
    use serde_json::json;

    fn handler() -> MethodHandler {
        let trace = Arc::new(nested_call_trace());
        let session = Arc::new(RwLock::new(Session::start(&trace)));
        MethodHandler::new(trace, session)
    }

    #[test]
    fn test_unknown_method() {
        let err = handler().handle_method("debug.stepSideways", None).unwrap_err();
        assert_eq!(err.code, error_codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_moves_share_one_session() {
        let handler = handler();
        handler.handle_method("debug.stepInto", None).unwrap();
        let result = handler.handle_method("debug.stepOver", Some(json!({}))).unwrap();
        assert_eq!(result["moved"], true);
        assert_eq!(result["cursor"]["step"], 4);

        let cursor = handler.handle_method("debug.getCursor", None).unwrap();
        assert_eq!(cursor["location"], json!({"path": "A", "line_number": 3}));
    }
}
