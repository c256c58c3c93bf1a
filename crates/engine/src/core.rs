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

//! Engine entry point for serving a recorded trace.
//!
//! [`Engine`] ties the pieces together for hosts that want a running debug server:
//! it resolves the starting cursor, applies the configured display modes and starts
//! the JSON-RPC server over a shared trace.

use std::sync::Arc;

use edtrace_common::Trace;
use eyre::Result;
use tracing::info;

use crate::{
    location::CursorTarget,
    rpc::{DebugRpcServer, RpcServerHandle},
    session::{DisplayFlags, Session},
};

/// Configuration for the trace debugging engine
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Port for the JSON-RPC server; the first free port from 3000 when unset
    pub rpc_port: Option<u16>,
    /// Display modes the session starts with
    pub display: DisplayFlags,
    /// Where the cursor starts
    pub start: CursorTarget,
}

impl EngineConfig {
    /// Set the JSON-RPC server port
    pub fn with_rpc_port(mut self, port: u16) -> Self {
        self.rpc_port = Some(port);
        self
    }

    /// Set the initial display modes
    pub fn with_display(mut self, display: DisplayFlags) -> Self {
        self.display = display;
        self
    }

    /// Set the initial cursor target
    pub fn with_start(mut self, start: CursorTarget) -> Self {
        self.start = start;
        self
    }
}

/// The main Engine struct that serves a trace for debugging
#[derive(Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create a new Engine instance from configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The session a new client starts with
    pub fn session(&self, trace: &Trace) -> Session {
        Session::new(trace, &self.config.start, self.config.display)
    }

    /// Start a JSON-RPC server over `trace`
    pub async fn serve(&self, trace: Arc<Trace>) -> Result<RpcServerHandle> {
        let session = self.session(&trace);
        info!(
            steps = trace.len(),
            cursor = %session.location(),
            "Starting debug server"
        );

        let server = DebugRpcServer::new(trace, session);
        match self.config.rpc_port {
            Some(port) => server.start_on_port(port).await,
            None => server.start().await,
        }
    }
}
