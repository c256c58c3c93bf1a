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

//! RPC server implementation
//!
//! This module implements the JSON-RPC server that handles debugging requests. The
//! trace is immutable and shared as-is; the session sits behind a lock so that
//! navigation requests from concurrent clients are applied one at a time.

use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
};

use axum::{
    extract::State,
    response::Json as JsonResponse,
    routing::{get, post},
    Router,
};
use edtrace_common::Trace;
use eyre::Result;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use super::{
    methods::MethodHandler,
    types::{error_codes, RpcRequest, RpcResponse},
    utils::{get_default_rpc_port, to_rpc_error},
};
use crate::session::Session;

/// Handle to the running RPC server
#[derive(Debug)]
pub struct RpcServerHandle {
    /// Address the server is listening on
    pub addr: SocketAddr,
    /// Shutdown signal
    shutdown_tx: oneshot::Sender<()>,
}

impl RpcServerHandle {
    /// Get the server address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Gracefully shutdown the RPC server
    pub fn shutdown(self) -> Result<()> {
        if self.shutdown_tx.send(()).is_err() {
            warn!("RPC server already shut down");
        }
        Ok(())
    }
}

/// Thread-safe RPC state for Axum
#[derive(Clone)]
struct RpcState {
    method_handler: Arc<MethodHandler>,
}

/// Debug RPC server over one trace and one session
#[derive(Debug)]
pub struct DebugRpcServer {
    /// The trace being debugged
    trace: Arc<Trace>,
    /// Cursor and display state
    session: Arc<RwLock<Session>>,
    /// Method handler for RPC dispatch
    method_handler: Arc<MethodHandler>,
}

impl DebugRpcServer {
    /// Create a new debug RPC server
    pub fn new(trace: Arc<Trace>, session: Session) -> Self {
        let session = Arc::new(RwLock::new(session));
        let method_handler = Arc::new(MethodHandler::new(trace.clone(), session.clone()));
        Self { trace, session, method_handler }
    }

    /// Start the RPC server on the default port
    pub async fn start(self) -> Result<RpcServerHandle> {
        let port = get_default_rpc_port()?;
        self.start_on_port(port).await
    }

    /// Start the RPC server on a specific port; port 0 picks any free port
    pub async fn start_on_port(self, port: u16) -> Result<RpcServerHandle> {
        let app = Router::new()
            .route("/", post(handle_rpc_request))
            .route("/health", get(health_check))
            .layer(CorsLayer::permissive())
            .with_state(RpcState { method_handler: self.method_handler.clone() });

        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        // Spawn the Axum server
        tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await;
            match result {
                Ok(()) => info!("Debug RPC server stopped"),
                Err(e) => error!("Debug RPC server failed: {e}"),
            }
        });

        info!("Debug RPC server started on {actual_addr} ({} steps)", self.trace.len());

        Ok(RpcServerHandle { addr: actual_addr, shutdown_tx })
    }

    /// Get the number of steps in the trace
    pub fn step_count(&self) -> usize {
        self.trace.len()
    }

    /// Get the cursor's current step, `None` when detached
    pub fn current_step(&self) -> Option<usize> {
        self.session.read().ok().and_then(|session| session.step_index())
    }
}

/// Handle a JSON-RPC request body
async fn handle_rpc_request(State(state): State<RpcState>, body: String) -> JsonResponse<RpcResponse> {
    let request: RpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected unparsable RPC request: {e}");
            return JsonResponse(RpcResponse::failure(
                None,
                to_rpc_error(error_codes::PARSE_ERROR, &format!("Parse error: {e}"), None),
            ));
        }
    };

    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return JsonResponse(RpcResponse::failure(
            request.id,
            to_rpc_error(
                error_codes::INVALID_REQUEST,
                "Invalid Request - JSON-RPC version must be 2.0",
                None,
            ),
        ));
    }

    let RpcRequest { method, params, id, .. } = request;
    let response = match state.method_handler.handle_method(&method, params) {
        Ok(result) => RpcResponse::success(id, result),
        Err(error) => RpcResponse::failure(id, error),
    };

    JsonResponse(response)
}

/// Health check endpoint
async fn health_check() -> JsonResponse<serde_json::Value> {
    JsonResponse(serde_json::json!({
        "status": "healthy",
        "service": "edtrace-debug-rpc-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
