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

//! Long-running debug server

use std::{path::Path, sync::Arc};

use edtrace_engine::{CursorTarget, DisplayFlags, Engine, EngineConfig};
use eyre::Result;
use tracing::{error, info};

use super::load_trace;

/// Serve `trace_path` over JSON-RPC until Ctrl+C
pub async fn serve_trace(
    trace_path: &Path,
    port: Option<u16>,
    start: CursorTarget,
    flags: DisplayFlags,
) -> Result<()> {
    let trace = Arc::new(load_trace(trace_path)?);

    let mut config = EngineConfig::default().with_display(flags).with_start(start);
    if let Some(port) = port {
        config = config.with_rpc_port(port);
    }

    let rpc_server_handle = Engine::new(config).serve(trace).await?;
    info!("RPC server is running on {}. Press Ctrl+C to exit.", rpc_server_handle.addr);
    println!("Serving {} on http://{}", trace_path.display(), rpc_server_handle.addr);

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down...");

    // Gracefully shutdown the RPC server
    if let Err(e) = rpc_server_handle.shutdown() {
        error!("Failed to shutdown RPC server: {e}");
    } else {
        info!("RPC server shut down successfully");
    }

    Ok(())
}
