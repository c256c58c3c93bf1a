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

//! JSON-RPC server for trace debugging control and inspection.
//!
//! This module exposes a debugging session over JSON-RPC 2.0 so that front ends can
//! drive the cursor and query the trace without linking the engine.
//!
//! # Architecture
//!
//! - **Server** ([`server`]) - HTTP server handling client connections
//! - **Methods** ([`methods`]) - RPC method implementations organized by functionality
//! - **Types** ([`types`]) - Request/response data structures and protocol types
//! - **Utils** ([`utils`]) - Common utilities for RPC operations
//!
//! # API Categories
//!
//! ## Navigation
//! - Step into, over and up in either direction
//! - Jump to a step or to a source location
//! - Toggle display modes, or send raw key commands
//!
//! ## Inspection
//! - Reconstruct the environment at any step
//! - List the lines revealed for animated display
//! - Resolve a step to its source location
//! - Render the source view of the session
//!
//! # Usage
//!
//! ```rust,ignore
//! use edtrace_engine::{rpc::DebugRpcServer, Session};
//!
//! let server = DebugRpcServer::new(trace.clone(), Session::start(&trace));
//! let handle = server.start().await?;
//! ```

pub mod methods;
pub mod server;
pub mod types;
pub mod utils;

pub use server::*;
pub use types::*;
