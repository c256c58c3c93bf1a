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

//! JSON-RPC protocol types and data structures.
//!
//! This module defines the envelope types of the JSON-RPC 2.0 protocol spoken by
//! the debug server, the typed parameters each method accepts, and the result
//! shapes it returns.
//!
//! # Protocol Types
//!
//! - [`RpcRequest`] - Incoming JSON-RPC request with method and parameters
//! - [`RpcResponse`] - Outgoing JSON-RPC response with result or error
//! - [`RpcError`] - Structured error information following JSON-RPC error format
//! - [`RpcId`] - Request/response identifier (string or number)
//!
//! # Error Handling
//!
//! The module includes standard JSON-RPC error codes in the [`error_codes`] module
//! for consistent error reporting across all RPC methods.

use edtrace_common::{Location, Trace};
use serde::{Deserialize, Serialize};

use crate::{
    location::Cursor,
    navigation::Direction,
    session::{DisplayFlags, Flag, Progress, Session},
};

/// JSON-RPC 2.0 request structure.
///
/// Represents an incoming RPC request from a debugging client.
/// Contains the method to invoke and optional parameters.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Method name to invoke (e.g., "debug.stepOver")
    pub method: String,
    /// Optional method parameters as JSON value
    #[serde(default)]
    pub params: Option<serde_json::Value>,
    /// Request identifier for matching with response
    #[serde(default)]
    pub id: Option<RpcId>,
}

/// JSON-RPC 2.0 response structure.
///
/// Represents an outgoing RPC response to a debugging client.
/// Contains either a successful result or an error, never both.
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Successful method result (omitted if error occurred)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error information (omitted if method succeeded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    /// Request identifier matching the original request
    pub id: Option<RpcId>,
}

impl RpcResponse {
    /// Successful response
    pub fn success(id: Option<RpcId>, result: serde_json::Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), result: Some(result), error: None, id }
    }

    /// Error response
    pub fn failure(id: Option<RpcId>, error: RpcError) -> Self {
        Self { jsonrpc: "2.0".to_string(), result: None, error: Some(error), id }
    }
}

/// JSON-RPC 2.0 error structure.
///
/// Provides structured error information when RPC methods fail.
/// Follows the JSON-RPC error object specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Numeric error code indicating the error type
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// JSON-RPC request/response identifier.
///
/// Can be either a string or number as per JSON-RPC 2.0 specification.
/// Used to match responses with their corresponding requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    /// Numeric identifier
    Number(u64),
    /// String identifier
    String(String),
}

/// JSON-RPC error codes for consistent error reporting.
///
/// Includes both standard JSON-RPC 2.0 error codes and trace-specific error codes.
pub mod error_codes {
    // Standard JSON-RPC 2.0 error codes

    /// Parse error - Invalid JSON was received by the server
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid request - The JSON sent is not a valid request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist or is not available
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s)
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;

    // Trace-specific error codes (starting from -33000)

    /// Step index is out of bounds
    pub const STEP_OUT_OF_BOUNDS: i32 = -33001;
}

/// Parameters of `debug.stepInto`, `debug.stepOver` and `debug.stepUp`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepParams {
    /// Direction of travel, forward by default
    pub direction: Direction,
    /// Only honored by `debug.stepOver`
    pub require_new_line: bool,
}

/// Parameters of `debug.gotoStep`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GotoStepParams {
    /// Target step index
    pub index: usize,
}

/// Parameters of `debug.gotoLocation`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoLocationParams {
    /// Source file identifier
    pub path: String,
    /// 1-based line number
    pub line_number: u32,
}

impl From<GotoLocationParams> for Location {
    fn from(params: GotoLocationParams) -> Self {
        Location::new(params.path, params.line_number)
    }
}

/// Parameters of `debug.toggle`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ToggleParams {
    /// Display mode to flip
    pub flag: Flag,
}

/// Parameters of `debug.handleKey`
#[derive(Debug, Clone, Deserialize)]
pub struct KeyParams {
    /// A single key character
    pub key: String,
}

/// Parameters of inspection methods; the cursor's step is used when `index` is absent
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct IndexParams {
    /// Step index to inspect
    pub index: Option<usize>,
}

/// Result of `trace.getInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceInfo {
    /// Number of steps
    pub steps: usize,
    /// Source file paths, sorted
    pub files: Vec<String>,
}

impl TraceInfo {
    /// Summarize a trace
    pub fn new(trace: &Trace) -> Self {
        Self {
            steps: trace.len(),
            files: trace.file_paths().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Cursor state reported to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorInfo {
    /// Bound step, `null` when detached
    pub step: Option<usize>,
    /// Number of steps in the trace
    pub total: usize,
    /// Location the cursor points at
    pub location: Location,
    /// Active display modes
    pub flags: DisplayFlags,
    /// Position within the trace, absent when detached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

impl CursorInfo {
    /// Snapshot the cursor of a session
    pub fn new(trace: &Trace, session: &Session) -> Self {
        let Cursor { step, location } = session.cursor().clone();
        Self { step, total: trace.len(), location, flags: session.flags, progress: session.progress(trace) }
    }
}

/// Result of every cursor-moving method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveResult {
    /// Whether the cursor changed position
    pub moved: bool,
    /// Cursor after the move
    pub cursor: CursorInfo,
}
