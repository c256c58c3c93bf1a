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

//! RPC server utilities
//!
//! This module provides utility functions for RPC server operations,
//! including port discovery and error construction helpers.

use std::net::TcpListener;

use edtrace_common::TraceError;
use eyre::{eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::types::{error_codes, RpcError};

/// Port tried first when none is configured
pub const DEFAULT_RPC_PORT: u16 = 3000;

/// Find an available port starting from a base port
pub fn find_available_port(start_port: u16) -> Result<u16> {
    for port in start_port..65535 {
        if is_port_available(port) {
            info!("Found available port: {port}");
            return Ok(port);
        }
    }
    Err(eyre!("No available port found in range {start_port}-65534"))
}

/// Check if a port is available on localhost
pub fn is_port_available(port: u16) -> bool {
    match TcpListener::bind(("127.0.0.1", port)) {
        Ok(_) => {
            debug!("Port {port} is available");
            true
        }
        Err(_) => {
            debug!("Port {port} is not available");
            false
        }
    }
}

/// Get default RPC server port (tries 3000 first, then searches)
pub fn get_default_rpc_port() -> Result<u16> {
    if is_port_available(DEFAULT_RPC_PORT) {
        Ok(DEFAULT_RPC_PORT)
    } else {
        find_available_port(DEFAULT_RPC_PORT + 1)
    }
}

/// Convert error to RPC error format
pub fn to_rpc_error(code: i32, message: &str, data: Option<serde_json::Value>) -> RpcError {
    RpcError { code, message: message.to_string(), data }
}

/// Helper to create internal error responses
pub fn internal_error(message: &str) -> RpcError {
    to_rpc_error(error_codes::INTERNAL_ERROR, message, None)
}

/// Helper to create method not found error
pub fn method_not_found(method: &str) -> RpcError {
    to_rpc_error(error_codes::METHOD_NOT_FOUND, &format!("Method '{method}' not found"), None)
}

/// Helper to create invalid params error
pub fn invalid_params(message: &str) -> RpcError {
    to_rpc_error(error_codes::INVALID_PARAMS, message, None)
}

/// Map a trace query failure to an RPC error
pub fn trace_error(error: TraceError) -> RpcError {
    match error {
        TraceError::StepOutOfBounds { index, total } => to_rpc_error(
            error_codes::STEP_OUT_OF_BOUNDS,
            &format!("Step index {index} out of bounds (total: {total})"),
            None,
        ),
        other => internal_error(&other.to_string()),
    }
}

/// Decode method parameters, treating absent params as the default value
pub fn parse_optional_params<T: DeserializeOwned + Default>(
    params: Option<serde_json::Value>,
) -> Result<T, RpcError> {
    match params {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| invalid_params(&format!("Invalid params: {e}"))),
    }
}

/// Decode required method parameters
pub fn parse_params<T: DeserializeOwned>(params: Option<serde_json::Value>) -> Result<T, RpcError> {
    let value = params.ok_or_else(|| invalid_params("Invalid params: missing params"))?;
    serde_json::from_value(value).map_err(|e| invalid_params(&format!("Invalid params: {e}")))
}

/// Serialize a method result
pub fn to_result<T: Serialize>(value: &T) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(value)
        .map_err(|e| internal_error(&format!("Failed to serialize result: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::types::{GotoStepParams, StepParams};
    use crate::Direction;
    use serde_json::json;

    #[test]
    fn test_port_availability() {
        let port = find_available_port(50000).expect("Should find an available port");
        assert!(port >= 50000);
        assert!(is_port_available(port));
    }

    #[test]
    fn test_error_helpers() {
        let err = internal_error("test message");
        assert_eq!(err.code, -32603);
        assert_eq!(err.message, "test message");

        let err = method_not_found("test_method");
        assert_eq!(err.code, -32601);
        assert_eq!(err.message, "Method 'test_method' not found");

        let err = trace_error(TraceError::StepOutOfBounds { index: 7, total: 5 });
        assert_eq!(err.code, error_codes::STEP_OUT_OF_BOUNDS);
        assert_eq!(err.message, "Step index 7 out of bounds (total: 5)");
    }

    #[test]
    fn test_param_parsing() {
        let params: StepParams = parse_optional_params(None).unwrap();
        assert_eq!(params.direction, Direction::Forward);
        assert!(!params.require_new_line);

        let params: StepParams =
            parse_optional_params(Some(json!({"direction": "backward", "requireNewLine": true})))
                .unwrap();
        assert_eq!(params.direction, Direction::Backward);
        assert!(params.require_new_line);

        let err = parse_params::<GotoStepParams>(None).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        let err = parse_params::<GotoStepParams>(Some(json!({"index": -1}))).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
    }
}
