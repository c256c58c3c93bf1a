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

//! EDTrace Common - Shared functionality for EDTrace components
//!
//! This crate holds the in-memory representation of a recorded execution trace
//! together with the pieces every other EDTrace crate needs: loading and validating
//! trace files, the error taxonomy, logging setup and test fixtures.

/// Error types for trace loading and step addressing
pub mod error;
/// Logging setup and utilities for consistent logging across EDTrace components
pub mod logging;
/// Test fixtures for building traces in unit and integration tests
pub mod test_utils;
/// Trace data model: steps, stack frames, values and renderings
pub mod types;

pub use error::*;
pub use logging::*;
pub use types::*;
