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

//! Error taxonomy for the trace boundary.
//!
//! Only two things can go wrong once a trace is in hand: it was malformed when it was
//! loaded, or a caller addressed a step that does not exist. Everything else the engine
//! reports (running off either end of the trace, an unresolvable location, an empty
//! environment) is a regular result, not an error.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a trace or addressing one of its steps.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be read
    #[error("failed to read trace file {}: {source}", path.display())]
    Io {
        /// Path of the trace file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The trace is not valid JSON or does not have the expected shape
    #[error("failed to decode trace: {0}")]
    Json(#[from] serde_json::Error),

    /// The trace contains no steps at all
    #[error("trace contains no steps")]
    Empty,

    /// The trace decoded but violates a structural precondition
    #[error("malformed trace at step {step}: {reason}")]
    Malformed {
        /// Index of the offending step
        step: usize,
        /// What is wrong with it
        reason: String,
    },

    /// A step index outside the trace was requested
    #[error("step index {index} out of bounds (total: {total})")]
    StepOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of steps in the trace
        total: usize,
    },
}

impl TraceError {
    /// Whether this error was raised while loading, as opposed to while navigating
    pub fn is_load_error(&self) -> bool {
        !matches!(self, Self::StepOutOfBounds { .. })
    }
}
