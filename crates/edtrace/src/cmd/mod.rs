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

//! Command modules for the EDTrace CLI

pub mod serve;
pub mod show;

use std::path::Path;

use edtrace_common::Trace;
use eyre::{Context, Result};

pub use serve::serve_trace;
pub use show::{show_environment, show_source};

/// Load a trace file, reporting the path on failure
pub fn load_trace(path: &Path) -> Result<Trace> {
    Trace::load(path).wrap_err_with(|| format!("Failed to load trace {}", path.display()))
}
