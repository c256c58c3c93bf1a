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

//! One-shot rendering of a trace position

use std::path::Path;

use edtrace_engine::{reconstruct_env, CursorTarget, DisplayFlags, Key, Session, SourceView};
use eyre::{eyre, Result};
use tracing::debug;

use super::load_trace;

/// Render the source view after applying `keys` from the start position
pub fn show_source(
    trace_path: &Path,
    target: &CursorTarget,
    keys: &str,
    flags: DisplayFlags,
) -> Result<SourceView> {
    let trace = load_trace(trace_path)?;
    let mut session = Session::new(&trace, target, flags);

    for c in keys.chars().filter(|c| !c.is_whitespace()) {
        let key = Key::from_char(c).ok_or_else(|| eyre!("Unknown key command '{c}'"))?;
        let moved = session.handle_key(&trace, key);
        debug!(key = %c, moved, cursor = %session.location(), "applied key");
    }

    Ok(SourceView::build(&trace, &session)?)
}

/// The environment at `step` as pretty-printed JSON
pub fn show_environment(trace_path: &Path, step: usize) -> Result<String> {
    let trace = load_trace(trace_path)?;
    let environment = reconstruct_env(&trace, step)?;
    Ok(serde_json::to_string_pretty(&environment)?)
}
