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

//! EDTrace Engine - trace navigation for post-hoc execution debugging
//!
//! The engine replays a recorded [`Trace`](edtrace_common::Trace) one step at a time.
//! It answers four kinds of questions, all as pure functions of an immutable trace and
//! a step index:
//!
//! - **Where next?** [`navigation`] implements step into / over / up and jump-to-line
//!   on top of the call-stack relations in [`stack`].
//! - **What is live?** [`environment`] folds environment deltas backward through the
//!   enclosing activation into a snapshot of bindings.
//! - **What has been shown?** [`reveal`] computes the lines a progressive display has
//!   revealed so far.
//! - **Where am I?** [`location`] maps between step indices and source locations.
//!
//! On top of that core, [`session`] models the cursor a front end owns, [`source`]
//! projects a cursor position into a displayable source view, and [`rpc`] serves all
//! of it over JSON-RPC.

pub mod core;
pub use self::core::*;

pub mod environment;
pub use environment::*;

pub mod location;
pub use location::*;

pub mod navigation;
pub use navigation::*;

pub mod reveal;
pub use reveal::*;

pub mod rpc;

pub mod session;
pub use session::*;

pub mod source;
pub use source::*;

pub mod stack;
pub use stack::*;
