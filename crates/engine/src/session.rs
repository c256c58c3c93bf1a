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

//! The debugging session a front end owns.
//!
//! A [`Session`] holds the only mutable state of a debugging session: the cursor and
//! the display flags. It is an ordinary value passed to whoever needs it, so several
//! sessions can browse one shared trace independently.

use std::fmt;

use edtrace_common::{Location, Trace, TraceError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    location::{first_step_at, resolve_cursor, Cursor, CursorTarget},
    navigation::{Direction, GotoTarget, Move, Navigator},
};

/// A display mode that can be toggled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// Show source text as recorded, including inline directives
    Raw,
    /// Cloak lines that execution has not reached yet
    Animate,
    /// Show the reconstructed environment
    ShowEnv,
    /// Show note renderings
    ShowNotes,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw => "raw",
            Self::Animate => "animate",
            Self::ShowEnv => "show_env",
            Self::ShowNotes => "show_notes",
        };
        f.write_str(name)
    }
}

/// Display modes of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFlags {
    /// Show source text with directives intact
    pub raw: bool,
    /// Cloak lines that execution has not revealed yet
    pub animate: bool,
    /// Show the environment
    pub show_env: bool,
    /// Show notes attached to lines
    pub show_notes: bool,
}

impl DisplayFlags {
    /// Current value of `flag`
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Raw => self.raw,
            Flag::Animate => self.animate,
            Flag::ShowEnv => self.show_env,
            Flag::ShowNotes => self.show_notes,
        }
    }

    /// Flip `flag` and return its new value
    pub fn toggle(&mut self, flag: Flag) -> bool {
        let slot = match flag {
            Flag::Raw => &mut self.raw,
            Flag::Animate => &mut self.animate,
            Flag::ShowEnv => &mut self.show_env,
            Flag::ShowNotes => &mut self.show_notes,
        };
        *slot = !*slot;
        *slot
    }
}

/// A keyboard command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "camelCase")]
pub enum Key {
    /// Apply a stepping move
    Move(Move),
    /// Toggle a display flag
    Toggle(Flag),
}

impl Key {
    /// Decode a key press.
    ///
    /// | key | command |
    /// |---|---|
    /// | `l` / `h` | step forward / backward |
    /// | `j` / `k` | step over forward / backward |
    /// | `L` | step over forward to a different line |
    /// | `u` | step up |
    /// | `R` `A` `E` `N` | toggle raw / animate / env / notes |
    pub fn from_char(c: char) -> Option<Self> {
        let key = match c {
            'l' => Self::Move(Move::Into { direction: Direction::Forward }),
            'h' => Self::Move(Move::Into { direction: Direction::Backward }),
            'j' => Self::Move(Move::Over { direction: Direction::Forward, require_new_line: false }),
            'k' => Self::Move(Move::Over { direction: Direction::Backward, require_new_line: false }),
            'L' => Self::Move(Move::Over { direction: Direction::Forward, require_new_line: true }),
            'u' => Self::Move(Move::Up { direction: Direction::Forward }),
            'R' => Self::Toggle(Flag::Raw),
            'A' => Self::Toggle(Flag::Animate),
            'E' => Self::Toggle(Flag::ShowEnv),
            'N' => Self::Toggle(Flag::ShowNotes),
            _ => return None,
        };
        Some(key)
    }
}

/// How far through the trace a cursor is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Current step
    pub index: usize,
    /// Number of steps
    pub total: usize,
    /// Position as a percentage of the last step
    pub percent: f64,
}

impl Progress {
    /// Progress of step `index` out of `total`
    pub fn new(index: usize, total: usize) -> Self {
        let percent = if total <= 1 { 100.0 } else { index as f64 / (total - 1) as f64 * 100.0 };
        Self { index, total, percent }
    }
}

/// Cursor and display state of one front end
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    cursor: Cursor,
    /// Display modes
    pub flags: DisplayFlags,
}

impl Session {
    /// Start a session at the position `target` resolves to
    pub fn new(trace: &Trace, target: &CursorTarget, flags: DisplayFlags) -> Self {
        Self { cursor: resolve_cursor(trace, target), flags }
    }

    /// Start a session at step 0
    pub fn start(trace: &Trace) -> Self {
        Self::new(trace, &CursorTarget::default(), DisplayFlags::default())
    }

    /// Current cursor
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Bound step, `None` when detached
    pub fn step_index(&self) -> Option<usize> {
        self.cursor.step
    }

    /// Location the cursor points at
    pub fn location(&self) -> &Location {
        &self.cursor.location
    }

    /// Apply a stepping move. Returns whether the cursor moved.
    ///
    /// Moves are relative to a step, so they do nothing while detached.
    pub fn apply(&mut self, trace: &Trace, mv: Move) -> bool {
        let Some(current) = self.cursor.step else {
            debug!(?mv, "cursor is detached, ignoring move");
            return false;
        };

        match Navigator::new(trace).apply(current, mv) {
            Some(index) => self.bind(trace, index),
            None => false,
        }
    }

    /// Step to the adjacent step in `direction`
    pub fn step_into(&mut self, trace: &Trace, direction: Direction) -> bool {
        self.apply(trace, Move::Into { direction })
    }

    /// Step over nested calls in `direction`
    pub fn step_over(&mut self, trace: &Trace, direction: Direction, require_new_line: bool) -> bool {
        self.apply(trace, Move::Over { direction, require_new_line })
    }

    /// Step out to the enclosing context in `direction`
    pub fn step_up(&mut self, trace: &Trace, direction: Direction) -> bool {
        self.apply(trace, Move::Up { direction })
    }

    /// Jump to step `index`
    pub fn goto_step(&mut self, trace: &Trace, index: usize) -> Result<bool, TraceError> {
        trace.get_step(index)?;
        Ok(self.bind(trace, index))
    }

    /// Jump to the nearest step executing `target`, detaching if there is none.
    ///
    /// From a detached cursor the search is for the first step executing `target`.
    pub fn goto_location(&mut self, trace: &Trace, target: Location) -> bool {
        let resolved = match self.cursor.step {
            Some(current) => Navigator::new(trace).goto_location(
                &target,
                current,
                self.cursor.location.line_number,
            ),
            None => first_step_at(trace, &target)
                .map_or_else(|| GotoTarget::Detached(target.clone()), GotoTarget::Step),
        };

        match resolved {
            GotoTarget::Step(index) => self.bind(trace, index),
            GotoTarget::Detached(location) => {
                let cursor = Cursor::detached(location);
                let moved = self.cursor != cursor;
                self.cursor = cursor;
                moved
            }
        }
    }

    /// Flip a display flag and return its new value
    pub fn toggle(&mut self, flag: Flag) -> bool {
        let value = self.flags.toggle(flag);
        debug!(%flag, value, "toggled display flag");
        value
    }

    /// Apply one key command. Returns whether the cursor moved.
    pub fn handle_key(&mut self, trace: &Trace, key: Key) -> bool {
        match key {
            Key::Move(mv) => self.apply(trace, mv),
            Key::Toggle(flag) => {
                self.toggle(flag);
                false
            }
        }
    }

    /// Progress through the trace, `None` when detached
    pub fn progress(&self, trace: &Trace) -> Option<Progress> {
        self.cursor.step.map(|index| Progress::new(index, trace.len()))
    }

    fn bind(&mut self, trace: &Trace, index: usize) -> bool {
        let moved = self.cursor.step != Some(index);
        self.cursor = Cursor { step: Some(index), location: trace.steps()[index].active_frame().location() };
        moved
    }
}
