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

//! Projection of a session onto the source file it points at.
//!
//! [`SourceView`] is what a front end draws: the lines of the cursor's file with
//! hidden lines removed, the current line marked, unrevealed lines cloaked when
//! animating, and the renderings recorded for each line.

use std::{collections::HashMap, fmt};

use edtrace_common::{Rendering, Trace, TraceError};
use serde::{Deserialize, Serialize};

use crate::{
    environment::{reconstruct_env, Environment},
    reveal::compute_revealed,
    session::{DisplayFlags, Progress, Session},
};

/// Remove inline `@directive` text from the comment of a source line.
///
/// Everything from the first `@` inside the comment onwards is dropped, and a
/// comment left empty is dropped altogether:
///
/// ```text
/// x = 3 # @inspect x @clear y      ->  x = 3
/// x = 3 # Assign @inspect x y      ->  x = 3 # Assign
/// ```
pub fn strip_directives(line: &str) -> String {
    let Some(hash) = line.find('#') else {
        return line.to_string();
    };
    let (code, comment) = line.split_at(hash);
    let Some(at) = comment.find('@') else {
        return line.to_string();
    };

    let comment = comment[..at].trim_end();
    if comment == "#" {
        code.trim_end().to_string()
    } else {
        format!("{code}{comment}")
    }
}

/// One displayed source line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineView {
    /// 1-based line number
    pub number: u32,
    /// Line text, with directives stripped unless in raw mode
    pub text: String,
    /// Line the cursor is on
    pub is_current: bool,
    /// Not yet revealed by animation
    pub cloaked: bool,
    /// Renderings drawn in place of the text
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub renderings: Vec<Rendering>,
    /// Notes drawn next to the line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Displayable state of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceView {
    /// File being shown
    pub path: String,
    /// Bound step, `None` when detached
    pub step: Option<usize>,
    /// Display modes the view was built with
    pub flags: DisplayFlags,
    /// Visible lines of the file
    pub lines: Vec<LineView>,
    /// Live bindings, present when enabled and bound to a step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    /// Position within the trace, absent when detached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

impl SourceView {
    /// Build the view of `session` over `trace`.
    ///
    /// A detached cursor may point at a file the trace has no text for; the view then
    /// has no lines.
    pub fn build(trace: &Trace, session: &Session) -> Result<Self, TraceError> {
        let cursor = session.cursor();
        let flags = session.flags;
        let path = cursor.location.path.as_str();

        // Renderings of the last step executing each line
        let mut renderings: HashMap<u32, &[Rendering]> = HashMap::new();
        for step in trace.steps() {
            let frame = step.active_frame();
            if frame.path == path {
                renderings.insert(frame.line_number, &step.renderings);
            }
        }

        let revealed = match cursor.step {
            Some(index) if flags.animate => Some(compute_revealed(trace, index)?),
            _ => None,
        };

        let text = trace.file(path).unwrap_or_default();
        let lines = text
            .strip_suffix('\n')
            .unwrap_or(text)
            .split('\n')
            .zip(1u32..)
            .filter(|(_, number)| !text.is_empty() && !trace.is_hidden(path, *number))
            .map(|(line, number)| {
                let recorded = renderings.get(&number).copied().unwrap_or_default();
                let (notes, inline): (Vec<&Rendering>, Vec<&Rendering>) =
                    recorded.iter().partition(|r| r.is_note());

                LineView {
                    number,
                    text: if flags.raw { line.to_string() } else { strip_directives(line) },
                    is_current: number == cursor.location.line_number,
                    cloaked: revealed.as_ref().is_some_and(|r| !r.contains_line(path, number)),
                    renderings: if flags.raw {
                        Vec::new()
                    } else {
                        inline.into_iter().cloned().collect()
                    },
                    notes: if flags.show_notes {
                        notes.into_iter().map(Rendering::data_text).collect()
                    } else {
                        Vec::new()
                    },
                }
            })
            .collect();

        let environment = match cursor.step {
            Some(index) if flags.show_env => Some(reconstruct_env(trace, index)?),
            _ => None,
        };

        Ok(Self {
            path: path.to_string(),
            step: cursor.step,
            flags,
            lines,
            environment,
            progress: session.progress(trace),
        })
    }

    /// The current line, if it is visible
    pub fn current_line(&self) -> Option<&LineView> {
        self.lines.iter().find(|line| line.is_current)
    }
}

impl fmt::Display for SourceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.progress {
            Some(progress) => writeln!(
                f,
                "{} [step {} / {}, {:.0}%]",
                self.path, progress.index, progress.total, progress.percent
            )?,
            None => writeln!(f, "{} [detached]", self.path)?,
        }

        let width = self.lines.last().map_or(1, |line| line.number.to_string().len());
        for line in &self.lines {
            let marker = if line.is_current { '>' } else { ' ' };
            if line.cloaked {
                writeln!(f, "{marker} {:>width$} |", line.number)?;
                continue;
            }

            let body = if line.renderings.is_empty() {
                line.text.clone()
            } else {
                let indent: String = line.text.chars().take_while(|c| c.is_whitespace()).collect();
                let summaries: Vec<String> = line.renderings.iter().map(Rendering::summary).collect();
                format!("{indent}{}", summaries.join("  "))
            };
            writeln!(f, "{marker} {:>width$} | {body}", line.number)?;

            for note in &line.notes {
                writeln!(f, "  {:>width$} | # {note}", "")?;
            }
        }

        if let Some(environment) = &self.environment {
            writeln!(f)?;
            for (name, value) in environment {
                writeln!(f, "{name} = {value}  ({})", value.title())?;
            }
        }
        Ok(())
    }
}
