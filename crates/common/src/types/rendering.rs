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

//! Display directives attached to recorded lines.
//!
//! Renderings are opaque to navigation. They are carried through untouched and only
//! inspected by presentation code, which needs to tell notes apart from inline
//! content and to produce anchor text for links.

use serde::{Deserialize, Serialize};

use crate::Location;

/// Rendering type shown next to the line instead of inline
pub const NOTE_RENDERING: &str = "note";

/// A display directive (markdown, image, link, plot, note, plain text, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rendering {
    /// Rendering type
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload; its meaning depends on `kind`
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
    /// Presentation style hints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
    /// Link to a location inside the trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_link: Option<Location>,
    /// Link to an external resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<ExternalLink>,
}

/// External reference, optionally with citation metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExternalLink {
    /// Target URL
    pub url: String,
    /// Title of the referenced work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Authors of the referenced work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    /// Publishing organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Publication date (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ExternalLink {
    /// Anchor text: `[Surname+ 2024]` for citations, else the title, else the URL
    pub fn anchor_text(&self) -> String {
        if let Some(first) = self.authors.as_ref().and_then(|authors| authors.first()) {
            let surname = first.split(' ').next_back().unwrap_or(first);
            let plus = if self.authors.as_ref().is_some_and(|a| a.len() > 1) { "+" } else { "" };
            let year = self.date.as_deref().and_then(|d| d.split('-').next()).unwrap_or("");
            return format!("[{surname}{plus} {year}]");
        }
        self.title.clone().unwrap_or_else(|| self.url.clone())
    }
}

impl Rendering {
    /// Plain-text rendering with the given payload
    pub fn text(kind: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: serde_json::Value::String(data.into()),
            style: None,
            internal_link: None,
            external_link: None,
        }
    }

    /// Whether this rendering is a note
    pub fn is_note(&self) -> bool {
        self.kind == NOTE_RENDERING
    }

    /// The payload as text (strings verbatim, anything else as JSON)
    pub fn data_text(&self) -> String {
        match &self.data {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Best-effort textual summary for terminals
    pub fn summary(&self) -> String {
        match self.kind.as_str() {
            "image" => format!("[image: {}]", self.data_text()),
            "plot" => "[plot]".to_string(),
            "link" => {
                if let Some(link) = &self.internal_link {
                    let text = self.data_text();
                    if text.is_empty() {
                        link.to_string()
                    } else {
                        text
                    }
                } else if let Some(link) = &self.external_link {
                    link.anchor_text()
                } else {
                    self.data_text()
                }
            }
            _ => self.data_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_internal_link() {
        let rendering: Rendering = serde_json::from_value(json!({
            "type": "link",
            "data": null,
            "internal_link": {"path": "lib.py", "line_number": 7}
        }))
        .unwrap();
        assert_eq!(rendering.internal_link, Some(Location::new("lib.py", 7)));
        assert_eq!(rendering.summary(), "lib.py:7");
        assert!(!rendering.is_note());
    }

    #[test]
    fn test_citation_anchor_text() {
        let link = ExternalLink {
            url: "https://arxiv.org/abs/1706.03762".into(),
            title: Some("Attention Is All You Need".into()),
            authors: Some(vec!["Ashish Vaswani".into(), "Noam Shazeer".into()]),
            date: Some("2017-06-12".into()),
            ..Default::default()
        };
        assert_eq!(link.anchor_text(), "[Vaswani+ 2017]");

        let bare = ExternalLink { url: "https://example.com".into(), ..Default::default() };
        assert_eq!(bare.anchor_text(), "https://example.com");
    }

    #[test]
    fn test_numeric_data_text() {
        let rendering: Rendering =
            serde_json::from_value(json!({"type": "markdown", "data": 3})).unwrap();
        assert_eq!(rendering.data_text(), "3");
        assert!(Rendering::text("note", "remember").is_note());
    }
}
