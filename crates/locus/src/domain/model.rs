//! Domain models for captured stack frames and classified selections.

use serde::{Deserialize, Serialize};

/// One entry of a captured component stack.
///
/// `raw` keeps the original line of text verbatim for display and debugging.
/// `name` is `None` for anonymous frames, which typically correspond to
/// intrinsic DOM elements rather than components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub raw: String,
    pub name: Option<String>,
    pub file: String,
    pub line: u32,
    pub col: u32,
}

/// A [`Frame`] paired with its project-relative path.
///
/// `normalized_file` always uses forward slashes, never starts with a slash,
/// and is anchored at the nearest `src/` directory boundary when the raw path
/// contains one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFrame {
    #[serde(flatten)]
    pub frame: Frame,
    pub normalized_file: String,
}

/// The unit exchanged over the bridge: one user selection event.
///
/// Constructed once by the producing side, transmitted once, consumed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    /// Human label for the selected DOM element, e.g. a tag+class summary.
    pub dom_label: Option<String>,
    /// Ordered frames, index 0 closest to the selected element.
    pub frames: Vec<Frame>,
}

/// The two target frames derived from a selection.
///
/// Both sides are optional: a stack with no frame inside the project source
/// tree has no rendered-by target, and without one there is no used-in
/// target either. Absence is a normal outcome, not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Frame that most plausibly belongs to the component whose render
    /// produced the selected DOM node.
    pub rendered_by: Option<NormalizedFrame>,
    /// Ancestor frame representing the meaningful consumer of that
    /// component, with structural wrappers skipped.
    pub used_in: Option<NormalizedFrame>,
}

impl Classification {
    /// A classification with no targets, the result for an empty stack.
    pub fn empty() -> Self {
        Self {
            rendered_by: None,
            used_in: None,
        }
    }
}
