//! Plain-text rendering of a classified selection.

use std::fmt::Write as _;

use crate::domain::model::{Classification, NormalizedFrame};

const NO_TARGET: &str = "(no target found)";
const ANONYMOUS: &str = "<anonymous>";

/// Render a human-readable report: the selection label, both targets, and
/// the full normalized stack in capture order.
pub fn render(
    dom_label: Option<&str>,
    classification: &Classification,
    frames: &[NormalizedFrame],
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "selection: {}", dom_label.unwrap_or("<unknown element>"));
    let _ = writeln!(out, "rendered by: {}", target_line(classification.rendered_by.as_ref()));
    let _ = writeln!(out, "used in:     {}", target_line(classification.used_in.as_ref()));

    let _ = writeln!(out, "frames:");
    for (index, frame) in frames.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, describe(frame));
    }

    out
}

fn target_line(target: Option<&NormalizedFrame>) -> String {
    target.map_or_else(|| NO_TARGET.to_owned(), describe)
}

fn describe(frame: &NormalizedFrame) -> String {
    format!(
        "{} {}:{}:{}",
        frame.frame.name.as_deref().unwrap_or(ANONYMOUS),
        frame.normalized_file,
        frame.frame.line,
        frame.frame.col
    )
}
