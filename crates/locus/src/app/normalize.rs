//! Rewriting captured file paths into project-relative form.

use crate::domain::model::{Frame, NormalizedFrame};

/// Rewrite `file` into a project-relative path anchored at the nearest
/// `src/` boundary.
///
/// Dev servers and bundlers prepend opaque routing segments (route groups,
/// virtual roots) to the paths they report, and the capturing environment
/// may use either separator convention. The result always uses forward
/// slashes, never starts with a slash, and is left untouched (separators
/// aside) when no `src` boundary exists. Idempotent.
pub fn normalize_path(file: &str) -> String {
    let anchored = if let Some(idx) = file.find("/src/") {
        &file[idx + 1..]
    } else if let Some(idx) = file.find("src\\") {
        &file[idx..]
    } else {
        file
    };

    anchored.trim_start_matches(['/', '\\']).replace('\\', "/")
}

/// Attach the normalized path to a frame.
pub fn normalize_frame(frame: Frame) -> NormalizedFrame {
    let normalized_file = normalize_path(&frame.file);
    NormalizedFrame {
        frame,
        normalized_file,
    }
}

/// Normalize a whole stack in capture order.
pub fn normalize_frames(frames: Vec<Frame>) -> Vec<NormalizedFrame> {
    frames.into_iter().map(normalize_frame).collect()
}
