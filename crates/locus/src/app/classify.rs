//! Heuristic selection of the rendered-by and used-in frames.

use crate::domain::model::{Classification, NormalizedFrame};

/// Path segments marking structural wrapper modules.
const WRAPPER_PATH_SEGMENTS: [&str; 2] = ["/context/", "/providers/"];

/// Name fragments marking structural wrapper components.
///
/// Known limitation: this is plain substring containment over free-text
/// identifiers, so a legitimate component whose name happens to contain
/// `Provider`, `Context`, or `Boundary` is skipped too. The policy is kept
/// as-is for compatibility with the capturing side.
const WRAPPER_NAME_MARKERS: [&str; 3] = ["Provider", "Context", "Boundary"];

/// Whether a frame looks like a structural cross-cutting component (context
/// provider, error boundary) rather than a semantic ancestor.
pub fn is_wrapper(frame: &NormalizedFrame) -> bool {
    if WRAPPER_PATH_SEGMENTS
        .iter()
        .any(|segment| frame.normalized_file.contains(segment))
    {
        return true;
    }

    frame
        .frame
        .name
        .as_deref()
        .is_some_and(|name| WRAPPER_NAME_MARKERS.iter().any(|marker| name.contains(marker)))
}

/// Derive the two target frames from a normalized stack.
///
/// Frames are scanned in capture order, index 0 being the innermost frame,
/// the one closest to the selected element.
///
/// Rendered-by is the first frame inside the project source tree
/// (`normalized_file` starting with `src/`, positive line). The innermost
/// project frame points at the JSX call site inside the component whose
/// render produced the node, so it wins even when anonymous.
///
/// Used-in then scans outward from the rendered-by frame for the first
/// non-wrapper frame in a different file; if none qualifies the wrapper
/// constraint is relaxed, and if still nothing qualifies the rendered-by
/// frame itself is returned, signaling that no distinct parent was found.
///
/// An empty stack yields no targets at all; that is a normal outcome.
pub fn classify(frames: &[NormalizedFrame]) -> Classification {
    let Some(rendered_idx) = frames.iter().position(is_project_frame) else {
        return Classification::empty();
    };

    let rendered = &frames[rendered_idx];
    let outward = &frames[rendered_idx + 1..];

    let used_in = outward
        .iter()
        .find(|frame| !is_wrapper(frame) && frame.normalized_file != rendered.normalized_file)
        .or_else(|| {
            outward
                .iter()
                .find(|frame| frame.normalized_file != rendered.normalized_file)
        })
        .unwrap_or(rendered);

    Classification {
        rendered_by: Some(rendered.clone()),
        used_in: Some(used_in.clone()),
    }
}

fn is_project_frame(frame: &NormalizedFrame) -> bool {
    frame.normalized_file.starts_with("src/") && frame.frame.line >= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::normalize::normalize_frame;
    use crate::domain::model::Frame;

    fn frame(name: Option<&str>, file: &str, line: u32) -> NormalizedFrame {
        normalize_frame(Frame {
            raw: format!("in {file}:{line}:1"),
            name: name.map(str::to_owned),
            file: file.to_owned(),
            line,
            col: 1,
        })
    }

    #[test]
    fn innermost_project_frame_wins_over_later_named_frame() {
        let frames = vec![
            frame(None, "/(x)/./src/tab-bar.tsx", 68),
            frame(None, "/(x)/./src/tab-bar.tsx", 43),
            frame(Some("RightPanel"), "/(x)/./src/panels/RightPanel.tsx", 28),
        ];

        let result = classify(&frames);
        let rendered = result.rendered_by.expect("rendered-by");
        assert_eq!(rendered.normalized_file, "src/tab-bar.tsx");
        assert_eq!(rendered.frame.line, 68);

        let used = result.used_in.expect("used-in");
        assert_eq!(used.normalized_file, "src/panels/RightPanel.tsx");
        assert_eq!(used.frame.line, 28);
    }

    #[test]
    fn used_in_skips_provider_wrapper() {
        let frames = vec![
            frame(Some("CanvasBar"), "/app/src/canvas/CanvasBar.tsx", 21),
            frame(
                Some("CanvasSelectionProvider"),
                "/app/src/canvas/CanvasSelectionContext.tsx",
                21,
            ),
            frame(Some("LayoutContentInner"), "/app/src/layout/LayoutContent.tsx", 37),
        ];

        let result = classify(&frames);
        assert_eq!(
            result.rendered_by.unwrap().normalized_file,
            "src/canvas/CanvasBar.tsx"
        );
        let used = result.used_in.expect("used-in");
        assert_eq!(used.normalized_file, "src/layout/LayoutContent.tsx");
        assert_eq!(used.frame.line, 37);
    }

    #[test]
    fn falls_back_to_wrapper_when_nothing_else_differs() {
        let frames = vec![
            frame(Some("Toolbar"), "/app/src/toolbar.tsx", 5),
            frame(Some("ThemeProvider"), "/app/src/theme.tsx", 9),
        ];

        let result = classify(&frames);
        assert_eq!(result.used_in.unwrap().normalized_file, "src/theme.tsx");
    }

    #[test]
    fn falls_back_to_rendered_by_itself() {
        let frames = vec![
            frame(Some("Toolbar"), "/app/src/toolbar.tsx", 5),
            frame(None, "/app/src/toolbar.tsx", 40),
        ];

        let result = classify(&frames);
        let rendered = result.rendered_by.expect("rendered-by");
        let used = result.used_in.expect("used-in");
        assert_eq!(used, rendered);
        assert_eq!(used.frame.line, 5);
    }

    #[test]
    fn no_project_frames_yields_no_targets() {
        let frames = vec![frame(None, "/vendor/react-dom.js", 1)];
        let result = classify(&frames);
        assert_eq!(result.rendered_by, None);
        assert_eq!(result.used_in, None);
    }

    #[test]
    fn empty_stack_yields_no_targets() {
        assert_eq!(classify(&[]), Classification::empty());
    }

    #[test]
    fn wrapper_predicate_matches_path_segments_and_name_markers() {
        assert!(is_wrapper(&frame(None, "/app/src/context/theme.tsx", 1)));
        assert!(is_wrapper(&frame(None, "/app/src/providers/auth.tsx", 1)));
        assert!(is_wrapper(&frame(Some("ErrorBoundary"), "/app/src/eb.tsx", 1)));
        assert!(is_wrapper(&frame(Some("AppContextHolder"), "/app/src/a.tsx", 1)));
        assert!(!is_wrapper(&frame(Some("Toolbar"), "/app/src/toolbar.tsx", 1)));
    }
}
