//! Parsing raw component-stack text into structured frames.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::Frame;

/// Marker prefixing stack lines in the captured text format. Lines without
/// it, such as the DOM tag preview line, are not frames.
const STACK_LINE_MARKER: &str = "in ";

/// Extensions accepted by default when no configuration is supplied.
pub const DEFAULT_SOURCE_EXTENSIONS: [&str; 6] = ["js", "jsx", "ts", "tsx", "mjs", "cjs"];

static NAMED_FRAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?) \(at (.+):(\d+):(\d+)\)$").expect("valid named-frame regex"));

static PLAIN_FRAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+):(\d+):(\d+)$").expect("valid plain-frame regex"));

/// Outcome of matching one line against the two recognized frame shapes.
///
/// `Unrecognized` is a local skip for the caller, never a fatal error: a
/// block of stack text may legitimately contain non-frame lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// `<name> (at <file>:<line>:<col>)`
    Named {
        name: String,
        file: String,
        line: u32,
        col: u32,
    },
    /// `<file>:<line>:<col>` with no component name.
    Plain { file: String, line: u32, col: u32 },
    Unrecognized,
}

/// Match one line of text against the named shape, then the plain shape.
pub fn parse_line(text: &str) -> ParsedLine {
    if let Some(caps) = NAMED_FRAME.captures(text) {
        if let (Some(line), Some(col)) = (parse_position(&caps[3]), parse_position(&caps[4])) {
            return ParsedLine::Named {
                name: caps[1].to_owned(),
                file: caps[2].to_owned(),
                line,
                col,
            };
        }
        return ParsedLine::Unrecognized;
    }

    if let Some(caps) = PLAIN_FRAME.captures(text) {
        if let (Some(line), Some(col)) = (parse_position(&caps[2]), parse_position(&caps[3])) {
            return ParsedLine::Plain {
                file: caps[1].to_owned(),
                line,
                col,
            };
        }
    }

    ParsedLine::Unrecognized
}

/// Build a [`Frame`] from one frame-shaped line.
///
/// Returns `None` both for unrecognized lines and for recognized ones that
/// are discarded because the file extension is not a known source extension.
/// Discarding keeps non-source frames (library internals, extensionless
/// bundler entries) out of the stack without rejecting the whole selection.
pub fn frame_from_line(body: &str, raw: &str, extensions: &[String]) -> Option<Frame> {
    let (name, file, line, col) = match parse_line(body) {
        ParsedLine::Named {
            name,
            file,
            line,
            col,
        } => (Some(name), file, line, col),
        ParsedLine::Plain { file, line, col } => (None, file, line, col),
        ParsedLine::Unrecognized => return None,
    };

    if !has_source_extension(&file, extensions) {
        return None;
    }

    Some(Frame {
        raw: raw.to_owned(),
        name,
        file,
        line,
        col,
    })
}

/// Parse a multi-line stack block, keeping only lines carrying the leading
/// `in ` marker that match a recognized shape. Every other line is skipped.
pub fn parse_stack_text(text: &str, extensions: &[String]) -> Vec<Frame> {
    text.lines()
        .filter_map(|raw| {
            let body = raw.trim_start().strip_prefix(STACK_LINE_MARKER)?;
            frame_from_line(body, raw, extensions)
        })
        .collect()
}

/// Positions are 1-based; zero or anything that overflows is discarded.
fn parse_position(digits: &str) -> Option<u32> {
    match digits.parse::<u32>() {
        Ok(value) if value >= 1 => Some(value),
        _ => None,
    }
}

fn has_source_extension(file: &str, extensions: &[String]) -> bool {
    let basename = file.rsplit(['/', '\\']).next().unwrap_or(file);
    match basename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => extensions.iter().any(|known| known == ext),
        _ => false,
    }
}
