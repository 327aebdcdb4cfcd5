//! Domain-specific errors.

use thiserror::Error;

/// Structural rejection of an untrusted selection document.
///
/// Produced by the payload validator; each variant renders the exact message
/// surfaced to the transport caller, naming the offending field and, for
/// frame-level failures, the array index. The first failure encountered wins
/// and no partial validation results are reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("payload must be a JSON object")]
    NotAnObject,
    #[error("domLabel must be a string or null")]
    DomLabelType,
    #[error("frames must be an array")]
    FramesNotArray,
    #[error("frames must have at least 1 entry")]
    FramesEmpty,
    #[error("frames[{index}] must be an object")]
    FrameNotAnObject { index: usize },
    #[error("frames[{index}].{field} must be a string")]
    FrameFieldNotString { index: usize, field: &'static str },
    #[error("frames[{index}].name must be a string or null")]
    FrameNameType { index: usize },
    #[error("frames[{index}].{field} must be a positive integer")]
    FrameFieldNotPositiveInt { index: usize, field: &'static str },
}
