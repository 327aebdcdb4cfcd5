//! Structural validation of untrusted selection documents.

use serde_json::Value;

use crate::domain::errors::PayloadError;
use crate::domain::model::{Frame, SelectionPayload};

/// Validate an untrusted JSON document against the selection schema and
/// convert it into a typed payload.
///
/// Checks run in a fixed order and short-circuit on the first failure: the
/// document must be an object, `domLabel` a string or null (an absent field
/// counts as null, matching the producing side's `undefined`), and `frames`
/// a non-empty array whose elements each carry a string `raw`, a string or
/// null `name`, a string `file`, and 1-based integer `line` and `col`.
pub fn validate(document: &Value) -> Result<SelectionPayload, PayloadError> {
    let Some(object) = document.as_object() else {
        return Err(PayloadError::NotAnObject);
    };

    let dom_label = match object.get("domLabel") {
        None | Some(Value::Null) => None,
        Some(Value::String(label)) => Some(label.clone()),
        Some(_) => return Err(PayloadError::DomLabelType),
    };

    let Some(frames) = object.get("frames").and_then(Value::as_array) else {
        return Err(PayloadError::FramesNotArray);
    };
    if frames.is_empty() {
        return Err(PayloadError::FramesEmpty);
    }

    let frames = frames
        .iter()
        .enumerate()
        .map(|(index, entry)| validate_frame(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SelectionPayload { dom_label, frames })
}

fn validate_frame(index: usize, entry: &Value) -> Result<Frame, PayloadError> {
    let Some(object) = entry.as_object() else {
        return Err(PayloadError::FrameNotAnObject { index });
    };

    let raw = required_string(object, index, "raw")?;

    let name = match object.get("name") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => return Err(PayloadError::FrameNameType { index }),
    };

    let file = required_string(object, index, "file")?;
    let line = positive_int(object, index, "line")?;
    let col = positive_int(object, index, "col")?;

    Ok(Frame {
        raw,
        name,
        file,
        line,
        col,
    })
}

fn required_string(
    object: &serde_json::Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<String, PayloadError> {
    match object.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(PayloadError::FrameFieldNotString { index, field }),
    }
}

fn positive_int(
    object: &serde_json::Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<u32, PayloadError> {
    object
        .get(field)
        .and_then(Value::as_u64)
        .filter(|value| *value >= 1)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or(PayloadError::FrameFieldNotPositiveInt { index, field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        json!({
            "domLabel": "button.save",
            "frames": [
                {
                    "raw": "in /app/src/toolbar.tsx:68:10",
                    "name": null,
                    "file": "/app/src/toolbar.tsx",
                    "line": 68,
                    "col": 10
                },
                {
                    "raw": "in Toolbar (at /app/src/panel.tsx:43:6)",
                    "name": "Toolbar",
                    "file": "/app/src/panel.tsx",
                    "line": 43,
                    "col": 6
                }
            ]
        })
    }

    #[test]
    fn accepts_schema_document() {
        let payload = validate(&valid_document()).expect("valid payload");
        assert_eq!(payload.dom_label.as_deref(), Some("button.save"));
        assert_eq!(payload.frames.len(), 2);
        assert_eq!(payload.frames[1].name.as_deref(), Some("Toolbar"));
        assert_eq!(payload.frames[0].line, 68);
    }

    #[test]
    fn accepts_null_and_absent_dom_label() {
        let mut doc = valid_document();
        doc["domLabel"] = Value::Null;
        assert!(validate(&doc).unwrap().dom_label.is_none());

        let mut doc = valid_document();
        doc.as_object_mut().unwrap().remove("domLabel");
        assert!(validate(&doc).unwrap().dom_label.is_none());
    }

    #[test]
    fn rejects_non_object_documents() {
        for doc in [json!(null), json!([1, 2]), json!("text"), json!(7)] {
            assert_eq!(validate(&doc), Err(PayloadError::NotAnObject));
        }
    }

    #[test]
    fn rejects_bad_dom_label() {
        let mut doc = valid_document();
        doc["domLabel"] = json!(42);
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.to_string(), "domLabel must be a string or null");
    }

    #[test]
    fn rejects_missing_or_non_array_frames() {
        let mut doc = valid_document();
        doc.as_object_mut().unwrap().remove("frames");
        assert_eq!(validate(&doc), Err(PayloadError::FramesNotArray));

        let mut doc = valid_document();
        doc["frames"] = json!({"not": "an array"});
        assert_eq!(validate(&doc), Err(PayloadError::FramesNotArray));
    }

    #[test]
    fn rejects_empty_frames() {
        let mut doc = valid_document();
        doc["frames"] = json!([]);
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.to_string(), "frames must have at least 1 entry");
    }

    #[test]
    fn rejects_zero_line_with_indexed_message() {
        let mut doc = valid_document();
        doc["frames"][0]["line"] = json!(0);
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.to_string(), "frames[0].line must be a positive integer");
    }

    #[test]
    fn rejects_non_integer_positions() {
        for bad in [json!(1.5), json!("12"), json!(-3), json!(null)] {
            let mut doc = valid_document();
            doc["frames"][1]["col"] = bad;
            let err = validate(&doc).unwrap_err();
            assert_eq!(err.to_string(), "frames[1].col must be a positive integer");
        }
    }

    #[test]
    fn rejects_missing_raw_and_file() {
        let mut doc = valid_document();
        doc["frames"][0].as_object_mut().unwrap().remove("raw");
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.to_string(), "frames[0].raw must be a string");

        let mut doc = valid_document();
        doc["frames"][1].as_object_mut().unwrap().remove("file");
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.to_string(), "frames[1].file must be a string");
    }

    #[test]
    fn rejects_non_object_frame_element() {
        let mut doc = valid_document();
        doc["frames"][1] = json!("frame");
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.to_string(), "frames[1] must be an object");
    }

    #[test]
    fn first_failure_wins() {
        let mut doc = valid_document();
        doc["frames"][0]["raw"] = json!(1);
        doc["frames"][0]["line"] = json!(0);
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.to_string(), "frames[0].raw must be a string");
    }
}
