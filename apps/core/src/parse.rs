//! Response Validator/Parser
//!
//! Turns the raw model response envelope into a validated `AnalysisResult`.
//! Three stages, each with its own failure kind: envelope navigation
//! (`MalformedEnvelope`), JSON parsing of the generated text (`InvalidJson`),
//! and field-by-field schema checks (`SchemaViolation`). The remote shape is
//! never trusted implicitly; every field is projected out of an untyped
//! document explicitly.

use serde_json::Value;

use crate::error::AppError;
use crate::models::{AnalysisResult, ReplySuggestion, ReplyTone};

/// Number of reply suggestions the output contract pins.
pub const EXPECTED_REPLY_COUNT: usize = 3;

/// Navigates the envelope to the model's generated text:
/// `candidates[0].content.parts[0].text`. Absent or empty text is a
/// malformed envelope.
pub fn extract_generated_text(envelope: &Value) -> Result<&str, AppError> {
    let text = envelope
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::MalformedEnvelope(
                "no generated text at candidates[0].content.parts[0].text".to_string(),
            )
        })?;

    if text.trim().is_empty() {
        return Err(AppError::MalformedEnvelope(
            "generated text is empty".to_string(),
        ));
    }
    Ok(text)
}

/// Parses and validates one raw envelope into an `AnalysisResult`.
pub fn parse_analysis(envelope: &Value) -> Result<AnalysisResult, AppError> {
    // 1. Pull the generated text out of the envelope.
    let text = extract_generated_text(envelope)?;

    // 2. The text must be a complete JSON document on its own. No markdown
    //    fences or prose wrappers are repaired here.
    let doc: Value =
        serde_json::from_str(text).map_err(|e| AppError::InvalidJson(e.to_string()))?;

    // 3. Project the untyped document into the strict result shape.
    let obj = doc
        .as_object()
        .ok_or_else(|| AppError::SchemaViolation("reply is not a JSON object".to_string()))?;

    let tone = require_str(&doc, "tone")?.to_string();
    let score = require_int_in_range(&doc, "score", 1, 10)? as u8;
    let explanation = require_str(&doc, "explanation")?;
    if explanation.is_empty() {
        return Err(AppError::SchemaViolation("'explanation' is empty".to_string()));
    }
    let confidence = require_int_in_range(&doc, "confidence", 1, 100)? as u8;

    let raw_replies = obj
        .get("replies")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::SchemaViolation("missing 'replies' array".to_string()))?;
    if raw_replies.len() != EXPECTED_REPLY_COUNT {
        return Err(AppError::SchemaViolation(format!(
            "expected exactly {} replies, got {}",
            EXPECTED_REPLY_COUNT,
            raw_replies.len()
        )));
    }

    let mut replies = Vec::with_capacity(EXPECTED_REPLY_COUNT);
    for (i, raw) in raw_replies.iter().enumerate() {
        replies.push(parse_reply(raw, i)?);
    }
    for (i, reply) in replies.iter().enumerate() {
        if replies[..i].iter().any(|r| r.tone == reply.tone) {
            return Err(AppError::SchemaViolation(format!(
                "duplicate reply category '{}'",
                reply.tone.label()
            )));
        }
    }

    Ok(AnalysisResult {
        tone,
        score,
        explanation: explanation.to_string(),
        confidence,
        replies,
    })
}

/// Projects one entry of the `replies` array. Unknown category labels are
/// tolerated and kept; a missing or empty `msg` is not.
fn parse_reply(raw: &Value, index: usize) -> Result<ReplySuggestion, AppError> {
    let label = raw
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::SchemaViolation(format!("reply {} is missing a string 'type'", index))
        })?;
    let message = raw
        .get("msg")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::SchemaViolation(format!("reply {} is missing a string 'msg'", index))
        })?;
    if message.is_empty() {
        return Err(AppError::SchemaViolation(format!(
            "reply {} has an empty 'msg'",
            index
        )));
    }
    Ok(ReplySuggestion {
        tone: ReplyTone::from(label.to_string()),
        message: message.to_string(),
    })
}

fn require_str<'a>(doc: &'a Value, key: &str) -> Result<&'a str, AppError> {
    doc.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::SchemaViolation(format!("missing or non-string '{}'", key)))
}

/// Requires an integer field within an inclusive range. Non-integral numbers
/// (e.g. 8.5) fail the same way missing keys do.
fn require_int_in_range(doc: &Value, key: &str, min: i64, max: i64) -> Result<i64, AppError> {
    let n = doc
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| AppError::SchemaViolation(format!("missing or non-integer '{}'", key)))?;
    if n < min || n > max {
        return Err(AppError::SchemaViolation(format!(
            "'{}' out of range: {} not in [{}, {}]",
            key, n, min, max
        )));
    }
    Ok(n)
}
