use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of reply categories the model is instructed to produce.
///
/// Unrecognized labels are tolerated, not rejected: they are preserved
/// verbatim in `Other` so the renderer can still show the model's own label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReplyTone {
    /// A mature, self-assured response.
    Confident,
    /// A neutral, de-escalating response.
    Calm,
    /// A clever response, using slang where it fits.
    Witty,
    /// Any label outside the closed set, kept as the model wrote it.
    Other(String),
}

impl ReplyTone {
    /// Display label for this category.
    pub fn label(&self) -> &str {
        match self {
            ReplyTone::Confident => "Confident",
            ReplyTone::Calm => "Calm",
            ReplyTone::Witty => "Witty",
            ReplyTone::Other(label) => label,
        }
    }

    /// Total mapping from category to presentation hint. Unknown categories
    /// get the generic speech-bubble fallback instead of failing.
    pub fn hint(&self) -> ReplyHint {
        match self {
            ReplyTone::Confident => ReplyHint::ShieldCheck,
            ReplyTone::Calm => ReplyHint::Zap,
            ReplyTone::Witty => ReplyHint::Sparkles,
            ReplyTone::Other(_) => ReplyHint::MessageSquare,
        }
    }
}

impl From<String> for ReplyTone {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Confident" => ReplyTone::Confident,
            "Calm" => ReplyTone::Calm,
            "Witty" => ReplyTone::Witty,
            _ => ReplyTone::Other(label),
        }
    }
}

impl From<ReplyTone> for String {
    fn from(tone: ReplyTone) -> Self {
        tone.label().to_string()
    }
}

/// Icon identifier handed to the rendering consumer alongside each reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplyHint {
    ShieldCheck,
    Zap,
    Sparkles,
    MessageSquare,
}

impl ReplyHint {
    /// The icon name as the rendering layer expects it.
    pub fn icon_name(&self) -> &'static str {
        match self {
            ReplyHint::ShieldCheck => "shield-check",
            ReplyHint::Zap => "zap",
            ReplyHint::Sparkles => "sparkles",
            ReplyHint::MessageSquare => "message-square",
        }
    }
}

/// One suggested reply produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplySuggestion {
    /// The reply category. Serialized as `type` on the model contract.
    #[serde(rename = "type")]
    pub tone: ReplyTone,
    /// The suggested reply text. Serialized as `msg` on the model contract.
    #[serde(rename = "msg")]
    pub message: String,
}

impl ReplySuggestion {
    /// Presentation hint for this reply's category.
    pub fn hint(&self) -> ReplyHint {
        self.tone.hint()
    }
}

/// The validated output of one analysis request.
///
/// Only produced by successful end-to-end validation; a partially-valid
/// model reply never becomes an `AnalysisResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Free-form short tone label (e.g. "Passive-Aggressive", "High Rizz").
    pub tone: String,
    /// Emotional tension score from 1 to 10, where 10 is maximum tension.
    pub score: u8,
    /// Short analysis of the subtext and slang used. Never empty.
    pub explanation: String,
    /// The model's confidence in the reading, from 1 to 100.
    pub confidence: u8,
    /// Exactly 3 suggested replies with unique categories.
    pub replies: Vec<ReplySuggestion>,
}

/// One completed analysis, as held by the session: the result plus request
/// metadata. Only the latest record survives; no history is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// The unique identifier of the request that produced this result.
    pub id: Uuid,
    /// When the request was submitted.
    pub submitted_at: DateTime<Utc>,
    /// The validated analysis.
    pub result: AnalysisResult,
}
