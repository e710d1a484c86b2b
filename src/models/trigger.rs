use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// How a trigger's pattern is compared against input text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Whole-message equality (case-normalized unless `case_sensitive`).
    Exact,
    /// Pattern is a regular expression, compiled at match time.
    Regex,
    /// Pattern is a hashtag word; matches `#<pattern>` on a word boundary.
    Hashtag,
}

/// A pattern rule that, when matched against input text, requests
/// activation of the effect with the same id.
///
/// Definitions are immutable once registered with
/// [`EffectRegistry`](crate::registry::EffectRegistry). The serde defaults
/// mean a catalogue file only has to spell out `id`, `match_type` and
/// `pattern` for the common case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    /// Unique key; by convention also the id of the linked effect.
    pub id: String,

    pub match_type: MatchType,

    /// Meaning depends on `match_type`: literal text, a regex, or a
    /// hashtag word (leading `#` optional).
    pub pattern: String,

    /// Exact and regex matching normalize case unless this is set.
    /// Hashtag matching ignores it: hashtags are always case-insensitive.
    #[serde(default)]
    pub case_sensitive: bool,

    /// A disabled trigger never matches, regardless of input.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether a match suppresses forwarding the message to the normal
    /// chat pipeline.
    #[serde(default = "default_true")]
    pub blocks_message: bool,
}

fn default_true() -> bool {
    true
}

impl TriggerDefinition {
    /// Convenience constructor with the default flags
    /// (case-insensitive, enabled, blocks the message).
    pub fn new(id: impl Into<String>, match_type: MatchType, pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            match_type,
            pattern: pattern.into(),
            case_sensitive: false,
            enabled: true,
            blocks_message: true,
        }
    }
}

/// The originating input that fired a trigger, handed through to the
/// effect handler.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerContext {
    /// The message text that matched (empty for synthetic sources).
    pub message: String,

    /// Wall-clock time of the triggering input, unix milliseconds.
    pub timestamp: u64,

    /// Free-form metadata, e.g. `source = "click"` for click-burst
    /// triggers. Insertion order is preserved for handlers that render it.
    pub metadata: IndexMap<String, String>,
}

impl TriggerContext {
    /// Context for a message-driven trigger, stamped with the current
    /// wall-clock time.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: unix_millis_now(),
            metadata: IndexMap::new(),
        }
    }

    /// Context for a non-text trigger source such as a click burst.
    pub fn synthetic(source: &str) -> Self {
        let mut metadata = IndexMap::new();
        metadata.insert("source".to_string(), source.to_string());
        Self {
            message: String::new(),
            timestamp: unix_millis_now(),
            metadata,
        }
    }
}

fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
