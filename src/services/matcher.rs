use crate::models::{MatchType, TriggerDefinition};
use regex::RegexBuilder;

/// Decide whether `message` matches a single trigger.
///
/// A disabled trigger never matches, before any pattern logic runs. A
/// malformed regex pattern is a configuration error, not a crash: it is
/// logged and treated as never-matching so input handling stays alive.
pub fn match_trigger(message: &str, trigger: &TriggerDefinition) -> bool {
    if !trigger.enabled {
        return false;
    }

    match trigger.match_type {
        MatchType::Exact => match_exact(message, trigger),
        MatchType::Regex => match_regex(message, trigger),
        MatchType::Hashtag => match_hashtag(message, trigger),
    }
}

/// Every trigger that matches `message`, in the order given.
///
/// Callers pass `registry.enabled_triggers()` so the result preserves
/// registration order; all matches are returned, not just the first.
pub fn find_matching_triggers<'a>(
    message: &str,
    triggers: &[&'a TriggerDefinition],
) -> Vec<&'a TriggerDefinition> {
    triggers
        .iter()
        .filter(|t| match_trigger(message, t))
        .copied()
        .collect()
}

fn match_exact(message: &str, trigger: &TriggerDefinition) -> bool {
    if trigger.case_sensitive {
        message == trigger.pattern
    } else {
        message.to_lowercase() == trigger.pattern.to_lowercase()
    }
}

fn match_regex(message: &str, trigger: &TriggerDefinition) -> bool {
    let compiled = RegexBuilder::new(&trigger.pattern)
        .case_insensitive(!trigger.case_sensitive)
        .build();

    match compiled {
        Ok(re) => re.is_match(message),
        Err(e) => {
            tracing::warn!(
                "Trigger '{}' has an invalid regex pattern, treating as no-match: {}",
                trigger.id,
                e
            );
            false
        }
    }
}

/// Hashtag matching is always case-insensitive, regardless of the
/// trigger's flag, and requires a word boundary after the tag so that
/// `#party` does not match `#partytime`.
fn match_hashtag(message: &str, trigger: &TriggerDefinition) -> bool {
    let word = trigger.pattern.trim_start_matches('#');
    if word.is_empty() {
        return false;
    }

    let pattern = format!(r"#{}\b", regex::escape(word));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.is_match(message),
        Err(e) => {
            tracing::warn!(
                "Trigger '{}' produced an invalid hashtag pattern, treating as no-match: {}",
                trigger.id,
                e
            );
            false
        }
    }
}
