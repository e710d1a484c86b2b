use crate::models::TriggerContext;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

/// Kind of media resource an effect depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Video,
    Audio,
    Image,
}

/// A media resource referenced by an effect definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,

    /// Location of the media file, relative to the host's asset root or
    /// absolute.
    pub path: Utf8PathBuf,

    /// Resources with `preload = false` are never fetched ahead of time
    /// and do not count toward preload progress.
    #[serde(default = "default_true")]
    pub preload: bool,

    /// Playback hint for audio/video handlers.
    #[serde(default)]
    pub looped: bool,

    /// Playback volume hint in 0.0..=1.0; `None` means handler default.
    #[serde(default)]
    pub volume: Option<f32>,
}

fn default_true() -> bool {
    true
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            preload: true,
            looped: false,
            volume: None,
        }
    }
}

/// Catalogue entry describing an effect. The executable part (the
/// handler) is bound separately at registry build time so definitions
/// stay serializable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectDefinition {
    /// Unique key, matching the triggering trigger's id by convention.
    pub id: String,

    /// Auto-close hint in milliseconds. `None` or 0 means the handler
    /// controls its own lifetime; the store never enforces this value.
    #[serde(default)]
    pub duration_ms: Option<u64>,

    /// Hints that the handler is expensive and should be loaded lazily
    /// by the host.
    #[serde(default)]
    pub is_heavy: bool,

    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,

    /// Effect may fire even while easter-egg mode is globally off.
    #[serde(default)]
    pub always_enabled: bool,
}

impl EffectDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            duration_ms: None,
            is_heavy: false,
            resources: Vec::new(),
            always_enabled: false,
        }
    }
}

/// Callback an effect handler invokes exactly once when it ends itself
/// (auto-expiry or self-cancel on missing resources). Dismissal through
/// the store does not require it.
pub type OnClose = Arc<dyn Fn() + Send + Sync>;

/// Opaque per-activation state returned by [`EffectHandler::start`] and
/// handed back to [`EffectHandler::stop`].
pub type HandlerHandle = Box<dyn Any + Send>;

/// The single capability the engine needs from a concrete effect: start
/// it with the triggering context, stop it with the handle `start`
/// returned. The registry and store never see concrete effect types.
///
/// `resources` is the effect's own resource list; the bytes come from the
/// preload cache. Handlers that need a resource missing from the cache
/// are expected to self-cancel via `on_close` rather than render broken.
pub trait EffectHandler: Send + Sync {
    fn start(
        &self,
        ctx: &TriggerContext,
        on_close: OnClose,
        resources: &[ResourceDescriptor],
    ) -> HandlerHandle;

    /// Unconditional and immediate; the handler gets no veto. Cleanup
    /// (stopping audio, cancelling animation frames) happens here.
    fn stop(&self, handle: HandlerHandle);
}

/// Runtime record of an effect that is currently on screen.
#[derive(Clone, Debug)]
pub struct ActiveEffect {
    pub id: String,

    /// The input that fired the trigger.
    pub context: TriggerContext,

    /// Monotonic activation time; unchanged by idempotent re-triggers.
    pub started_at: Instant,

    /// Stacking order for the host's render layer, `1000 +` slot index.
    pub z_index: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_defaults_from_yaml() {
        let yaml = r#"
kind: audio
path: sounds/fanfare.ogg
"#;
        let resource: ResourceDescriptor = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(resource.kind, ResourceKind::Audio);
        assert_eq!(resource.path, Utf8PathBuf::from("sounds/fanfare.ogg"));
        assert!(resource.preload);
        assert!(!resource.looped);
        assert_eq!(resource.volume, None);
    }

    #[test]
    fn test_effect_defaults_from_yaml() {
        let yaml = r#"
id: confetti
"#;
        let effect: EffectDefinition = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(effect.id, "confetti");
        assert_eq!(effect.duration_ms, None);
        assert!(!effect.is_heavy);
        assert!(effect.resources.is_empty());
        assert!(!effect.always_enabled);
    }

    #[test]
    fn test_effect_round_trip_with_resources() {
        let mut effect = EffectDefinition::new("matrix");
        effect.duration_ms = Some(8000);
        effect.is_heavy = true;
        effect.resources.push(ResourceDescriptor {
            kind: ResourceKind::Video,
            path: "video/rain.webm".into(),
            preload: true,
            looped: true,
            volume: Some(0.4),
        });

        let yaml = serde_yaml_ng::to_string(&effect).unwrap();
        let back: EffectDefinition = serde_yaml_ng::from_str(&yaml).unwrap();

        assert_eq!(back, effect);
    }
}
