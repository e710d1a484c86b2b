// Konami - easter-egg trigger and effect engine
//
// A small client-side runtime that watches chat-style text input for
// pattern matches, arbitrates which competing visual/audio effects may run
// concurrently, preloads heavyweight media in the background, and persists
// a discovery ledger across sessions. Concrete effects are opaque handlers
// supplied by the host application.

pub mod config;
pub mod engine;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod registry;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{CatalogueConfig, ConfigManager, EngineSettings};
pub use engine::{EngineController, InputEvent, Key, MessageDisposition};
pub use input::{ClickCounter, Debouncer};
pub use metrics::Metrics;
pub use models::{
    ActiveEffect, EffectDefinition, EffectHandler, EngineState, MatchType, ResourceDescriptor,
    ResourceKind, TriggerContext, TriggerDefinition,
};
pub use persistence::DiscoveryLedger;
pub use registry::{EffectRegistry, RegistryError};
pub use services::{PreloadStatus, ResourcePreloader};
pub use state::{EasterEggStore, StateChange};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
