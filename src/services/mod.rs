//! Services module - pure logic under the easter-egg state machine.
//!
//! - [`matcher`]: decides whether input text matches a trigger definition.
//!   Stateless functions; malformed patterns degrade to no-match instead
//!   of propagating.
//! - [`preloader`]: background loader and cache for effect media. Batches
//!   run parallel and settle-all — a failed resource is recorded, never
//!   fatal.
//!
//! Nothing in this module touches the store or the glue layer; services
//! take explicit inputs and are directly testable.

pub mod matcher;
pub mod preloader;

pub use matcher::{find_matching_triggers, match_trigger};
pub use preloader::{LoadedResource, PreloadFailure, PreloadStatus, ResourcePreloader};
