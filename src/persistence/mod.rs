// Discovery ledger persistence
//
// The ledger is the record of which effects this user has ever triggered.
// On disk it is a single JSON array of effect ids under a fixed file name
// in the data directory. It grows monotonically: ids are only ever added,
// within a session and across restarts.
//
// Every path here is fail-open: missing or corrupt data reads as an empty
// set, and write failures are logged and swallowed. The engine must stay
// fully usable when storage degrades.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;

/// Fixed namespace for the persisted ledger within the data directory.
const LEDGER_FILE_NAME: &str = "discovered_eggs.json";

/// File-backed store for discovered effect ids.
///
/// The in-memory set lives in [`EngineState`](crate::models::EngineState);
/// this type only reads and writes the durable copy. Writes happen
/// synchronously inside the store call that adds an id, so a persisted
/// ledger never lags the state that produced it.
#[derive(Debug, Clone)]
pub struct DiscoveryLedger {
    ledger_path: Utf8PathBuf,
}

impl DiscoveryLedger {
    /// Create a ledger rooted at the given data directory. The directory
    /// is created lazily on first save, not here.
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P) -> Self {
        Self {
            ledger_path: data_dir.as_ref().join(LEDGER_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.ledger_path
    }

    /// Load the persisted set of discovered ids.
    ///
    /// Missing file, unreadable file and malformed JSON all come back as
    /// an empty set; the error is logged, never raised.
    pub fn load(&self) -> HashSet<String> {
        if !self.ledger_path.exists() {
            tracing::debug!("No discovery ledger at {}, starting empty", self.ledger_path);
            return HashSet::new();
        }

        match self.try_load() {
            Ok(ids) => {
                tracing::info!("Loaded {} discovered ids from {}", ids.len(), self.ledger_path);
                ids
            }
            Err(e) => {
                tracing::warn!(
                    "Discovery ledger at {} is unreadable, starting empty: {:#}",
                    self.ledger_path,
                    e
                );
                HashSet::new()
            }
        }
    }

    /// Persist the full set of discovered ids.
    ///
    /// Failures are logged and swallowed; the in-memory set remains the
    /// source of truth for the rest of the session.
    pub fn save(&self, discovered: &HashSet<String>) {
        if let Err(e) = self.try_save(discovered) {
            tracing::warn!("Failed to persist discovery ledger to {}: {:#}", self.ledger_path, e);
        }
    }

    fn try_load(&self) -> Result<HashSet<String>> {
        let contents = fs::read_to_string(&self.ledger_path)
            .with_context(|| format!("Failed to read ledger: {}", self.ledger_path))?;

        let ids: Vec<String> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse ledger: {}", self.ledger_path))?;

        Ok(ids.into_iter().collect())
    }

    fn try_save(&self, discovered: &HashSet<String>) -> Result<()> {
        if let Some(parent) = self.ledger_path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create data directory: {parent}"))?;
            }
        }

        // Sorted for stable on-disk output.
        let mut ids: Vec<&String> = discovered.iter().collect();
        ids.sort();

        let json = serde_json::to_string(&ids).context("Failed to serialize ledger")?;

        fs::write(&self.ledger_path, json)
            .with_context(|| format!("Failed to write ledger: {}", self.ledger_path))?;

        tracing::debug!("Persisted {} discovered ids to {}", ids.len(), self.ledger_path);
        Ok(())
    }
}
