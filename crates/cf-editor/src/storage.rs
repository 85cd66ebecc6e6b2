//! Local key-value persistence: auto-save snapshots and preferences.
//!
//! Best-effort by design. Read/write failures are logged and swallowed —
//! losing an auto-save is an inconvenience, crashing the editor over one
//! is not acceptable.

use cf_core::model::{PlacedBlock, ProgramModel};
use cf_core::registry::BlockRegistry;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// The platform's persistent string store (browser local storage, a
/// settings file, ...).
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&mut self, key: &str);
}

// ─── Preferences ─────────────────────────────────────────────────────────

const PREFERENCES_KEY: &str = "codequest-preferences";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    Light,
    Dark,
}

impl ThemeChoice {
    /// The canvas palette this preference selects.
    pub fn canvas_theme(self) -> cf_render::CanvasTheme {
        match self {
            ThemeChoice::Light => cf_render::CanvasTheme::light(),
            ThemeChoice::Dark => cf_render::CanvasTheme::dark(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: ThemeChoice,
    pub font_size: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            theme: ThemeChoice::Light,
            font_size: 14,
        }
    }
}

/// Load preferences, falling back to defaults on a missing or mangled
/// entry.
#[must_use]
pub fn load_preferences(store: &dyn KvStore) -> Preferences {
    let Some(raw) = store.get(PREFERENCES_KEY) else {
        return Preferences::default();
    };
    match serde_json::from_str(&raw) {
        Ok(prefs) => prefs,
        Err(e) => {
            log::warn!("unreadable preferences, using defaults: {e}");
            Preferences::default()
        }
    }
}

pub fn save_preferences(store: &mut dyn KvStore, prefs: &Preferences) {
    match serde_json::to_string(prefs) {
        Ok(json) => {
            if let Err(e) = store.set(PREFERENCES_KEY, &json) {
                log::warn!("saving preferences failed: {e}");
            }
        }
        Err(e) => log::warn!("serializing preferences failed: {e}"),
    }
}

// ─── Auto-save ───────────────────────────────────────────────────────────

/// Default interval between periodic snapshot writes.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic + on-blur snapshot writer for one editing session. Idempotent:
/// the last full snapshot wins, so there is nothing to coordinate.
#[derive(Debug)]
pub struct Autosave {
    key: String,
    interval: Duration,
    last_save: Option<Instant>,
}

impl Autosave {
    pub fn new(task_id: &str) -> Self {
        Self::with_interval(task_id, AUTOSAVE_INTERVAL)
    }

    pub fn with_interval(task_id: &str, interval: Duration) -> Self {
        Autosave {
            key: format!("codequest-autosave-{task_id}"),
            interval,
            last_save: None,
        }
    }

    /// Periodic trigger. Saves when the interval has elapsed since the
    /// last write; returns whether a write happened.
    pub fn tick(&mut self, now: Instant, store: &mut dyn KvStore, model: &ProgramModel) -> bool {
        let due = match self.last_save {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        };
        if !due {
            return false;
        }
        self.save(now, store, model);
        true
    }

    /// On-blur trigger: save immediately, resetting the interval clock.
    pub fn flush(&mut self, now: Instant, store: &mut dyn KvStore, model: &ProgramModel) {
        self.save(now, store, model);
    }

    /// Restore a saved snapshot into the model, if one exists and parses.
    pub fn restore(
        &self,
        store: &dyn KvStore,
        registry: &BlockRegistry,
        model: &mut ProgramModel,
    ) -> bool {
        let Some(raw) = store.get(&self.key) else {
            return false;
        };
        let blocks: Vec<PlacedBlock> = match serde_json::from_str(&raw) {
            Ok(blocks) => blocks,
            Err(e) => {
                log::warn!("unreadable auto-save snapshot, ignoring: {e}");
                return false;
            }
        };
        match model.restore(blocks, registry) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("auto-save snapshot no longer applies: {e}");
                false
            }
        }
    }

    pub fn clear(&self, store: &mut dyn KvStore) {
        store.remove(&self.key);
    }

    fn save(&mut self, now: Instant, store: &mut dyn KvStore, model: &ProgramModel) {
        self.last_save = Some(now);
        match serde_json::to_string(&model.snapshot()) {
            Ok(json) => {
                if let Err(e) = store.set(&self.key, &json) {
                    log::warn!("auto-save write failed: {e}");
                }
            }
            Err(e) => log::warn!("auto-save serialization failed: {e}"),
        }
    }
}
