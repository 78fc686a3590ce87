use std::{
    path::PathBuf,
    sync::{
        Arc,
        Mutex,
    },
};

use super::{
    reconcile::reconcile,
    types::{
        CapabilityDocument,
        CardType,
        PreferenceDocument,
    },
};
use crate::{
    core::DashboardError,
    persistence,
};

pub const PREFERENCES_FILE: &str = "user_config.json";

/// Where the preference document lives between runs.
pub trait PreferenceStorage {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<PreferenceDocument>, DashboardError>;
    fn save(&self, prefs: &PreferenceDocument) -> Result<(), DashboardError>;
}

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_app_data_dir() -> Self {
        Self::new(persistence::get_data_file_path(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl PreferenceStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<PreferenceDocument>, DashboardError> {
        persistence::load_json(&self.path)
    }

    fn save(&self, prefs: &PreferenceDocument) -> Result<(), DashboardError> {
        persistence::save_json(prefs, &self.path)
    }
}

/// In-process storage; clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<PreferenceDocument>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(prefs: PreferenceDocument) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(prefs))) }
    }

    pub fn stored(&self) -> Option<PreferenceDocument> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl PreferenceStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PreferenceDocument>, DashboardError> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|_| DashboardError::Custom("preference slot poisoned".into()))
    }

    fn save(&self, prefs: &PreferenceDocument) -> Result<(), DashboardError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| DashboardError::Custom("preference slot poisoned".into()))?;
        *slot = Some(prefs.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// The configuration both documents form together, passed explicitly to
/// whoever needs it. Every accepted change is reconciled against the current
/// capabilities and then written to storage.
pub struct ConfigContext<S: PreferenceStorage> {
    capabilities: CapabilityDocument,
    preferences: PreferenceDocument,
    storage: S,
}

impl<S: PreferenceStorage> ConfigContext<S> {
    /// Loads stored preferences and reconciles them. A missing or unreadable
    /// document is replaced by capability-derived defaults.
    pub fn load(storage: S, capabilities: CapabilityDocument) -> Self {
        let (preferences, needs_save) = match storage.load() {
            Ok(Some(stored)) => {
                let reconciled = reconcile(&stored, &capabilities);
                let changed = reconciled != stored;
                (reconciled, changed)
            }
            Ok(None) => {
                tracing::info!("no stored preferences, using defaults");
                (PreferenceDocument::defaults_for(&capabilities), true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored preferences unreadable, using defaults");
                (PreferenceDocument::defaults_for(&capabilities), true)
            }
        };

        let context = Self { capabilities, preferences, storage };
        if needs_save {
            context.persist();
        }
        context
    }

    pub fn capabilities(&self) -> &CapabilityDocument {
        &self.capabilities
    }

    pub fn preferences(&self) -> &PreferenceDocument {
        &self.preferences
    }

    /// Swaps in a freshly loaded capability document. Returns whether the
    /// preferences had to be corrected.
    pub fn apply_capabilities(&mut self, capabilities: CapabilityDocument) -> bool {
        self.capabilities = capabilities;
        let reconciled = reconcile(&self.preferences, &self.capabilities);
        if reconciled == self.preferences {
            return false;
        }
        tracing::info!("preferences corrected against new capabilities");
        self.preferences = reconciled;
        self.persist();
        true
    }

    /// Applies `mutate` to a copy of the preferences, reconciles and persists
    /// the result. Returns whether anything changed.
    pub fn update<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut PreferenceDocument),
    {
        let mut draft = self.preferences.clone();
        mutate(&mut draft);
        let reconciled = reconcile(&draft, &self.capabilities);
        if reconciled == self.preferences {
            return false;
        }
        self.preferences = reconciled;
        self.persist();
        true
    }

    /// Selects or deselects a card. The last selected card cannot be
    /// deselected and disabled cards cannot be selected.
    pub fn toggle_card(&mut self, card: CardType) -> bool {
        if self.preferences.is_selected(card) {
            if self.preferences.selected_cards.len() <= 1 {
                return false;
            }
            self.update(|prefs| prefs.selected_cards.retain(|c| *c != card))
        } else {
            if !self.capabilities.is_enabled(card) {
                return false;
            }
            self.update(|prefs| prefs.selected_cards.push(card))
        }
    }

    pub fn move_card(&mut self, card: CardType, direction: MoveDirection) -> bool {
        if !self.capabilities.features.allow_reordering {
            tracing::debug!(%card, "reordering disabled by capabilities");
            return false;
        }
        let Some(index) = self.preferences.card_order.iter().position(|c| *c == card) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.preferences.card_order.len() => index + 1,
            _ => return false,
        };
        self.update(|prefs| prefs.card_order.swap(index, target))
    }

    pub fn set_interval(&mut self, interval_ms: u64) -> bool {
        if !self.capabilities.features.allow_interval_change {
            tracing::debug!(interval_ms, "interval changes disabled by capabilities");
            return false;
        }
        self.update(|prefs| prefs.interval = interval_ms)
    }

    pub fn set_favorite_driver(&mut self, driver_number: Option<u32>) -> bool {
        self.update(|prefs| prefs.favorite_driver_number = driver_number)
    }

    pub fn set_favorite_team(&mut self, team_name: Option<String>) -> bool {
        self.update(|prefs| prefs.favorite_team = team_name)
    }

    pub fn reset(&mut self) {
        self.preferences = PreferenceDocument::defaults_for(&self.capabilities);
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.preferences) {
            tracing::warn!(error = %e, "failed to persist preferences, keeping them in memory");
        }
    }
}
