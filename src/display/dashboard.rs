use std::{
    ops::Range,
    time::Duration,
};

use chrono::{
    DateTime,
    Utc,
};

use super::{
    catalog::{
        build_catalog,
        favorite_driver_index,
        favorite_team_index,
        total_views,
        PageCounts,
        ViewItem,
    },
    races::RaceLookup,
};
use crate::{
    config::{
        CapabilityDocument,
        CardType,
        ConfigContext,
        PreferenceStorage,
    },
    core::RaceData,
};

/// One refresh worth of race data with the lookups derived from it.
#[derive(Debug, Clone)]
pub struct RaceSnapshot {
    pub data: RaceData,
    pub lookup: RaceLookup,
}

impl RaceSnapshot {
    pub fn new(data: RaceData, now: DateTime<Utc>) -> Self {
        let lookup = RaceLookup::compute(&data.meetings, now);
        Self { data, lookup }
    }

    pub fn item_count(&self, card: CardType) -> usize {
        match card {
            CardType::Schedule => self.data.meetings.len(),
            CardType::Drivers => self.data.driver_standings.len(),
            CardType::Constructors => self.data.constructor_standings.len(),
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    pub item: ViewItem,
    pub position: usize,
    pub total_views: usize,
    pub label: String,
    /// Entries of the card's collection on this page, for paginated cards.
    pub range: Option<Range<usize>>,
    /// Standings row featured by a driver or team card.
    pub focus: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentView {
    /// No race data has arrived yet.
    Loading,
    /// Data is present but no selected card has anything to show.
    NoCards,
    Page(PageDescriptor),
}

/// Owns configuration, the latest data snapshot and the view catalog derived
/// from both. The catalog is rebuilt only when one of its inputs changes.
pub struct Dashboard<S: PreferenceStorage> {
    config: ConfigContext<S>,
    snapshot: Option<RaceSnapshot>,
    catalog: Vec<ViewItem>,
}

impl<S: PreferenceStorage> Dashboard<S> {
    pub fn new(config: ConfigContext<S>) -> Self {
        Self { config, snapshot: None, catalog: Vec::new() }
    }

    pub fn config(&self) -> &ConfigContext<S> {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&RaceSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn catalog(&self) -> &[ViewItem] {
        &self.catalog
    }

    pub fn total_views(&self) -> usize {
        total_views(&self.catalog)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.config.preferences().interval)
    }

    /// Reconciles against reloaded capabilities and rebuilds. Returns whether
    /// the number of views changed.
    pub fn apply_capabilities(&mut self, capabilities: CapabilityDocument) -> bool {
        if *self.config.capabilities() == capabilities {
            return false;
        }
        self.config.apply_capabilities(capabilities);
        self.rebuild()
    }

    pub fn update_race_data(&mut self, data: RaceData, now: DateTime<Utc>) -> bool {
        self.snapshot = Some(RaceSnapshot::new(data, now));
        self.rebuild()
    }

    /// Runs a preference mutation such as `ConfigContext::toggle_card`.
    /// Rebuilds only if the mutation was accepted.
    pub fn configure<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut ConfigContext<S>) -> bool,
    {
        if mutate(&mut self.config) {
            self.rebuild()
        } else {
            false
        }
    }

    fn rebuild(&mut self) -> bool {
        let before = self.total_views();
        self.catalog = match &self.snapshot {
            Some(snapshot) => {
                let prefs = self.config.preferences();
                let counts = PageCounts::compute(
                    &snapshot.data,
                    &snapshot.lookup,
                    &self.config.capabilities().page_sizes,
                    prefs,
                );
                build_catalog(&prefs.card_order, &prefs.selected_cards, &counts)
            }
            None => Vec::new(),
        };
        tracing::debug!(views = self.catalog.len(), "view catalog rebuilt");
        before != self.total_views()
    }

    pub fn resolve(&self, index: usize) -> CurrentView {
        let Some(snapshot) = &self.snapshot else {
            return CurrentView::Loading;
        };
        if self.catalog.is_empty() {
            return CurrentView::NoCards;
        }

        let position = if index < self.catalog.len() { index } else { 0 };
        let item = self.catalog[position];
        let capabilities = self.config.capabilities();
        let prefs = self.config.preferences();
        let focus = match item.card_type {
            CardType::DriverCard => {
                favorite_driver_index(&snapshot.data, prefs.favorite_driver_number)
            }
            CardType::TeamCard => {
                favorite_team_index(&snapshot.data, prefs.favorite_team.as_deref())
            }
            _ => None,
        };

        CurrentView::Page(PageDescriptor {
            item,
            position,
            total_views: self.catalog.len(),
            label: capabilities.label_for(item.card_type).to_string(),
            range: item.item_range(&capabilities.page_sizes, snapshot.item_count(item.card_type)),
            focus,
        })
    }
}
