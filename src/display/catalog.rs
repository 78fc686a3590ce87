use std::{
    collections::HashMap,
    ops::Range,
};

use super::races::RaceLookup;
use crate::{
    config::{
        CardType,
        PageSizes,
        PreferenceDocument,
    },
    core::RaceData,
};

/// One displayable page of one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewItem {
    pub card_type: CardType,
    pub page_index: usize,
}

impl ViewItem {
    /// Slice of the card's collection shown on this page. `None` for
    /// single-page cards.
    pub fn item_range(&self, page_sizes: &PageSizes, item_count: usize) -> Option<Range<usize>> {
        let size = page_sizes.for_card(self.card_type)?.max(1);
        let start = (self.page_index * size).min(item_count);
        let end = (start + size).min(item_count);
        Some(start..end)
    }
}

/// Number of pages a collection of `item_count` entries needs.
pub fn page_count(item_count: usize, page_size: usize) -> usize {
    item_count.div_ceil(page_size.max(1))
}

/// Page count per card type, derived from one data snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCounts(HashMap<CardType, usize>);

impl PageCounts {
    pub fn compute(
        data: &RaceData,
        lookup: &RaceLookup,
        page_sizes: &PageSizes,
        prefs: &PreferenceDocument,
    ) -> Self {
        let mut counts = HashMap::new();
        counts.insert(CardType::Schedule, page_count(data.meetings.len(), page_sizes.schedule));
        counts.insert(
            CardType::Drivers,
            page_count(data.driver_standings.len(), page_sizes.drivers),
        );
        counts.insert(
            CardType::Constructors,
            page_count(data.constructor_standings.len(), page_sizes.constructors),
        );
        counts.insert(CardType::PreviousRace, usize::from(lookup.previous.is_some()));
        counts.insert(CardType::NextRace, usize::from(lookup.next.is_some()));
        counts.insert(
            CardType::DriverCard,
            usize::from(favorite_driver_index(data, prefs.favorite_driver_number).is_some()),
        );
        counts.insert(
            CardType::TeamCard,
            usize::from(favorite_team_index(data, prefs.favorite_team.as_deref()).is_some()),
        );
        Self(counts)
    }

    pub fn get(&self, card: CardType) -> usize {
        self.0.get(&card).copied().unwrap_or(0)
    }
}

impl FromIterator<(CardType, usize)> for PageCounts {
    fn from_iter<I: IntoIterator<Item = (CardType, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Standing of the favorite driver, or the championship leader when no
/// favorite is set.
pub fn favorite_driver_index(data: &RaceData, favorite: Option<u32>) -> Option<usize> {
    match favorite {
        Some(number) => {
            data.driver_standings.iter().position(|row| row.standing.driver_number == number)
        }
        None if data.driver_standings.is_empty() => None,
        None => Some(0),
    }
}

pub fn favorite_team_index(data: &RaceData, favorite: Option<&str>) -> Option<usize> {
    match favorite {
        Some(team) => data.constructor_standings.iter().position(|row| row.team_name == team),
        None if data.constructor_standings.is_empty() => None,
        None => Some(0),
    }
}

/// Expands the selected cards, in the user's order, into pages. Cards listed
/// more than once are only expanded the first time.
pub fn build_catalog(
    card_order: &[CardType],
    selected_cards: &[CardType],
    counts: &PageCounts,
) -> Vec<ViewItem> {
    let mut seen = Vec::new();
    let mut items = Vec::new();

    for card in card_order.iter().copied() {
        if !selected_cards.contains(&card) || seen.contains(&card) {
            continue;
        }
        seen.push(card);
        items.extend((0..counts.get(card)).map(|page_index| ViewItem { card_type: card, page_index }));
    }

    items
}

pub fn total_views(catalog: &[ViewItem]) -> usize {
    catalog.len().max(1)
}
