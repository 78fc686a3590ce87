use super::types::{
    CapabilityDocument,
    CardType,
    PreferenceDocument,
};

/// Brings a preference document back in line with the capability document.
///
/// Selections and order entries for cards that are no longer enabled are
/// dropped, newly enabled cards are appended to the order, an empty selection
/// falls back to every enabled card and the interval is clamped into the
/// operator's range. Favorites are left alone; they are checked against the
/// standings when a page is built.
///
/// The function is total and idempotent.
pub fn reconcile(prefs: &PreferenceDocument, caps: &CapabilityDocument) -> PreferenceDocument {
    let enabled = caps.enabled_cards();

    let mut selected_cards = retain_enabled(&prefs.selected_cards, &enabled);
    if selected_cards.is_empty() {
        selected_cards = enabled.clone();
    }

    let mut card_order = retain_enabled(&prefs.card_order, &enabled);
    for card in &enabled {
        if !card_order.contains(card) {
            card_order.push(*card);
        }
    }

    PreferenceDocument {
        selected_cards,
        card_order,
        interval: caps.interval_range.clamp(prefs.interval),
        favorite_driver_number: prefs.favorite_driver_number,
        favorite_team: prefs.favorite_team.clone(),
    }
}

fn retain_enabled(cards: &[CardType], enabled: &[CardType]) -> Vec<CardType> {
    let mut kept: Vec<CardType> = Vec::with_capacity(cards.len());
    for card in cards {
        if enabled.contains(card) && !kept.contains(card) {
            kept.push(*card);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{
        CardConfig,
        IntervalRange,
    };

    fn caps_with(enabled: &[CardType]) -> CapabilityDocument {
        CapabilityDocument {
            available_cards: CardType::ALL
                .iter()
                .map(|card| CardConfig::new(*card, enabled.contains(card)))
                .collect(),
            ..CapabilityDocument::default()
        }
    }

    fn prefs(selected: &[CardType], order: &[CardType], interval: u64) -> PreferenceDocument {
        PreferenceDocument {
            selected_cards: selected.to_vec(),
            card_order: order.to_vec(),
            interval,
            favorite_driver_number: Some(1),
            favorite_team: Some("McLaren".into()),
        }
    }

    #[test]
    fn disabled_cards_are_dropped_from_selection() {
        let caps = caps_with(&[CardType::Schedule]);
        let stored = prefs(
            &[CardType::Drivers, CardType::Schedule],
            &[CardType::Drivers, CardType::Schedule],
            10_000,
        );

        let reconciled = reconcile(&stored, &caps);
        assert_eq!(reconciled.selected_cards, vec![CardType::Schedule]);
        assert_eq!(reconciled.card_order, vec![CardType::Schedule]);
    }

    #[test]
    fn empty_selection_falls_back_to_enabled_cards() {
        let caps = caps_with(&[CardType::Constructors, CardType::Schedule]);
        let stored = prefs(&[CardType::Drivers], &[], 10_000);

        let reconciled = reconcile(&stored, &caps);
        // Declared order from the capability document, not the enabled slice above.
        assert_eq!(reconciled.selected_cards, vec![CardType::Schedule, CardType::Constructors]);
    }

    #[test]
    fn newly_enabled_cards_are_appended_to_order() {
        let caps = caps_with(&[CardType::Schedule, CardType::Drivers, CardType::TeamCard]);
        let stored = prefs(&[CardType::Drivers], &[CardType::Drivers], 10_000);

        let reconciled = reconcile(&stored, &caps);
        assert_eq!(
            reconciled.card_order,
            vec![CardType::Drivers, CardType::Schedule, CardType::TeamCard]
        );
        assert_eq!(reconciled.selected_cards, vec![CardType::Drivers]);
    }

    #[test]
    fn interval_is_clamped_into_range() {
        let caps = CapabilityDocument {
            interval_range: IntervalRange { min: 5_000, max: 60_000, default: 10_000 },
            ..CapabilityDocument::default()
        };

        assert_eq!(reconcile(&prefs(&[], &[], 2_000), &caps).interval, 5_000);
        assert_eq!(reconcile(&prefs(&[], &[], 90_000), &caps).interval, 60_000);
        assert_eq!(reconcile(&prefs(&[], &[], 15_000), &caps).interval, 15_000);
    }

    #[test]
    fn favorites_pass_through() {
        let caps = caps_with(&[CardType::Schedule]);
        let reconciled = reconcile(&prefs(&[], &[], 0), &caps);
        assert_eq!(reconciled.favorite_driver_number, Some(1));
        assert_eq!(reconciled.favorite_team.as_deref(), Some("McLaren"));
    }

    #[test]
    fn duplicates_are_collapsed() {
        let caps = caps_with(&CardType::ALL);
        let stored = prefs(
            &[CardType::Drivers, CardType::Drivers],
            &[CardType::NextRace, CardType::NextRace],
            10_000,
        );

        let reconciled = reconcile(&stored, &caps);
        assert_eq!(reconciled.selected_cards, vec![CardType::Drivers]);
        assert_eq!(reconciled.card_order.len(), CardType::ALL.len());
        assert_eq!(reconciled.card_order[0], CardType::NextRace);
    }

    #[test]
    fn no_enabled_cards_yields_empty_selection() {
        let caps = caps_with(&[]);
        let reconciled = reconcile(&prefs(&[CardType::Schedule], &[CardType::Schedule], 0), &caps);
        assert!(reconciled.selected_cards.is_empty());
        assert!(reconciled.card_order.is_empty());
    }

    #[test]
    fn reconcile_is_idempotent_and_selection_stays_enabled() {
        let enabled_sets: [&[CardType]; 4] = [
            &CardType::ALL,
            &[CardType::Schedule],
            &[CardType::TeamCard, CardType::Drivers],
            &[CardType::NextRace, CardType::PreviousRace, CardType::Constructors],
        ];
        let stored_docs = [
            prefs(&[], &[], 0),
            prefs(&CardType::ALL, &CardType::ALL, u64::MAX),
            prefs(&[CardType::Drivers, CardType::Schedule], &[CardType::TeamCard], 7_500),
            prefs(&[CardType::DriverCard, CardType::DriverCard], &[CardType::Schedule], 1),
        ];

        for enabled in enabled_sets {
            let caps = caps_with(enabled);
            for stored in &stored_docs {
                let once = reconcile(stored, &caps);
                let twice = reconcile(&once, &caps);
                assert_eq!(once, twice);

                assert!(!once.selected_cards.is_empty());
                assert!(once.selected_cards.iter().all(|card| caps.is_enabled(*card)));
                assert!(enabled.iter().all(|card| once.card_order.contains(card)));
                assert!(once.selected_cards.iter().all(|card| once.card_order.contains(card)));
            }
        }
    }
}
