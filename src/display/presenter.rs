use chrono::Utc;

use super::{
    dashboard::{
        CurrentView,
        PageDescriptor,
        RaceSnapshot,
    },
    races::{
        is_race_weekend,
        is_sprint_weekend,
    },
};
use crate::config::CardType;

/// Rendering seam. Implementations receive every page the rotation lands on.
pub trait Presenter {
    fn present(&mut self, view: &CurrentView, snapshot: Option<&RaceSnapshot>);
}

/// Writes one structured log line per page.
#[derive(Debug, Clone, Default)]
pub struct LogPresenter {
    sprint_rounds: Vec<String>,
}

impl LogPresenter {
    pub fn new(sprint_rounds: Vec<String>) -> Self {
        Self { sprint_rounds }
    }

    /// Short, human readable summary of what the page shows.
    pub fn summarize(&self, page: &PageDescriptor, snapshot: &RaceSnapshot) -> String {
        let data = &snapshot.data;
        let range = page.range.clone().unwrap_or(0..0);

        match page.item.card_type {
            CardType::Schedule => data
                .meetings
                .get(range.clone())
                .unwrap_or_default()
                .iter()
                .map(|m| {
                    let mut name = m.meeting_name.clone();
                    if is_sprint_weekend(&m.meeting_name, &self.sprint_rounds) {
                        name.push_str(" (sprint)");
                    }
                    if is_race_weekend(m, Utc::now()) {
                        name.push_str(" (live)");
                    }
                    name
                })
                .collect::<Vec<_>>()
                .join(", "),
            CardType::Drivers => data
                .driver_standings
                .get(range.clone())
                .unwrap_or_default()
                .iter()
                .map(|row| format!("P{} {}", row.standing.position_current, row.display_name()))
                .collect::<Vec<_>>()
                .join(", "),
            CardType::Constructors => data
                .constructor_standings
                .get(range.clone())
                .unwrap_or_default()
                .iter()
                .map(|row| format!("P{} {}", row.position_current, row.team_name))
                .collect::<Vec<_>>()
                .join(", "),
            CardType::PreviousRace => snapshot
                .lookup
                .previous(&data.meetings)
                .map(|m| m.meeting_name.clone())
                .unwrap_or_default(),
            CardType::NextRace => snapshot
                .lookup
                .next(&data.meetings)
                .map(|m| format!("{} on {}", m.meeting_name, m.date_start.format("%Y-%m-%d")))
                .unwrap_or_default(),
            CardType::DriverCard => page
                .focus
                .and_then(|i| data.driver_standings.get(i))
                .map(|row| format!("{} ({} pts)", row.display_name(), row.standing.points_current))
                .unwrap_or_default(),
            CardType::TeamCard => page
                .focus
                .and_then(|i| data.constructor_standings.get(i))
                .map(|row| format!("{} ({} pts)", row.team_name, row.points_current))
                .unwrap_or_default(),
        }
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, view: &CurrentView, snapshot: Option<&RaceSnapshot>) {
        match (view, snapshot) {
            (CurrentView::Loading, _) => tracing::info!("loading race data"),
            (CurrentView::NoCards, _) => tracing::info!("no cards selected"),
            (CurrentView::Page(page), Some(snapshot)) => {
                tracing::info!(
                    card = %page.item.card_type,
                    page = page.item.page_index + 1,
                    view = page.position + 1,
                    of = page.total_views,
                    "{}: {}",
                    page.label,
                    self.summarize(page, snapshot)
                );
            }
            (CurrentView::Page(page), None) => {
                tracing::debug!(card = %page.item.card_type, "page without data")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        core::{
            ConstructorStanding,
            Meeting,
            RaceData,
        },
        display::catalog::ViewItem,
    };

    fn snapshot() -> RaceSnapshot {
        let meeting = |key: u32, name: &str, day: u32| Meeting {
            meeting_key: key,
            meeting_name: name.to_string(),
            meeting_official_name: String::new(),
            country_name: String::new(),
            country_code: String::new(),
            circuit_short_name: String::new(),
            location: String::new(),
            date_start: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            gmt_offset: String::new(),
            year: 2024,
        };
        let data = RaceData {
            meetings: vec![meeting(1, "Miami Grand Prix", 3), meeting(2, "Emilia Romagna Grand Prix", 17)],
            driver_standings: Vec::new(),
            constructor_standings: vec![ConstructorStanding {
                team_name: "Ferrari".into(),
                position_current: 1,
                points_current: 100.0,
                meeting_key: None,
                session_key: None,
                team_colour: None,
            }],
        };
        RaceSnapshot::new(data, Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap())
    }

    fn page(card_type: CardType, range: Option<std::ops::Range<usize>>) -> PageDescriptor {
        focused(card_type, range, None)
    }

    fn focused(
        card_type: CardType,
        range: Option<std::ops::Range<usize>>,
        focus: Option<usize>,
    ) -> PageDescriptor {
        PageDescriptor {
            item: ViewItem { card_type, page_index: 0 },
            position: 0,
            total_views: 1,
            label: card_type.default_label().to_string(),
            range,
            focus,
        }
    }

    #[test]
    fn schedule_marks_sprint_weekends() {
        let presenter = LogPresenter::new(vec!["Miami GP".into()]);
        let summary = presenter.summarize(&page(CardType::Schedule, Some(0..2)), &snapshot());
        assert_eq!(summary, "Miami Grand Prix (sprint), Emilia Romagna Grand Prix");
    }

    #[test]
    fn race_cards_use_lookup() {
        let presenter = LogPresenter::default();
        let snapshot = snapshot();
        assert_eq!(
            presenter.summarize(&page(CardType::PreviousRace, None), &snapshot),
            "Miami Grand Prix"
        );
        assert_eq!(
            presenter.summarize(&page(CardType::NextRace, None), &snapshot),
            "Emilia Romagna Grand Prix on 2024-05-17"
        );
        assert_eq!(
            presenter.summarize(&focused(CardType::TeamCard, None, Some(0)), &snapshot),
            "Ferrari (100 pts)"
        );
    }

    #[test]
    fn focus_outside_standings_is_blank() {
        let presenter = LogPresenter::default();
        let snapshot = snapshot();
        assert_eq!(presenter.summarize(&focused(CardType::TeamCard, None, Some(5)), &snapshot), "");
        assert_eq!(presenter.summarize(&focused(CardType::DriverCard, None, Some(0)), &snapshot), "");
    }
}
