use chrono::{
    DateTime,
    Duration,
    Utc,
};

use crate::core::Meeting;

/// Meetings carry only a start date; a race weekend is assumed to end two
/// days after it.
const WEEKEND_LENGTH_DAYS: i64 = 2;

fn weekend_end(meeting: &Meeting) -> DateTime<Utc> {
    meeting.date_start + Duration::days(WEEKEND_LENGTH_DAYS)
}

/// Indices into the meeting list for the single-page race cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceLookup {
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

impl RaceLookup {
    /// `previous` is the latest meeting whose weekend has ended, `next` the
    /// earliest one that has not started yet. Input order does not matter.
    pub fn compute(meetings: &[Meeting], now: DateTime<Utc>) -> Self {
        let previous = meetings
            .iter()
            .enumerate()
            .filter(|(_, m)| weekend_end(m) < now)
            .max_by_key(|(_, m)| m.date_start)
            .map(|(i, _)| i);

        Self { previous, next: next_race_index(meetings, now) }
    }

    pub fn previous<'a>(&self, meetings: &'a [Meeting]) -> Option<&'a Meeting> {
        self.previous.and_then(|i| meetings.get(i))
    }

    pub fn next<'a>(&self, meetings: &'a [Meeting]) -> Option<&'a Meeting> {
        self.next.and_then(|i| meetings.get(i))
    }
}

pub fn next_race_index(meetings: &[Meeting], now: DateTime<Utc>) -> Option<usize> {
    meetings
        .iter()
        .enumerate()
        .filter(|(_, m)| m.date_start > now)
        .min_by_key(|(_, m)| m.date_start)
        .map(|(i, _)| i)
}

/// True from one day before the meeting starts until its weekend ends.
pub fn is_race_weekend(meeting: &Meeting, now: DateTime<Utc>) -> bool {
    let opens = meeting.date_start - Duration::days(1);
    now >= opens && now <= weekend_end(meeting)
}

/// Matches configured round names such as "Miami GP" against meeting names
/// such as "Miami Grand Prix".
pub fn is_sprint_weekend(meeting_name: &str, sprint_rounds: &[String]) -> bool {
    let name = meeting_name.to_lowercase();
    sprint_rounds.iter().any(|round| {
        let round = round.trim();
        let round = round.strip_suffix(" GP").unwrap_or(round).trim().to_lowercase();
        !round.is_empty() && name.contains(&round)
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn meeting(key: u32, name: &str, start: DateTime<Utc>) -> Meeting {
        Meeting {
            meeting_key: key,
            meeting_name: name.to_string(),
            meeting_official_name: String::new(),
            country_name: String::new(),
            country_code: String::new(),
            circuit_short_name: String::new(),
            location: String::new(),
            date_start: start,
            gmt_offset: String::new(),
            year: 2024,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn previous_race_needs_finished_weekend() {
        let meetings =
            vec![meeting(1, "Bahrain", day(2024, 3, 2)), meeting(2, "Saudi", day(2024, 3, 9))];

        let lookup = RaceLookup::compute(&meetings, day(2024, 3, 10));
        assert_eq!(lookup.previous, Some(0));
        assert_eq!(lookup.next, None);

        let lookup = RaceLookup::compute(&meetings, day(2024, 3, 12));
        assert_eq!(lookup.previous, Some(1));
    }

    #[test]
    fn next_race_is_earliest_upcoming_regardless_of_order() {
        let meetings = vec![
            meeting(3, "Australia", day(2024, 3, 22)),
            meeting(2, "Saudi", day(2024, 3, 7)),
            meeting(1, "Bahrain", day(2024, 2, 29)),
        ];

        let lookup = RaceLookup::compute(&meetings, day(2024, 3, 1));
        assert_eq!(lookup.next, Some(1));
        assert_eq!(lookup.next(&meetings).map(|m| m.meeting_key), Some(2));
        assert_eq!(lookup.previous, None);
    }

    #[test]
    fn empty_schedule_has_no_races() {
        assert_eq!(RaceLookup::compute(&[], day(2024, 1, 1)), RaceLookup::default());
    }

    #[test]
    fn race_weekend_window() {
        let m = meeting(1, "Bahrain", day(2024, 3, 2));
        assert!(!is_race_weekend(&m, day(2024, 2, 29)));
        assert!(is_race_weekend(&m, day(2024, 3, 1)));
        assert!(is_race_weekend(&m, day(2024, 3, 4)));
        assert!(!is_race_weekend(&m, day(2024, 3, 5)));
    }

    #[test]
    fn sprint_rounds_match_meeting_names() {
        let rounds = vec!["Miami GP".to_string(), "São Paulo GP".to_string()];
        assert!(is_sprint_weekend("Miami Grand Prix", &rounds));
        assert!(is_sprint_weekend("SÃO PAULO GRAND PRIX", &rounds));
        assert!(!is_sprint_weekend("Monaco Grand Prix", &rounds));
        assert!(!is_sprint_weekend("Miami Grand Prix", &[]));
    }
}
