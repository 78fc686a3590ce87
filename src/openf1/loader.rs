use std::time::Duration;

use super::api::{
    unique_drivers,
    OpenF1Client,
};
use crate::core::{
    http::{
        with_retry,
        RetryPolicy,
    },
    ConstructorStanding,
    DashboardError,
    EnrichedDriverStanding,
    RaceData,
};

const FALLBACK_TEAM_COLOUR: &str = "#666666";

/// Used when the API leaves `team_colour` empty.
pub const TEAM_COLOURS: &[(&str, &str)] = &[
    ("Red Bull Racing", "#3671C6"),
    ("McLaren", "#FF8000"),
    ("Ferrari", "#E8002D"),
    ("Mercedes", "#27F4D2"),
    ("Aston Martin", "#229971"),
    ("Alpine", "#FF87BC"),
    ("Williams", "#64C4FF"),
    ("RB", "#6692FF"),
    ("Racing Bulls", "#6692FF"),
    ("Visa Cash App RB", "#6692FF"),
    ("Kick Sauber", "#52E252"),
    ("Haas F1 Team", "#B6BABD"),
    ("Haas", "#B6BABD"),
    ("Sauber", "#52E252"),
    ("AlphaTauri", "#6692FF"),
    ("Alfa Romeo", "#C92D4B"),
    ("Cadillac", "#D4AF37"),
];

pub fn team_colour(team_name: &str) -> &'static str {
    TEAM_COLOURS
        .iter()
        .find(|(name, _)| *name == team_name)
        .map(|(_, colour)| *colour)
        .unwrap_or(FALLBACK_TEAM_COLOUR)
}

#[derive(Debug, Clone, Copy)]
pub struct LoaderOptions {
    pub retry: RetryPolicy,
    /// Pause between the standings requests; the API is rate limited.
    pub pacing_delay: Duration,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { retry: RetryPolicy::default(), pacing_delay: Duration::from_millis(300) }
    }
}

/// Fetches one full snapshot. Only a meetings failure is an error; standings
/// that cannot be fetched (off-season, rate limiting) come back empty.
pub async fn load_race_data(
    api: &OpenF1Client,
    year: i32,
    options: &LoaderOptions,
) -> Result<RaceData, DashboardError> {
    let mut meetings = with_retry(options.retry, || api.meetings(year)).await?;
    meetings.sort_by_key(|meeting| meeting.date_start);

    let (driver_standings, constructor_standings) = match load_standings(api, options).await {
        Ok(standings) => standings,
        Err(e) => {
            tracing::warn!(error = %e, "standings unavailable (possibly off-season)");
            (Vec::new(), Vec::new())
        }
    };

    tracing::info!(
        meetings = meetings.len(),
        drivers = driver_standings.len(),
        constructors = constructor_standings.len(),
        "race data loaded"
    );

    Ok(RaceData { meetings, driver_standings, constructor_standings })
}

async fn load_standings(
    api: &OpenF1Client,
    options: &LoaderOptions,
) -> Result<(Vec<EnrichedDriverStanding>, Vec<ConstructorStanding>), DashboardError> {
    tokio::time::sleep(options.pacing_delay).await;
    let driver_standings = with_retry(options.retry, || api.driver_standings()).await?;

    tokio::time::sleep(options.pacing_delay).await;
    let constructor_standings = with_retry(options.retry, || api.constructor_standings()).await?;

    tokio::time::sleep(options.pacing_delay).await;
    let drivers = unique_drivers(with_retry(options.retry, || api.drivers()).await?);

    let mut enriched: Vec<EnrichedDriverStanding> = driver_standings
        .into_iter()
        .map(|standing| {
            let driver = drivers.iter().find(|d| d.driver_number == standing.driver_number).cloned();
            EnrichedDriverStanding { standing, driver }
        })
        .collect();
    enriched.sort_by_key(|row| row.standing.position_current);

    let mut constructors: Vec<ConstructorStanding> = constructor_standings
        .into_iter()
        .map(|mut standing| {
            if standing.team_colour.as_deref().map_or(true, str::is_empty) {
                standing.team_colour = Some(team_colour(&standing.team_name).to_string());
            }
            standing
        })
        .collect();
    constructors.sort_by_key(|row| row.position_current);

    Ok((enriched, constructors))
}

#[cfg(test)]
mod tests {
    use axum::{
        http::StatusCode,
        routing::get,
        Json,
        Router,
    };
    use serde_json::json;

    use super::*;
    use crate::core::http::http_client;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn fast_options() -> LoaderOptions {
        LoaderOptions { retry: RetryPolicy::none(), pacing_delay: Duration::ZERO }
    }

    fn meetings_json() -> serde_json::Value {
        json!([
            { "meeting_key": 2, "meeting_name": "Saudi Arabian Grand Prix", "date_start": "2024-03-07T13:30:00+00:00" },
            { "meeting_key": 1, "meeting_name": "Bahrain Grand Prix", "date_start": "2024-02-29T11:30:00+00:00" }
        ])
    }

    #[tokio::test]
    async fn standings_are_enriched_and_sorted() {
        let router = Router::new()
            .route("/meetings", get(|| async { Json(meetings_json()) }))
            .route(
                "/championship_drivers",
                get(|| async {
                    Json(json!([
                        { "driver_number": 16, "position_current": 2, "points_current": 18.0 },
                        { "driver_number": 1, "position_current": 1, "points_current": 26.0 }
                    ]))
                }),
            )
            .route(
                "/championship_teams",
                get(|| async {
                    Json(json!([
                        { "team_name": "Ferrari", "position_current": 2, "points_current": 18.0 },
                        { "team_name": "Red Bull Racing", "position_current": 1, "points_current": 44.0, "team_colour": "#123456" }
                    ]))
                }),
            )
            .route(
                "/drivers",
                get(|| async {
                    Json(json!([
                        { "driver_number": 1, "broadcast_name": "M VERSTAPPEN", "team_name": "Red Bull Racing" },
                        { "driver_number": 16, "broadcast_name": "C LECLERC", "team_name": "Ferrari" }
                    ]))
                }),
            );
        let base = serve(router).await;
        let api = OpenF1Client::new(http_client().unwrap(), base);

        let data = load_race_data(&api, 2024, &fast_options()).await.unwrap();

        assert_eq!(data.meetings[0].meeting_key, 1);
        assert_eq!(data.driver_standings[0].display_name(), "M VERSTAPPEN");
        assert_eq!(data.driver_standings[1].team_name(), Some("Ferrari"));
        assert_eq!(data.constructor_standings[0].team_colour.as_deref(), Some("#123456"));
        assert_eq!(data.constructor_standings[1].team_colour.as_deref(), Some("#E8002D"));
    }

    #[tokio::test]
    async fn missing_standings_mean_empty_collections() {
        let router = Router::new()
            .route("/meetings", get(|| async { Json(meetings_json()) }))
            .route("/championship_drivers", get(|| async { StatusCode::NOT_FOUND }));
        let base = serve(router).await;
        let api = OpenF1Client::new(http_client().unwrap(), base);

        let data = load_race_data(&api, 2024, &fast_options()).await.unwrap();
        assert_eq!(data.meetings.len(), 2);
        assert!(data.driver_standings.is_empty());
        assert!(data.constructor_standings.is_empty());
    }

    #[tokio::test]
    async fn meetings_failure_is_an_error() {
        let router = Router::new().route("/meetings", get(|| async { StatusCode::TOO_MANY_REQUESTS }));
        let base = serve(router).await;
        let api = OpenF1Client::new(http_client().unwrap(), base);

        let result = load_race_data(&api, 2024, &fast_options()).await;
        assert!(matches!(result, Err(DashboardError::HttpStatus { status: 429, .. })));
    }

    #[test]
    fn unknown_teams_get_fallback_colour() {
        assert_eq!(team_colour("McLaren"), "#FF8000");
        assert_eq!(team_colour("Brawn GP"), "#666666");
    }
}
