use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub meeting_key: u32,
    pub meeting_name: String,
    #[serde(default)]
    pub meeting_official_name: String,
    #[serde(default)]
    pub country_name: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub circuit_short_name: String,
    #[serde(default)]
    pub location: String,
    pub date_start: DateTime<Utc>,
    #[serde(default)]
    pub gmt_offset: String,
    #[serde(default)]
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStanding {
    pub driver_number: u32,
    pub position_current: u32,
    pub points_current: f64,
    #[serde(default)]
    pub meeting_key: Option<u32>,
    #[serde(default)]
    pub session_key: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub driver_number: u32,
    #[serde(default)]
    pub broadcast_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub name_acronym: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub team_colour: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub headshot_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorStanding {
    pub team_name: String,
    pub position_current: u32,
    pub points_current: f64,
    #[serde(default)]
    pub meeting_key: Option<u32>,
    #[serde(default)]
    pub session_key: Option<u32>,
    #[serde(default)]
    pub team_colour: Option<String>,
}

/// A championship row merged with the driver's details, when the drivers
/// endpoint knew about them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDriverStanding {
    #[serde(flatten)]
    pub standing: DriverStanding,
    pub driver: Option<Driver>,
}

impl EnrichedDriverStanding {
    pub fn display_name(&self) -> String {
        match &self.driver {
            Some(driver) if !driver.broadcast_name.is_empty() => driver.broadcast_name.clone(),
            Some(driver) if !driver.full_name.is_empty() => driver.full_name.clone(),
            _ => format!("#{}", self.standing.driver_number),
        }
    }

    pub fn team_name(&self) -> Option<&str> {
        self.driver.as_ref().map(|d| d.team_name.as_str()).filter(|name| !name.is_empty())
    }
}

/// Everything one refresh of the upstream API produced. Standings may be empty
/// outside the racing season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceData {
    pub meetings: Vec<Meeting>,
    pub driver_standings: Vec<EnrichedDriverStanding>,
    pub constructor_standings: Vec<ConstructorStanding>,
}
