use std::collections::HashMap;

use reqwest::Client;

use crate::core::{
    http,
    ConstructorStanding,
    DashboardError,
    Driver,
    DriverStanding,
    Meeting,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1";

/// Thin wrapper over the public OpenF1 REST API.
#[derive(Debug, Clone)]
pub struct OpenF1Client {
    client: Client,
    base_url: String,
}

impl OpenF1Client {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn meetings(&self, year: i32) -> Result<Vec<Meeting>, DashboardError> {
        self.get(&format!("meetings?year={year}")).await
    }

    pub async fn driver_standings(&self) -> Result<Vec<DriverStanding>, DashboardError> {
        self.get("championship_drivers?session_key=latest").await
    }

    pub async fn constructor_standings(&self) -> Result<Vec<ConstructorStanding>, DashboardError> {
        self.get("championship_teams?session_key=latest").await
    }

    pub async fn drivers(&self) -> Result<Vec<Driver>, DashboardError> {
        self.get("drivers?session_key=latest").await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        let url = format!("{}/{}", self.base_url, path);
        http::get_json(&self.client, &url).await
    }
}

/// The drivers endpoint repeats drivers across sessions. Keeps one entry per
/// number, preferring one that carries a headshot.
pub fn unique_drivers(drivers: Vec<Driver>) -> Vec<Driver> {
    let mut order: Vec<u32> = Vec::new();
    let mut by_number: HashMap<u32, Driver> = HashMap::new();

    for driver in drivers {
        let number = driver.driver_number;
        match by_number.get(&number) {
            None => {
                order.push(number);
                by_number.insert(number, driver);
            }
            Some(_) if driver.headshot_url.as_deref().is_some_and(|url| !url.is_empty()) => {
                by_number.insert(number, driver);
            }
            Some(_) => {}
        }
    }

    order.into_iter().filter_map(|number| by_number.remove(&number)).collect()
}
