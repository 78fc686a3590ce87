pub mod errors;
pub mod http;
pub mod models;
pub mod tasks;

pub use errors::DashboardError;
pub use models::{
    ConstructorStanding,
    Driver,
    DriverStanding,
    EnrichedDriverStanding,
    Meeting,
    RaceData,
};
