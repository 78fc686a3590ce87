pub mod api;
pub mod loader;

pub use api::{
    unique_drivers,
    OpenF1Client,
};
pub use loader::{
    load_race_data,
    LoaderOptions,
};
