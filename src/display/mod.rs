pub mod catalog;
pub mod dashboard;
pub mod kiosk;
pub mod presenter;
pub mod races;
pub mod refresh;
pub mod rotation;

pub use catalog::{
    build_catalog,
    page_count,
    PageCounts,
    ViewItem,
};
pub use dashboard::{
    CurrentView,
    Dashboard,
    PageDescriptor,
    RaceSnapshot,
};
pub use kiosk::run_kiosk;
pub use presenter::{
    LogPresenter,
    Presenter,
};
pub use races::RaceLookup;
pub use refresh::DataRefresher;
pub use rotation::{
    RotationState,
    RotationTimer,
};
