pub mod capabilities;
pub mod kiosk;
pub mod preferences;
pub mod reconcile;
pub mod types;

pub use capabilities::{
    fetch_capabilities,
    load_capabilities_or_default,
    CapabilityFile,
};
pub use kiosk::KioskSettings;
pub use preferences::{
    ConfigContext,
    JsonFileStorage,
    MemoryStorage,
    MoveDirection,
    PreferenceStorage,
};
pub use reconcile::reconcile;
pub use types::{
    CapabilityDocument,
    CardConfig,
    CardType,
    Features,
    IntervalRange,
    PageSizes,
    PreferenceDocument,
};
