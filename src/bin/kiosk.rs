use f1_dashboard::{
    config::KioskSettings,
    core::DashboardError,
    display,
    logging,
};

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    let settings = KioskSettings::load();
    logging::init(settings.debug_logging);

    tracing::info!(server = %settings.server_url, "starting kiosk display");
    display::run_kiosk(settings).await
}
