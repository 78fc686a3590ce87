use f1_dashboard::{
    core::DashboardError,
    logging,
    server::{
        self,
        ServerConfig,
    },
};

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    let config = ServerConfig::from_env();
    logging::init(config.debug);

    tracing::info!(
        port = config.port,
        mode = ?config.mode,
        config = %config.config_path.display(),
        "starting dashboard server"
    );

    if let Err(e) = server::run(config).await {
        tracing::error!(error = %e, "server failed");
        return Err(e);
    }
    Ok(())
}
