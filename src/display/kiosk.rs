use std::{
    future::Future,
    time::Duration,
};

use chrono::Utc;
use reqwest::Client;
use tokio::{
    sync::mpsc,
    time::{
        interval_at,
        Instant,
        MissedTickBehavior,
    },
};

use super::{
    dashboard::Dashboard,
    presenter::{
        LogPresenter,
        Presenter,
    },
    refresh::DataRefresher,
    rotation::RotationTimer,
};
use crate::{
    config::{
        fetch_capabilities,
        load_capabilities_or_default,
        CapabilityDocument,
        ConfigContext,
        JsonFileStorage,
        KioskSettings,
        PreferenceStorage,
    },
    core::{
        http::http_client,
        tasks::{
            CancelToken,
            TaskHandle,
        },
        DashboardError,
    },
    openf1::{
        LoaderOptions,
        OpenF1Client,
    },
    websocket::ChannelClient,
};

/// Runs the display until Ctrl-C, logging every page.
pub async fn run_kiosk(settings: KioskSettings) -> Result<(), DashboardError> {
    let presenter = LogPresenter::new(settings.sprint_rounds.clone());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };
    run_with(settings, JsonFileStorage::in_app_data_dir(), presenter, LoaderOptions::default(), shutdown)
        .await
}

/// Periodically re-fetches the capability document in the background. Failed
/// fetches send nothing, so the dashboard keeps the last document it applied.
fn spawn_capability_reloader(
    client: Client,
    server_url: String,
    every: Duration,
    results: mpsc::Sender<CapabilityDocument>,
) -> TaskHandle {
    let token = CancelToken::new();
    let task_token = token.clone();
    let join = tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + every, every);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticks.tick().await;
            let caps = match fetch_capabilities(&client, &server_url).await {
                Ok(caps) => caps,
                Err(e) => {
                    tracing::warn!(error = %e, "capability reload failed, keeping current document");
                    continue;
                }
            };
            if task_token.is_cancelled() || results.send(caps).await.is_err() {
                break;
            }
        }
    });
    TaskHandle::new(token, join)
}

/// The display event loop. Configuration, catalog and rotation are only
/// touched from here; fetches run in background tasks and report back over
/// channels.
pub async fn run_with<S, P, F>(
    settings: KioskSettings,
    storage: S,
    mut presenter: P,
    loader: LoaderOptions,
    shutdown: F,
) -> Result<(), DashboardError>
where
    S: PreferenceStorage,
    P: Presenter,
    F: Future<Output = ()>,
{
    let client = http_client()?;
    let capabilities = load_capabilities_or_default(&client, &settings.server_url).await;
    let mut dashboard = Dashboard::new(ConfigContext::load(storage, capabilities));

    let rotation = RotationTimer::spawn(dashboard.interval(), dashboard.total_views());
    let mut rotation_rx = rotation.subscribe();

    let (data_tx, mut data_rx) = mpsc::channel(4);
    let refresher = DataRefresher::spawn(
        OpenF1Client::new(client.clone(), settings.openf1_base_url.clone()),
        loader,
        settings.data_refresh_interval(),
        data_tx,
    );

    let (caps_tx, mut caps_rx) = mpsc::channel(4);
    let reloader = spawn_capability_reloader(
        client,
        settings.server_url.clone(),
        settings.capability_refresh_interval(),
        caps_tx,
    );

    let channel = ChannelClient::spawn(settings.channel_url());

    tracing::info!(
        server = %settings.server_url,
        interval_ms = dashboard.interval().as_millis() as u64,
        "kiosk started"
    );
    presenter.present(&dashboard.resolve(rotation.state().current_index), dashboard.snapshot());

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            changed = rotation_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *rotation_rx.borrow_and_update();
                presenter.present(&dashboard.resolve(state.current_index), dashboard.snapshot());
            }
            Some(result) = data_rx.recv() => match result {
                Ok(data) => {
                    if dashboard.update_race_data(data, Utc::now()) {
                        rotation.set_total_views(dashboard.total_views())?;
                    }
                    let index = rotation.state().current_index;
                    presenter.present(&dashboard.resolve(index), dashboard.snapshot());
                }
                Err(e) => tracing::warn!(error = %e, "race data refresh failed, keeping previous data"),
            },
            Some(capabilities) = caps_rx.recv() => {
                let interval = dashboard.interval();
                if dashboard.apply_capabilities(capabilities) {
                    rotation.set_total_views(dashboard.total_views())?;
                }
                if dashboard.interval() != interval {
                    tracing::debug!(interval_ms = dashboard.interval().as_millis() as u64, "rotation interval changed");
                    rotation.set_period(dashboard.interval())?;
                }
            }
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    rotation.stop();
    refresher.cancel();
    reloader.cancel();
    tracing::debug!(connected = channel.is_connected(), "closing real-time channel");
    Ok(())
}
