use std::time::Duration;

use chrono::{
    Datelike,
    Utc,
};
use tokio::{
    sync::mpsc,
    time::MissedTickBehavior,
};

use crate::{
    core::{
        tasks::{
            CancelToken,
            TaskHandle,
        },
        DashboardError,
        RaceData,
    },
    openf1::{
        load_race_data,
        LoaderOptions,
        OpenF1Client,
    },
};

pub type RefreshResult = Result<RaceData, DashboardError>;

/// Periodically loads the current season in the background. The first load
/// starts immediately. Results are dropped instead of delivered once the
/// refresher has been cancelled.
pub struct DataRefresher {
    handle: TaskHandle,
}

impl DataRefresher {
    pub fn spawn(
        api: OpenF1Client,
        options: LoaderOptions,
        every: Duration,
        results: mpsc::Sender<RefreshResult>,
    ) -> Self {
        let token = CancelToken::new();
        let task_token = token.clone();
        let join = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(every.max(Duration::from_secs(1)));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;
                let year = Utc::now().year();
                tracing::debug!(year, "refreshing race data");
                let result = load_race_data(&api, year, &options).await;

                if task_token.is_cancelled() {
                    tracing::debug!("refresh cancelled, discarding result");
                    break;
                }
                if results.send(result).await.is_err() {
                    break;
                }
            }
        });

        Self { handle: TaskHandle::new(token, join) }
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }
}
