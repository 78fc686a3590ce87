use std::{
    sync::Arc,
    time::Duration,
};

use futures_util::{
    SinkExt,
    StreamExt,
};
use tokio::{
    net::TcpStream,
    sync::{
        watch,
        Notify,
    },
    time::{
        interval_at,
        Instant,
    },
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::Message,
    MaybeTlsStream,
    WebSocketStream,
};

use super::types::{
    ClientMessage,
    ServerMessage,
};
use crate::core::{
    tasks::{
        CancelToken,
        TaskHandle,
    },
    DashboardError,
};

pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Reconnect delays: starts at `initial`, doubles after every failure, never
/// exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30))
    }
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max, current: initial.min(max) }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial.min(self.max);
    }
}

/// Keeps a real-time channel to the dashboard server open. Failures are
/// logged and retried; they never reach the display.
pub struct ChannelClient {
    wake: Arc<Notify>,
    connected: watch::Receiver<bool>,
    _handle: TaskHandle,
}

impl ChannelClient {
    pub fn spawn(url: impl Into<String>) -> Self {
        Self::spawn_with(url, Backoff::default(), PING_INTERVAL)
    }

    pub fn spawn_with(url: impl Into<String>, backoff: Backoff, ping_interval: Duration) -> Self {
        let url = url.into();
        let wake = Arc::new(Notify::new());
        let (connected_tx, connected) = watch::channel(false);
        let token = CancelToken::new();

        let join = tokio::spawn(run_channel(
            url,
            backoff,
            ping_interval,
            wake.clone(),
            connected_tx,
            token.clone(),
        ));

        Self { wake, connected, _handle: TaskHandle::new(token, join) }
    }

    /// Skips the pending backoff delay, e.g. when the display comes back to
    /// the foreground.
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }
}

async fn run_channel(
    url: String,
    mut backoff: Backoff,
    ping_interval: Duration,
    wake: Arc<Notify>,
    connected: watch::Sender<bool>,
    token: CancelToken,
) {
    while !token.is_cancelled() {
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                tracing::info!(url = %url, "real-time channel connected");
                backoff.reset();
                connected.send_replace(true);
                if let Err(e) = run_session(stream, ping_interval).await {
                    tracing::debug!(error = %e, "real-time channel dropped");
                }
                connected.send_replace(false);
            }
            Err(e) => tracing::debug!(url = %url, error = %e, "real-time channel unavailable"),
        }

        let delay = backoff.next_delay();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "reconnecting later");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = wake.notified() => tracing::debug!("woken, reconnecting now"),
        }
    }
}

async fn run_session(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ping_interval: Duration,
) -> Result<(), DashboardError> {
    let (mut write, mut read) = stream.split();
    let ping = serde_json::to_string(&ClientMessage::Ping)?;
    let mut ticks = interval_at(Instant::now() + ping_interval, ping_interval);

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                write.send(Message::text(ping.clone())).await?;
            }
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerMessage>(text.as_str()) {
                    Ok(ServerMessage::Connected { message, .. }) => tracing::info!("{message}"),
                    Ok(ServerMessage::Pong { timestamp }) => tracing::debug!(%timestamp, "pong"),
                    Err(e) => tracing::debug!(error = %e, "ignoring server message"),
                },
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(_)) => {}
            },
        }
    }
}
