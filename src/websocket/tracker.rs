use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
        MutexGuard,
    },
};

use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;

use super::types::{
    iso_timestamp,
    ConnectionId,
};

pub const APP_NAME: &str = "f1-dashboard";

pub type SharedTracker = Arc<Mutex<ConnectionTracker>>;

/// Locks the tracker, recovering it if a holder panicked.
pub fn lock_tracker(tracker: &SharedTracker) -> MutexGuard<'_, ConnectionTracker> {
    tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub connected_at: DateTime<Utc>,
    pub last_heartbeat_at: DateTime<Utc>,
}

/// Registry of open real-time channels for the stats endpoint. Lives as long
/// as the process.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    connections: HashMap<ConnectionId, ConnectionRecord>,
    peak: usize,
    peak_time: DateTime<Utc>,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStats {
    pub current: usize,
    pub peak: usize,
    pub peak_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UptimeStats {
    pub seconds: i64,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStats {
    pub app: String,
    pub status: String,
    pub connections: ConnectionStats,
    pub uptime: UptimeStats,
    pub started_at: String,
    pub last_updated: String,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl ConnectionTracker {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { connections: HashMap::new(), peak: 0, peak_time: started_at, started_at }
    }

    pub fn add(&mut self, id: ConnectionId) {
        self.add_at(id, Utc::now());
    }

    pub fn add_at(&mut self, id: ConnectionId, now: DateTime<Utc>) {
        self.connections.insert(id, ConnectionRecord { connected_at: now, last_heartbeat_at: now });
        if self.connections.len() > self.peak {
            self.peak = self.connections.len();
            self.peak_time = now;
        }
    }

    /// Returns the record if the connection was still registered.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<ConnectionRecord> {
        self.connections.remove(id)
    }

    pub fn record_heartbeat(&mut self, id: &ConnectionId) {
        self.record_heartbeat_at(id, Utc::now());
    }

    pub fn record_heartbeat_at(&mut self, id: &ConnectionId, now: DateTime<Utc>) {
        if let Some(record) = self.connections.get_mut(id) {
            record.last_heartbeat_at = now;
        }
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&ConnectionRecord> {
        self.connections.get(id)
    }

    pub fn current(&self) -> usize {
        self.connections.len()
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> TrackerStats {
        let seconds = (now - self.started_at).num_seconds().max(0);
        TrackerStats {
            app: APP_NAME.to_string(),
            status: "operational".to_string(),
            connections: ConnectionStats {
                current: self.connections.len(),
                peak: self.peak,
                peak_time: iso_timestamp(self.peak_time),
            },
            uptime: UptimeStats { seconds, formatted: format_uptime(seconds) },
            started_at: iso_timestamp(self.started_at),
            last_updated: iso_timestamp(now),
        }
    }
}

/// "2d 3h 15m" style with zero units left out; "< 1m" under a minute.
pub fn format_uptime(seconds: i64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }

    if parts.is_empty() { "< 1m".to_string() } else { parts.join(" ") }
}
