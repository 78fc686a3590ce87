use std::time::Duration;

use tokio::{
    sync::{
        mpsc,
        watch,
    },
    task::JoinHandle,
    time::{
        interval_at,
        Instant,
        Interval,
        MissedTickBehavior,
    },
};

use crate::core::DashboardError;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Position in the view catalog. `current_index` is always below
/// `total_views`, which is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationState {
    pub current_index: usize,
    pub total_views: usize,
}

impl RotationState {
    pub fn new(total_views: usize) -> Self {
        Self { current_index: 0, total_views: total_views.max(1) }
    }

    pub fn advance(&mut self) {
        self.current_index = if self.current_index >= self.total_views {
            0
        } else {
            (self.current_index + 1) % self.total_views
        };
    }

    /// Adopts a new catalog length. Returns whether the state changed.
    pub fn resize(&mut self, total_views: usize) -> bool {
        let before = *self;
        self.total_views = total_views.max(1);
        if self.current_index >= self.total_views {
            self.current_index = 0;
        }
        *self != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationCommand {
    SetTotalViews(usize),
    SetPeriod(Duration),
    Stop,
}

/// Background ticker that owns the rotation state. Readers observe it through
/// a `watch` channel; changes go in as commands. The task is aborted when the
/// timer is dropped.
pub struct RotationTimer {
    commands: mpsc::UnboundedSender<RotationCommand>,
    state: watch::Receiver<RotationState>,
    task: JoinHandle<()>,
}

impl RotationTimer {
    pub fn spawn(period: Duration, total_views: usize) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(RotationState::new(total_views));
        let task = tokio::spawn(run_timer(period, state_tx, command_rx));
        Self { commands, state, task }
    }

    pub fn state(&self) -> RotationState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RotationState> {
        self.state.clone()
    }

    pub fn set_total_views(&self, total_views: usize) -> Result<(), DashboardError> {
        self.send(RotationCommand::SetTotalViews(total_views))
    }

    /// Restarts the ticker with a new period; the next tick is one full
    /// period away.
    pub fn set_period(&self, period: Duration) -> Result<(), DashboardError> {
        self.send(RotationCommand::SetPeriod(period))
    }

    pub fn stop(&self) {
        let _ = self.commands.send(RotationCommand::Stop);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    fn send(&self, command: RotationCommand) -> Result<(), DashboardError> {
        self.commands.send(command)?;
        Ok(())
    }
}

impl Drop for RotationTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn ticker(period: Duration) -> Interval {
    let period = period.max(MIN_PERIOD);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run_timer(
    period: Duration,
    state_tx: watch::Sender<RotationState>,
    mut commands: mpsc::UnboundedReceiver<RotationCommand>,
) {
    let mut state = *state_tx.borrow();
    let mut ticks = ticker(period);
    tracing::debug!(period_ms = period.as_millis() as u64, "rotation started");

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                state.advance();
                state_tx.send_replace(state);
            }
            command = commands.recv() => match command {
                Some(RotationCommand::SetTotalViews(total)) => {
                    if state.resize(total) {
                        state_tx.send_replace(state);
                    }
                }
                Some(RotationCommand::SetPeriod(period)) => {
                    tracing::debug!(period_ms = period.as_millis() as u64, "rotation restarted");
                    ticks = ticker(period);
                }
                Some(RotationCommand::Stop) | None => break,
            },
        }
    }

    tracing::debug!("rotation stopped");
}
