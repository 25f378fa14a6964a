//! Background budget alert notifier
//!
//! Handlers publish [`BudgetEvent`]s into a bounded channel; a single
//! background task drains it, persists each alert (once per budget and level)
//! and logs it. Nothing is delivered outside the process.

use hearth_core::events::{BudgetEvent, EventSink, TracingSink};
use hearth_core::{Database, Error};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Capacity of the event channel
pub const EVENT_BUFFER: usize = 256;

/// Sending half of the event channel
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<BudgetEvent>,
}

impl EventSink for ChannelSink {
    fn publish(&self, event: BudgetEvent) -> hearth_core::Result<()> {
        self.tx
            .try_send(event)
            .map_err(|e| Error::Event(format!("Failed to queue budget event: {}", e)))
    }
}

/// Create a bounded event channel
pub fn channel(capacity: usize) -> (ChannelSink, mpsc::Receiver<BudgetEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelSink { tx }, rx)
}

/// Start the notifier as a background task
///
/// The task ends once every [`ChannelSink`] has been dropped.
pub fn start_notifier(db: Database, mut events: mpsc::Receiver<BudgetEvent>) -> JoinHandle<()> {
    info!("Starting budget alert notifier");

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let db = db.clone();
            let result = tokio::task::spawn_blocking(move || handle_event(&db, event)).await;

            match result {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!("Failed to record budget alert: {}", e),
                Err(e) => warn!("Budget alert task panicked: {}", e),
            }
        }
        info!("Budget alert notifier stopped");
    })
}

/// Persist and log one event; returns whether it was new
fn handle_event(db: &Database, event: BudgetEvent) -> hearth_core::Result<bool> {
    let recorded = db.record_budget_alert(&event)?.is_some();
    if recorded {
        if let Err(e) = db.log_audit(
            "notifier",
            "budget_alert",
            Some("budgets"),
            Some(event.budget_id),
            Some(&format!("level={}", event.alert_level)),
        ) {
            warn!("Failed to log budget alert to audit: {}", e);
        }
        TracingSink.publish(event)?;
    }
    Ok(recorded)
}
