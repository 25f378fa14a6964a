//! Outbound budget events
//!
//! The engine never sends notifications itself. Callers classify budgets with
//! the tracker, turn the snapshots into [`BudgetEvent`]s and hand them to an
//! [`EventSink`] (a channel in the server, a log line in the CLI).

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analytics::{AlertLevel, TrackingSnapshot};
use crate::error::{Error, Result};
use crate::models::YearMonth;

/// Lowest alert level that produces an event
pub const MIN_EVENT_LEVEL: AlertLevel = AlertLevel::Warning;

/// A budget crossed an alert threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEvent {
    pub family_id: i64,
    pub budget_id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub period: YearMonth,
    pub alert_level: AlertLevel,
    pub utilization_rate: f64,
    pub message: String,
}

impl BudgetEvent {
    /// Event for a snapshot at or above [`MIN_EVENT_LEVEL`]
    pub fn from_snapshot(family_id: i64, snapshot: &TrackingSnapshot) -> Option<Self> {
        if snapshot.alert.level < MIN_EVENT_LEVEL {
            return None;
        }

        Some(Self {
            family_id,
            budget_id: snapshot.budget_id,
            category_id: snapshot.category_id,
            category_name: snapshot.category_name.clone(),
            period: snapshot.period,
            alert_level: snapshot.alert.level,
            utilization_rate: snapshot.utilization_rate,
            message: snapshot.alert.message.clone(),
        })
    }
}

/// Destination for budget events
pub trait EventSink: Send + Sync {
    fn publish(&self, event: BudgetEvent) -> Result<()>;
}

/// Writes events to the log
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: BudgetEvent) -> Result<()> {
        if event.alert_level.is_critical() {
            warn!(
                family_id = event.family_id,
                budget_id = event.budget_id,
                category = %event.category_name,
                period = %event.period,
                level = %event.alert_level,
                "{}",
                event.message
            );
        } else {
            info!(
                family_id = event.family_id,
                budget_id = event.budget_id,
                category = %event.category_name,
                period = %event.period,
                level = %event.alert_level,
                "{}",
                event.message
            );
        }
        Ok(())
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<BudgetEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<BudgetEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventSink for CollectingSink {
    fn publish(&self, event: BudgetEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| Error::Event("event buffer poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}

/// Publish an event for every snapshot at or above [`MIN_EVENT_LEVEL`]
///
/// Returns the number of events published.
pub fn publish_alerts(
    sink: &dyn EventSink,
    family_id: i64,
    snapshots: &[TrackingSnapshot],
) -> Result<usize> {
    let mut published = 0;
    for event in snapshots
        .iter()
        .filter_map(|s| BudgetEvent::from_snapshot(family_id, s))
    {
        sink.publish(event)?;
        published += 1;
    }
    Ok(published)
}
