//! Tokio-driven urgent-alert poller.
//!
//! The engine holds no loop of its own; hosts that want a push feed spawn this
//! poller, which recomputes the urgent list at a fixed interval and hands it to
//! an [`AlertSink`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::core::{Alert, EquipmentStore, MaintenanceEngine, ServiceHistory};

/// Destination for polled alerts.
#[async_trait]
pub trait AlertSink: Send + Sync + 'static {
    /// Receive the current urgent alert list.
    async fn publish(&self, alerts: Vec<Alert>);
}

#[async_trait]
impl AlertSink for mpsc::Sender<Vec<Alert>> {
    async fn publish(&self, alerts: Vec<Alert>) {
        if self.send(alerts).await.is_err() {
            tracing::debug!("alert receiver dropped");
        }
    }
}

/// Handle to a running poller.
pub struct AlertPoller {
    handle: JoinHandle<()>,
    shutdown: Arc<Notify>,
}

impl AlertPoller {
    /// Spawn a poller on the current tokio runtime.
    ///
    /// The first poll runs immediately. Empty lists are published too, so a
    /// consumer can clear its badge once every alert is resolved.
    pub fn spawn<S, H, K>(
        engine: Arc<MaintenanceEngine<S, H>>,
        interval: Duration,
        sink: K,
    ) -> Self
    where
        S: EquipmentStore + 'static,
        H: ServiceHistory + 'static,
        K: AlertSink,
    {
        let shutdown = Arc::new(Notify::new());
        let stop = Arc::clone(&shutdown);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = stop.notified() => {
                        tracing::info!("alert poller shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let alerts = engine.list_urgent_alerts();
                        tracing::debug!(count = alerts.len(), "urgent alerts polled");
                        sink.publish(alerts).await;
                    }
                }
            }
        });
        Self { handle, shutdown }
    }

    /// True once the polling task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop polling and wait for the task to exit.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.handle.await {
            tracing::error!("alert poller task failed: {}", e);
        }
    }
}
