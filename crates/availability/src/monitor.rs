//! Periodic availability check of the current instance.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hadesk_settings::SettingsStore;
use tokio::sync::{Mutex, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::failover::{InstanceLocator, find_alternate};
use crate::probe::LivenessProbe;
use crate::types::{AvailabilityEvent, DISCOVERY_WINDOW, PROBE_INTERVAL, ProbeOutcome};

/// Probes the current instance and fails over when it disappears.
pub struct AvailabilityMonitor {
    store: Arc<SettingsStore>,
    probe: Arc<dyn LivenessProbe>,
    locator: Arc<dyn InstanceLocator>,
    interval: Duration,
    discovery_window: Duration,
    /// Whether the error view is currently up.
    error_shown: AtomicBool,
    events_tx: mpsc::Sender<AvailabilityEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<AvailabilityEvent>>>,
}

impl AvailabilityMonitor {
    pub fn new(
        store: Arc<SettingsStore>,
        probe: Arc<dyn LivenessProbe>,
        locator: Arc<dyn InstanceLocator>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(64);
        Self {
            store,
            probe,
            locator,
            interval: PROBE_INTERVAL,
            discovery_window: DISCOVERY_WINDOW,
            error_shown: AtomicBool::new(false),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Overrides the probe interval and the mDNS listening window.
    pub fn with_timing(mut self, interval: Duration, discovery_window: Duration) -> Self {
        self.interval = interval;
        self.discovery_window = discovery_window;
        self
    }

    /// Takes the event receiver. Can only be called once.
    pub async fn take_events(&self) -> Option<mpsc::Receiver<AvailabilityEvent>> {
        self.events_rx.lock().await.take()
    }

    /// True while the last check left the error view up.
    pub fn error_shown(&self) -> bool {
        self.error_shown.load(Ordering::SeqCst)
    }

    /// Forgets the error state, e.g. after the user picked another
    /// instance by hand.
    pub fn clear_error(&self) {
        self.error_shown.store(false, Ordering::SeqCst);
    }

    /// Probes on every interval tick until `cancel` fires.
    ///
    /// The first probe happens one interval after the start.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // consume first immediate tick

        info!(interval = ?self.interval, "availability monitor started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = self.check_once() => {}
                    }
                }
            }
        }
        debug!("availability monitor stopped");
    }

    /// Runs one check. Returns `None` when no instance is selected.
    pub async fn check_once(&self) -> Option<ProbeOutcome> {
        let current = self
            .store
            .read(|s| s.current_instance().map(str::to_string))?;

        let outcome = self.probe.probe(&current).await;
        match &outcome {
            ProbeOutcome::Healthy => {
                if self.error_shown.swap(false, Ordering::SeqCst) {
                    info!(instance = %current, "instance available again");
                    self.emit(AvailabilityEvent::Recovered { instance: current });
                }
            }
            ProbeOutcome::Unhealthy(_) => self.report_error(&current, &outcome),
            ProbeOutcome::Unreachable(_) => {
                self.report_error(&current, &outcome);
                if self.store.read(|s| s.can_switch_automatically()) {
                    self.fail_over(&current).await;
                }
            }
        }
        Some(outcome)
    }

    fn report_error(&self, instance: &str, outcome: &ProbeOutcome) {
        if !self.error_shown.swap(true, Ordering::SeqCst) {
            warn!(instance = %instance, %outcome, "instance unavailable");
            self.emit(AvailabilityEvent::Unavailable {
                instance: instance.to_string(),
                reason: outcome.to_string(),
            });
        } else {
            debug!(instance = %instance, %outcome, "instance still unavailable");
        }
    }

    async fn fail_over(&self, from: &str) {
        let registry = self.store.read(|s| s.instances.clone());
        let Some(alt) = find_alternate(
            &registry,
            self.probe.as_ref(),
            self.locator.as_ref(),
            self.discovery_window,
        )
        .await
        else {
            debug!(from = %from, "no alternate instance available");
            return;
        };

        // Leave a selection made while we were probing alone.
        let switch = |s: &mut hadesk_settings::Settings| {
            s.current_instance() == Some(from) && s.instances.select(&alt.url)
        };
        let switched = match self.store.update(switch) {
            Ok(switched) => switched,
            Err(e) => {
                warn!(error = %e, "failed to save instance switch");
                self.store
                    .read(|s| s.current_instance() == Some(alt.url.as_str()))
            }
        };
        if !switched {
            debug!(from = %from, "selection changed during failover");
            return;
        }

        info!(from = %from, to = %alt.url, via = %alt.via, "switched instance");
        self.error_shown.store(false, Ordering::SeqCst);
        self.emit(AvailabilityEvent::Switched {
            from: from.to_string(),
            to: alt.url,
        });
    }

    fn emit(&self, event: AvailabilityEvent) {
        if let Err(e) = self.events_tx.try_send(event) {
            warn!(error = %e, "availability event dropped");
        }
    }
}
