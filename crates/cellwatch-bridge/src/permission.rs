//! Phone-state permission broker.
//!
//! Two-state flow: unrequested until the host shell asks, then whatever
//! the platform reported, remembered for the lifetime of the process.
//! The prompt resolves asynchronously — the host gets an immediate ack
//! and a `permission.result` push once the decision lands, mirroring the
//! grant/deny callback of a mobile OS.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;

use cellwatch_common::models::PermissionState;

use crate::modem;

/// How the platform prompt is resolved.
#[derive(Debug, Clone)]
pub enum PromptMode {
    /// Resolve after `delay` with a fixed decision. Used in simulate mode
    /// where there is no OS dialog to show.
    Simulated { grant: bool, delay: Duration },
    /// Consult the platform: granted when ModemManager exposes a modem to
    /// this user. Headless Linux has no interactive permission dialog, so
    /// device visibility stands in for the grant.
    Probe,
}

struct Inner {
    state: Mutex<PermissionState>,
    prompt_in_flight: AtomicBool,
    mode: PromptMode,
    events: broadcast::Sender<bool>,
}

/// Tracks the permission state and runs the one-shot prompt.
pub struct PermissionBroker {
    inner: Arc<Inner>,
}

impl PermissionBroker {
    pub fn new(mode: PromptMode) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(PermissionState::Unrequested),
                prompt_in_flight: AtomicBool::new(false),
                mode,
                events,
            }),
        }
    }

    /// Current recorded state.
    pub fn state(&self) -> PermissionState {
        *self.inner.state.lock().unwrap()
    }

    /// True only when a grant has been recorded.
    pub fn is_granted(&self) -> bool {
        self.state().is_granted()
    }

    /// Subscribe to prompt decisions (`true` = granted).
    pub fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.inner.events.subscribe()
    }

    /// Trigger the platform prompt at most once.
    ///
    /// Returns an immediate ack string; if a decision is already recorded
    /// or a prompt is in flight, no new prompt is started.
    pub async fn request(&self) -> &'static str {
        match self.state() {
            PermissionState::Granted => return "already granted",
            PermissionState::Denied => return "already denied",
            PermissionState::Unrequested => {}
        }

        if self.inner.prompt_in_flight.swap(true, Ordering::SeqCst) {
            return "request pending";
        }

        tracing::info!("requesting phone-state permission");
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let granted = match &inner.mode {
                PromptMode::Simulated { grant, delay } => {
                    tokio::time::sleep(*delay).await;
                    *grant
                }
                PromptMode::Probe => modem::probe().await.is_some(),
            };
            Inner::resolve(&inner, granted);
        });

        "requested"
    }

    /// Test-only hook: record a decision directly, bypassing the prompt.
    #[cfg(test)]
    fn force(&self, granted: bool) {
        Inner::resolve(&self.inner, granted);
    }
}

impl Inner {
    fn resolve(inner: &Arc<Inner>, granted: bool) {
        {
            let mut state = inner.state.lock().unwrap();
            *state = if granted {
                PermissionState::Granted
            } else {
                PermissionState::Denied
            };
        }
        inner.prompt_in_flight.store(false, Ordering::SeqCst);
        tracing::info!(granted, "phone-state permission resolved");
        // No receivers is fine — the host can still poll permission.check.
        let _ = inner.events.send(granted);
    }
}
