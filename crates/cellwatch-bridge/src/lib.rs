//! cellwatch bridge library.
//!
//! Re-exports the channel dispatch, telephony accessor, and permission
//! broker so they can be used by integration tests (and potentially
//! embedded in a host shell directly).

pub mod carrier;
pub mod channel;
pub mod modem;
pub mod permission;
pub mod signal;
pub mod telephony;

use std::time::Instant;

use tokio::sync::watch;

use permission::{PermissionBroker, PromptMode};
use telephony::TelephonyScanner;

/// Shared bridge state accessible from all connections.
pub struct BridgeState {
    pub simulate: bool,
    pub scanner: TelephonyScanner,
    pub permissions: PermissionBroker,
    pub started_at: Instant,
    pub shutdown: watch::Receiver<bool>,
}

impl BridgeState {
    pub fn new(simulate: bool, prompt: PromptMode, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            simulate,
            scanner: TelephonyScanner::new(simulate),
            permissions: PermissionBroker::new(prompt),
            started_at: Instant::now(),
            shutdown,
        }
    }
}
