//! Telephony accessor — answers the four point-in-time queries.
//!
//! In simulate mode, fabricates a modem snapshot that looks like a stock
//! emulator (numeric operator code, LTE, no hardware signal reading).
//! In real mode, probes ModemManager per request.
//!
//! Every resolution step degrades instead of failing: a fault anywhere in
//! a fallback chain moves on to the next step, and the chain ends in a
//! fixed value the host shell can always render.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use cellwatch_common::models::{classify_technology, NetworkGeneration};

use crate::modem::{self, ModemSnapshot};
use crate::{carrier, signal};

/// Reads telephony state — real or simulated.
pub struct TelephonyScanner {
    simulate: bool,
}

impl TelephonyScanner {
    pub fn new(simulate: bool) -> Self {
        Self { simulate }
    }

    async fn snapshot(&self) -> Option<ModemSnapshot> {
        if self.simulate {
            Some(simulated_snapshot())
        } else {
            modem::probe().await
        }
    }

    /// Carrier name via the four-step fallback chain:
    /// network operator name → SIM operator name → operator-code lookup →
    /// virtualized-host heuristic. `"Unknown"` when everything fails.
    pub async fn carrier_name(&self) -> String {
        let snap = self.snapshot().await;
        let allow_fallback = self.simulate || carrier::host_is_virtualized();
        resolve_carrier(snap.as_ref(), allow_fallback)
    }

    /// Signal strength in dBm: GSM reading, then LTE, then synthetic.
    pub async fn signal_dbm(&self) -> i32 {
        if let Some(snap) = self.snapshot().await {
            if let Some(dbm) = snap.gsm_asu.and_then(signal::gsm_asu_to_dbm) {
                tracing::debug!(dbm, "GSM signal reading");
                return dbm;
            }
            if let Some(dbm) = snap.lte_rsrp_raw.and_then(signal::lte_raw_to_dbm) {
                tracing::debug!(dbm, "LTE signal reading");
                return dbm;
            }
        }

        // No hardware reading — synthesize a plausible, slowly drifting value.
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => {
                let jitter = rand::rng().random_range(-8..8);
                signal::synthetic_dbm(elapsed.as_millis() as u64, jitter)
            }
            Err(_) => signal::DEFAULT_FALLBACK_DBM,
        }
    }

    /// Coarse network generation label (2G/3G/4G/5G/Mobile), or `"Unknown"`
    /// when the modem stack is unreachable.
    pub async fn network_type(&self) -> String {
        match self.snapshot().await {
            Some(snap) => match snap.access_technology {
                Some(tech) => classify_technology(&tech).as_str().to_string(),
                None => NetworkGeneration::Mobile.as_str().to_string(),
            },
            None => "Unknown".to_string(),
        }
    }

    /// Raw numeric operator code (MCC+MNC), empty when unavailable.
    pub async fn operator_code(&self) -> String {
        self.snapshot()
            .await
            .and_then(|s| s.operator_code)
            .unwrap_or_default()
    }
}

/// Walk the carrier fallback chain over a snapshot. `allow_fallback`
/// enables the last (randomized) step, which only makes sense on hosts
/// without a real modem.
fn resolve_carrier(snap: Option<&ModemSnapshot>, allow_fallback: bool) -> String {
    let mut name = snap.and_then(|s| s.operator_name.clone());

    if name.is_none() {
        name = snap.and_then(|s| s.sim_operator_name.clone());
    }

    if name.is_none() {
        name = snap
            .and_then(|s| s.operator_code.as_deref())
            .and_then(carrier::lookup_operator_code)
            .map(|s| s.to_string());
    }

    if name.is_none() && allow_fallback {
        let pick = carrier::random_fallback_carrier();
        tracing::debug!(carrier = pick, "virtualized host, using simulated carrier");
        name = Some(pick.to_string());
    }

    name.unwrap_or_else(|| "Unknown".to_string())
}

/// Snapshot for simulate mode — what a stock emulator reports: a numeric
/// operator code but no operator names and no hardware signal readings,
/// so the name lookup and synthetic signal paths both get exercised.
fn simulated_snapshot() -> ModemSnapshot {
    ModemSnapshot {
        operator_name: None,
        sim_operator_name: None,
        operator_code: Some("310260".into()),
        access_technology: Some("lte".into()),
        gsm_asu: None,
        lte_rsrp_raw: None,
    }
}
