//! Signal-strength conversions and the synthetic fallback generator.
//!
//! Hardware readings come in radio-native units: GSM reports an ASU value
//! (`+CSQ`, 0–31 with 99 meaning unknown), LTE a raw RSRP index (`+CESQ`).
//! Both convert to dBm here. When no hardware reading is available the
//! bridge synthesizes a plausible value — a fixed baseline plus a slow
//! time-based drift plus bounded random jitter — so the host shell's QoE
//! display keeps moving instead of flatlining.

/// ASU value GSM radios report when the signal level is unknown.
pub const ASU_UNKNOWN: u8 = 99;

/// Baseline for the synthetic signal path, in dBm.
pub const SYNTHETIC_BASE_DBM: i32 = -75;

/// Lower clamp bound for synthetic values (out-of-service floor).
pub const CLAMP_MIN_DBM: i32 = -120;

/// Upper clamp bound for synthetic values (nobody sits on the tower).
pub const CLAMP_MAX_DBM: i32 = -30;

/// Fallback when even the synthetic path cannot run (e.g. clock error).
pub const DEFAULT_FALLBACK_DBM: i32 = -85;

/// Convert a GSM ASU reading to dBm. `None` when the radio reports unknown.
pub fn gsm_asu_to_dbm(asu: u8) -> Option<i32> {
    if asu == ASU_UNKNOWN {
        return None;
    }
    Some(-113 + 2 * asu as i32)
}

/// Convert a raw LTE RSRP index to dBm.
///
/// `0` and `i32::MAX` are the "unavailable" markers some radios report.
pub fn lte_raw_to_dbm(raw: i32) -> Option<i32> {
    if raw == 0 || raw == i32::MAX {
        return None;
    }
    Some(raw - 140)
}

/// Synthesize a plausible dBm value from the wall clock and a jitter term.
///
/// The drift cycles through `[-10, 10)` over ~200 seconds so consecutive
/// reads wander slowly; jitter is expected in `[-8, 8)`. The result is
/// always clamped to `[CLAMP_MIN_DBM, CLAMP_MAX_DBM]`.
pub fn synthetic_dbm(unix_ms: u64, jitter_dbm: i32) -> i32 {
    let drift = ((unix_ms / 10_000) % 20) as i32 - 10;
    (SYNTHETIC_BASE_DBM + drift + jitter_dbm).clamp(CLAMP_MIN_DBM, CLAMP_MAX_DBM)
}
