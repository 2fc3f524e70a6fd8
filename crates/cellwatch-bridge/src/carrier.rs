//! Carrier-name approximation helpers.
//!
//! Last two steps of the carrier fallback chain: mapping a numeric
//! MCC+MNC operator code to a human-readable name, and picking a
//! plausible carrier when running on a virtualized host that has no
//! modem at all (dev containers, emulators).

use rand::Rng;

/// Carriers used when the host looks virtualized and nothing real is
/// available. Mirrors what a stock emulator image would report.
pub const FALLBACK_CARRIERS: &[&str] = &["T-Mobile", "AT&T", "Verizon", "Sprint"];

/// Map a numeric operator code (MCC+MNC, e.g. `"310260"`) to a carrier name.
///
/// Only the handful of codes the QoE product actually encounters get exact
/// names; everything else degrades to a country- or generic-level label.
/// Returns `None` for an empty code.
pub fn lookup_operator_code(code: &str) -> Option<&'static str> {
    if code.is_empty() {
        return None;
    }

    if let Some(mnc) = code.strip_prefix("310") {
        return Some(match mnc {
            "260" => "T-Mobile",
            "410" => "AT&T",
            "012" => "Verizon",
            "120" => "Sprint",
            _ => "US Carrier",
        });
    }

    // Operator codes come in from mmcli as untrusted text; take the MCC
    // prefix without byte-slicing so non-ASCII garbage cannot panic.
    let mcc = code.get(..3).unwrap_or(code);
    Some(match mcc {
        "302" => "Canadian Carrier",
        "234" => "UK Carrier",
        "262" => "German Carrier",
        _ => "Mobile Carrier",
    })
}

/// Pick a random plausible carrier for a virtualized host.
pub fn random_fallback_carrier() -> &'static str {
    let mut rng = rand::rng();
    FALLBACK_CARRIERS[rng.random_range(0..FALLBACK_CARRIERS.len())]
}

/// Heuristic: does this host look like an emulator or VM?
///
/// Reads the DMI product name, which QEMU/KVM/VirtualBox/VMware all brand.
pub fn host_is_virtualized() -> bool {
    match std::fs::read_to_string("/sys/class/dmi/id/product_name") {
        Ok(name) => {
            let name = name.trim();
            ["QEMU", "KVM", "Virtual", "VMware"]
                .iter()
                .any(|marker| name.contains(marker))
        }
        Err(_) => false,
    }
}
