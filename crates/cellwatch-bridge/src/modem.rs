//! ModemManager probe — reads the active modem through `mmcli`.
//!
//! Produces a [`ModemSnapshot`] with whatever fields the modem stack was
//! willing to report; every sub-step tolerates failure and leaves its
//! field as `None`. Signal readings use AT command passthrough (`+CSQ`
//! for GSM ASU, `+CESQ` for the raw LTE RSRP index) because not every
//! modem exposes extended signal properties over DBus.
//!
//! All of this is point-in-time: one probe per request, no caching.

use serde_json::Value;
use tokio::process::Command;

/// A point-in-time view of the first modem ModemManager reports.
#[derive(Debug, Clone, Default)]
pub struct ModemSnapshot {
    /// Registered network operator name.
    pub operator_name: Option<String>,
    /// Operator name stored on the SIM.
    pub sim_operator_name: Option<String>,
    /// Numeric MCC+MNC operator code, e.g. "310260".
    pub operator_code: Option<String>,
    /// Access technology name in mmcli vocabulary ("lte", "5gnr", ...).
    pub access_technology: Option<String>,
    /// GSM signal level in ASU (99 = unknown).
    pub gsm_asu: Option<u8>,
    /// Raw LTE RSRP index from `+CESQ`.
    pub lte_rsrp_raw: Option<i32>,
}

/// Probe the first modem. `None` when ModemManager is unreachable or no
/// modem is present; individual missing fields stay `None`.
pub async fn probe() -> Option<ModemSnapshot> {
    let list = mmcli_json(&["-L"]).await?;
    let modem_path = first_modem_path(&list)?;

    let modem = mmcli_json(&["-m", &modem_path]).await?;
    let mut snap = snapshot_from_modem(&modem);

    if let Some(sim_path) = modem.pointer("/modem/generic/sim").and_then(Value::as_str) {
        if let Some(sim) = mmcli_json(&["-i", sim_path]).await {
            snap.sim_operator_name = json_str(&sim, "/sim/properties/operator-name");
        }
    }

    // AT passthrough requires mmcli debug mode on some firmwares; treat
    // refusal the same as an unknown reading.
    if let Some(out) = at_command(&modem_path, "+CSQ").await {
        snap.gsm_asu = parse_csq(&out);
    }
    if let Some(out) = at_command(&modem_path, "+CESQ").await {
        snap.lte_rsrp_raw = parse_cesq_rsrp(&out);
    }

    Some(snap)
}

/// Run `mmcli` with JSON output and parse it. `None` on any failure.
async fn mmcli_json(args: &[&str]) -> Option<Value> {
    let output = Command::new("mmcli").args(args).arg("-J").output().await;
    match output {
        Ok(out) if out.status.success() => serde_json::from_slice(&out.stdout).ok(),
        Ok(out) => {
            tracing::debug!(args = ?args, code = ?out.status.code(), "mmcli returned non-zero");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "mmcli not available");
            None
        }
    }
}

/// Send an AT command through the modem and return the raw response text.
async fn at_command(modem_path: &str, command: &str) -> Option<String> {
    let output = Command::new("mmcli")
        .args(["-m", modem_path, &format!("--command={command}")])
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extract the first modem DBus path from `mmcli -L -J` output.
fn first_modem_path(list: &Value) -> Option<String> {
    list.get("modem-list")?
        .as_array()?
        .first()?
        .as_str()
        .map(|s| s.to_string())
}

/// Build a snapshot from `mmcli -m <path> -J` output.
fn snapshot_from_modem(modem: &Value) -> ModemSnapshot {
    ModemSnapshot {
        operator_name: json_str(modem, "/modem/3gpp/operator-name"),
        operator_code: json_str(modem, "/modem/3gpp/operator-code"),
        access_technology: json_str(modem, "/modem/generic/access-technologies/0"),
        ..Default::default()
    }
}

/// Read a string field by JSON pointer, filtering mmcli's "--" placeholder.
fn json_str(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "--")
        .map(|s| s.to_string())
}

/// Parse a `+CSQ: <rssi>,<ber>` response into an ASU value.
pub fn parse_csq(response: &str) -> Option<u8> {
    let rest = response.split("+CSQ:").nth(1)?;
    let rssi = rest.trim().split(',').next()?.trim();
    rssi.parse::<u8>().ok()
}

/// Parse the raw RSRP index (sixth field) out of a `+CESQ` response.
/// 255 is the "not known or not detectable" marker.
pub fn parse_cesq_rsrp(response: &str) -> Option<i32> {
    let rest = response.split("+CESQ:").nth(1)?;
    let fields: Vec<&str> = rest.trim().split(',').map(str::trim).collect();
    let raw = fields.get(5)?.parse::<i32>().ok()?;
    if raw == 255 {
        return None;
    }
    Some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csq_typical() {
        assert_eq!(parse_csq("response: '+CSQ: 21,99'"), Some(21));
        assert_eq!(parse_csq("+CSQ: 0,0"), Some(0));
    }

    #[test]
    fn parse_csq_unknown_level_still_parses() {
        // 99 ("unknown") is a valid parse; the conversion layer rejects it.
        assert_eq!(parse_csq("+CSQ: 99,99"), Some(99));
    }

    #[test]
    fn parse_csq_garbage_is_none() {
        assert_eq!(parse_csq("ERROR"), None);
        assert_eq!(parse_csq("+CSQ: ,"), None);
        assert_eq!(parse_csq(""), None);
    }

    #[test]
    fn parse_cesq_rsrp_typical() {
        assert_eq!(parse_cesq_rsrp("+CESQ: 99,99,255,255,20,47"), Some(47));
    }

    #[test]
    fn parse_cesq_rsrp_unknown_marker() {
        assert_eq!(parse_cesq_rsrp("+CESQ: 99,99,255,255,255,255"), None);
    }

    #[test]
    fn parse_cesq_rsrp_short_response_is_none() {
        assert_eq!(parse_cesq_rsrp("+CESQ: 12,3"), None);
        assert_eq!(parse_cesq_rsrp("no keyword"), None);
    }

    #[test]
    fn first_modem_path_from_list() {
        let list: Value = serde_json::from_str(
            r#"{"modem-list":["/org/freedesktop/ModemManager1/Modem/0","/org/freedesktop/ModemManager1/Modem/3"]}"#,
        )
        .unwrap();
        assert_eq!(
            first_modem_path(&list).as_deref(),
            Some("/org/freedesktop/ModemManager1/Modem/0")
        );

        let empty: Value = serde_json::from_str(r#"{"modem-list":[]}"#).unwrap();
        assert_eq!(first_modem_path(&empty), None);
    }

    #[test]
    fn snapshot_filters_mmcli_placeholders() {
        let modem: Value = serde_json::from_str(
            r#"{"modem":{"3gpp":{"operator-name":"--","operator-code":"310260"},
                "generic":{"access-technologies":["lte"]}}}"#,
        )
        .unwrap();
        let snap = snapshot_from_modem(&modem);
        assert_eq!(snap.operator_name, None);
        assert_eq!(snap.operator_code.as_deref(), Some("310260"));
        assert_eq!(snap.access_technology.as_deref(), Some("lte"));
    }
}
