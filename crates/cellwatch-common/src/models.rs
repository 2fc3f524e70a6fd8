//! Radio and permission models shared between the bridge and its callers.
//!
//! The host shell only ever sees primitive values (strings, ints, bools);
//! these types exist so the mapping from OS-reported radio technologies to
//! coarse network generations lives in exactly one place.

use serde::{Deserialize, Serialize};

// ── Sentinels ───────────────────────────────────────────────────────
//
// Returned by the read operations when the phone-state permission has not
// been granted. The host shell renders these directly, so they are part of
// the channel contract.

/// Carrier-name sentinel when permission is absent.
pub const SENTINEL_CARRIER: &str = "Permission Required";
/// Network-type sentinel when permission is absent.
pub const SENTINEL_NETWORK_TYPE: &str = "Permission Required";
/// Signal-strength sentinel (dBm) when permission is absent.
pub const SENTINEL_SIGNAL_DBM: i32 = -100;
/// Operator-code sentinel when permission is absent.
pub const SENTINEL_OPERATOR: &str = "";

// ── Permission ──────────────────────────────────────────────────────

/// Runtime permission state for reading phone state.
///
/// Two-state flow: `Unrequested` until the host asks, then whatever the
/// platform reported. The bridge remembers the result for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Unrequested,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionState::Unrequested => write!(f, "unrequested"),
            PermissionState::Granted => write!(f, "granted"),
            PermissionState::Denied => write!(f, "denied"),
        }
    }
}

// ── Radio technology ────────────────────────────────────────────────

/// A radio access technology as reported by the modem stack.
///
/// Names follow ModemManager's access-technology vocabulary (`mmcli`),
/// which is what the real probe parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadioTechnology {
    Gsm,
    Gprs,
    Edge,
    Cdma,
    #[serde(rename = "1xrtt")]
    OneXRtt,
    Iden,
    Umts,
    Evdo0,
    Evdoa,
    Evdob,
    Hsdpa,
    Hsupa,
    Hspa,
    HspaPlus,
    Ehrpd,
    Lte,
    #[serde(rename = "5gnr")]
    Nr,
}

impl RadioTechnology {
    /// Every technology the bridge recognizes, for exhaustive mapping tests.
    pub const ALL: &'static [RadioTechnology] = &[
        RadioTechnology::Gsm,
        RadioTechnology::Gprs,
        RadioTechnology::Edge,
        RadioTechnology::Cdma,
        RadioTechnology::OneXRtt,
        RadioTechnology::Iden,
        RadioTechnology::Umts,
        RadioTechnology::Evdo0,
        RadioTechnology::Evdoa,
        RadioTechnology::Evdob,
        RadioTechnology::Hsdpa,
        RadioTechnology::Hsupa,
        RadioTechnology::Hspa,
        RadioTechnology::HspaPlus,
        RadioTechnology::Ehrpd,
        RadioTechnology::Lte,
        RadioTechnology::Nr,
    ];

    /// Coarse generation bucket for this technology.
    pub fn generation(self) -> NetworkGeneration {
        match self {
            RadioTechnology::Gsm
            | RadioTechnology::Gprs
            | RadioTechnology::Edge
            | RadioTechnology::Cdma
            | RadioTechnology::OneXRtt
            | RadioTechnology::Iden => NetworkGeneration::TwoG,

            RadioTechnology::Umts
            | RadioTechnology::Evdo0
            | RadioTechnology::Evdoa
            | RadioTechnology::Evdob
            | RadioTechnology::Hsdpa
            | RadioTechnology::Hsupa
            | RadioTechnology::Hspa
            | RadioTechnology::HspaPlus
            | RadioTechnology::Ehrpd => NetworkGeneration::ThreeG,

            RadioTechnology::Lte => NetworkGeneration::FourG,

            RadioTechnology::Nr => NetworkGeneration::FiveG,
        }
    }
}

impl std::str::FromStr for RadioTechnology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gsm" => Ok(RadioTechnology::Gsm),
            "gprs" => Ok(RadioTechnology::Gprs),
            "edge" => Ok(RadioTechnology::Edge),
            "cdma" | "cdma1x" => Ok(RadioTechnology::Cdma),
            "1xrtt" => Ok(RadioTechnology::OneXRtt),
            "iden" => Ok(RadioTechnology::Iden),
            "umts" => Ok(RadioTechnology::Umts),
            "evdo0" => Ok(RadioTechnology::Evdo0),
            "evdoa" => Ok(RadioTechnology::Evdoa),
            "evdob" => Ok(RadioTechnology::Evdob),
            "hsdpa" => Ok(RadioTechnology::Hsdpa),
            "hsupa" => Ok(RadioTechnology::Hsupa),
            "hspa" => Ok(RadioTechnology::Hspa),
            "hspa-plus" | "hspap" => Ok(RadioTechnology::HspaPlus),
            "ehrpd" => Ok(RadioTechnology::Ehrpd),
            "lte" => Ok(RadioTechnology::Lte),
            "5gnr" | "nr" => Ok(RadioTechnology::Nr),
            other => Err(format!("unknown radio technology: {other}")),
        }
    }
}

/// Coarse network generation reported to the host shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkGeneration {
    #[serde(rename = "2G")]
    TwoG,
    #[serde(rename = "3G")]
    ThreeG,
    #[serde(rename = "4G")]
    FourG,
    #[serde(rename = "5G")]
    FiveG,
    /// Default bucket for technologies we cannot classify.
    Mobile,
}

impl NetworkGeneration {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkGeneration::TwoG => "2G",
            NetworkGeneration::ThreeG => "3G",
            NetworkGeneration::FourG => "4G",
            NetworkGeneration::FiveG => "5G",
            NetworkGeneration::Mobile => "Mobile",
        }
    }
}

impl std::fmt::Display for NetworkGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw access-technology name into a generation bucket.
///
/// Unrecognized names fall into [`NetworkGeneration::Mobile`] rather than
/// erroring — the host shell always gets a usable label.
pub fn classify_technology(name: &str) -> NetworkGeneration {
    name.parse::<RadioTechnology>()
        .map(RadioTechnology::generation)
        .unwrap_or(NetworkGeneration::Mobile)
}
