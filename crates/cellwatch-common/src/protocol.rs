//! Channel protocol between the host application shell and the bridge.
//!
//! Every message is a JSON envelope with a dotted `type` name and a
//! type-specific payload. Queries carry an optional `request_id` which is
//! echoed back in the matching `.response` message so the host can correlate
//! replies. The bridge may also push unsolicited events (`permission.result`)
//! when the platform permission prompt resolves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Envelope ────────────────────────────────────────────────────────

/// The outer envelope for all channel messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique message ID (UUIDv7, time-ordered).
    pub id: String,
    /// Message type (dotted namespace, e.g. "telephony.carrier").
    #[serde(rename = "type")]
    pub msg_type: String,
    /// ISO 8601 timestamp.
    pub ts: DateTime<Utc>,
    /// Type-specific payload.
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Create a new envelope with a fresh UUIDv7 and current timestamp.
    pub fn new(msg_type: impl Into<String>, payload: impl Serialize) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            msg_type: msg_type.into(),
            ts: Utc::now(),
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Parse the payload into a concrete type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// The `request_id` field of the payload, if one was supplied.
    pub fn request_id(&self) -> Option<String> {
        self.payload
            .get("request_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

// ── Channel errors ──────────────────────────────────────────────────

/// Faults the bridge reports back over the channel instead of closing it.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The operation name is not one the bridge implements.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// The incoming text was not a valid envelope.
    #[error("malformed envelope: {0}")]
    Malformed(String),
    /// The dispatch itself failed in a way the operation could not absorb.
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

impl ChannelError {
    /// Stable machine-readable code for the error payload.
    pub fn code(&self) -> &'static str {
        match self {
            ChannelError::NotImplemented(_) => "not_implemented",
            ChannelError::Malformed(_) => "malformed",
            ChannelError::Dispatch(_) => "error",
        }
    }
}

/// Payload of a `channel.error` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub code: String,
    pub message: String,
}

impl ChannelErrorPayload {
    pub fn from_error(err: &ChannelError, request_id: Option<String>) -> Self {
        Self {
            request_id,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ── Host → Bridge ───────────────────────────────────────────────────

/// Payload of the four telephony queries and the two permission operations.
/// Operation name is carried by the envelope type; the payload only holds
/// the correlation ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

// ── Bridge → Host ───────────────────────────────────────────────────

/// Response to `telephony.carrier`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub carrier: String,
}

/// Response to `telephony.signal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub signal_dbm: i32,
}

/// Response to `telephony.network_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkTypeResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub network_type: String,
}

/// Response to `telephony.operator`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub operator: String,
}

/// Response to `permission.check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCheckResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub granted: bool,
}

/// Acknowledgement of `permission.request`. The actual decision arrives
/// later as a `permission.result` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRequestResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub status: String,
}

/// Unsolicited event pushed when the platform prompt resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionResultPayload {
    pub granted: bool,
}

/// Response to `channel.test`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelTestResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub ok: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trip() {
        let payload = QueryPayload {
            request_id: Some("req_test123".into()),
        };

        let envelope = Envelope::new("telephony.carrier", &payload);
        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: Envelope = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.msg_type, "telephony.carrier");
        assert_eq!(parsed.request_id().as_deref(), Some("req_test123"));
        let recovered: QueryPayload = parsed.parse_payload().unwrap();
        assert_eq!(recovered.request_id.as_deref(), Some("req_test123"));
    }

    #[test]
    fn query_payload_tolerates_missing_request_id() {
        let envelope = Envelope::new("telephony.signal", serde_json::json!({}));
        let payload: QueryPayload = envelope.parse_payload().unwrap();
        assert!(payload.request_id.is_none());
        assert!(envelope.request_id().is_none());
    }

    #[test]
    fn error_payload_carries_code_and_echo() {
        let err = ChannelError::NotImplemented("telephony.imei".into());
        let payload = ChannelErrorPayload::from_error(&err, Some("req_1".into()));
        assert_eq!(payload.code, "not_implemented");
        assert!(payload.message.contains("telephony.imei"));

        let json = serde_json::to_string(&payload).unwrap();
        let back: ChannelErrorPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.request_id.as_deref(), Some("req_1"));
    }

    #[test]
    fn response_payload_shapes() {
        let signal = SignalResponsePayload {
            request_id: None,
            signal_dbm: -85,
        };
        let json = serde_json::to_string(&signal).unwrap();
        // request_id is omitted entirely when absent.
        assert_eq!(json, "{\"signal_dbm\":-85}");

        let result = PermissionResultPayload { granted: true };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            "{\"granted\":true}"
        );
    }
}
