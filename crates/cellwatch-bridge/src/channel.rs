//! WebSocket channel handler for the host application shell.
//!
//! Endpoint: GET /channel
//!
//! Each incoming envelope is dispatched to one operation and answered with
//! exactly one reply envelope. Unknown operations get a `channel.error`
//! with code `not_implemented`; no fault ever closes the channel from the
//! bridge side. Permission prompt decisions are pushed unsolicited as
//! `permission.result`.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::StreamExt;
use futures::SinkExt;

use cellwatch_common::models::{
    SENTINEL_CARRIER, SENTINEL_NETWORK_TYPE, SENTINEL_OPERATOR, SENTINEL_SIGNAL_DBM,
};
use cellwatch_common::protocol::{
    CarrierResponsePayload, ChannelError, ChannelErrorPayload, ChannelTestResponsePayload,
    Envelope, NetworkTypeResponsePayload, OperatorResponsePayload,
    PermissionCheckResponsePayload, PermissionRequestResponsePayload, PermissionResultPayload,
    SignalResponsePayload,
};

use crate::BridgeState;

/// Axum handler — upgrades HTTP to WebSocket.
pub async fn handler(
    State(state): State<Arc<BridgeState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Main loop for a single host-shell connection.
async fn handle_socket(state: Arc<BridgeState>, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut permission_events = state.permissions.subscribe();
    let mut shutdown = state.shutdown.clone();

    tracing::info!("host shell connected");

    loop {
        tokio::select! {
            // Requests from the host shell
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = dispatch(&state, &text).await;
                        if ws_tx.send(Message::Text(reply.into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let err = ChannelError::Dispatch("binary frames not supported".into());
                        if ws_tx.send(Message::Text(error_json(&err, None).into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "channel read error");
                        break;
                    }
                    _ => {} // Ping/Pong handled by axum
                }
            }

            // Asynchronous permission prompt decision
            event = permission_events.recv() => {
                if let Ok(granted) = event {
                    let envelope =
                        Envelope::new("permission.result", &PermissionResultPayload { granted });
                    if ws_tx.send(Message::Text(to_json(&envelope).into())).await.is_err() {
                        break;
                    }
                }
                // A lagged receiver just misses the push; the host can
                // still poll permission.check.
            }

            // Shutdown signal
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    }

    tracing::info!("host shell disconnected");
}

/// Dispatch one request envelope and build the reply JSON.
///
/// Every read checks the permission first and answers its sentinel when
/// the grant is absent; all other internal faults have already been
/// absorbed into fallback values by the accessor.
pub async fn dispatch(state: &BridgeState, raw: &str) -> String {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(error = %e, "malformed envelope from host");
            return error_json(&ChannelError::Malformed(e.to_string()), None);
        }
    };

    let request_id = envelope.request_id();
    let granted = state.permissions.is_granted();
    tracing::debug!(msg_type = %envelope.msg_type, granted, "channel request");

    match envelope.msg_type.as_str() {
        "telephony.carrier" => {
            let carrier = if granted {
                state.scanner.carrier_name().await
            } else {
                SENTINEL_CARRIER.to_string()
            };
            to_json(&Envelope::new(
                "telephony.carrier.response",
                &CarrierResponsePayload {
                    request_id,
                    carrier,
                },
            ))
        }
        "telephony.signal" => {
            let signal_dbm = if granted {
                state.scanner.signal_dbm().await
            } else {
                SENTINEL_SIGNAL_DBM
            };
            to_json(&Envelope::new(
                "telephony.signal.response",
                &SignalResponsePayload {
                    request_id,
                    signal_dbm,
                },
            ))
        }
        "telephony.network_type" => {
            let network_type = if granted {
                state.scanner.network_type().await
            } else {
                SENTINEL_NETWORK_TYPE.to_string()
            };
            to_json(&Envelope::new(
                "telephony.network_type.response",
                &NetworkTypeResponsePayload {
                    request_id,
                    network_type,
                },
            ))
        }
        "telephony.operator" => {
            let operator = if granted {
                state.scanner.operator_code().await
            } else {
                SENTINEL_OPERATOR.to_string()
            };
            to_json(&Envelope::new(
                "telephony.operator.response",
                &OperatorResponsePayload {
                    request_id,
                    operator,
                },
            ))
        }
        "permission.check" => to_json(&Envelope::new(
            "permission.check.response",
            &PermissionCheckResponsePayload {
                request_id,
                granted,
            },
        )),
        "permission.request" => {
            let status = state.permissions.request().await.to_string();
            to_json(&Envelope::new(
                "permission.request.response",
                &PermissionRequestResponsePayload { request_id, status },
            ))
        }
        "channel.test" => to_json(&Envelope::new(
            "channel.test.response",
            &ChannelTestResponsePayload {
                request_id,
                ok: true,
                message: "channel is up".to_string(),
            },
        )),
        other => {
            tracing::warn!(msg_type = %other, "operation not implemented");
            error_json(&ChannelError::NotImplemented(other.to_string()), request_id)
        }
    }
}

/// Serialize a reply envelope; degrade to a hand-built error on failure
/// rather than dropping the reply.
fn to_json(envelope: &Envelope) -> String {
    serde_json::to_string(envelope).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize reply envelope");
        r#"{"type":"channel.error","payload":{"code":"error","message":"reply serialization failed"}}"#
            .to_string()
    })
}

/// Build a `channel.error` reply.
fn error_json(err: &ChannelError, request_id: Option<String>) -> String {
    let payload = ChannelErrorPayload::from_error(err, request_id);
    to_json(&Envelope::new("channel.error", &payload))
}
