//! Channel dispatch tests — exercise the call/response surface directly,
//! without a socket. The state runs in simulate mode with an instant
//! permission prompt so the full flow (sentinels → request → grant →
//! live values) can be driven synchronously.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use cellwatch_bridge::permission::PromptMode;
use cellwatch_bridge::{channel, BridgeState};
use cellwatch_common::ids;
use cellwatch_common::protocol::{Envelope, QueryPayload};

fn simulated_state(grant: bool) -> Arc<BridgeState> {
    // The sender half is dropped — dispatch never looks at shutdown.
    let (_shutdown_tx, rx) = watch::channel(false);
    Arc::new(BridgeState::new(
        true,
        PromptMode::Simulated {
            grant,
            delay: Duration::ZERO,
        },
        rx,
    ))
}

/// Send one operation through dispatch and parse the reply envelope.
async fn call(state: &BridgeState, msg_type: &str) -> Envelope {
    let request = Envelope::new(
        msg_type,
        &QueryPayload {
            request_id: Some(ids::request_id()),
        },
    );
    let raw = serde_json::to_string(&request).unwrap();
    let reply = channel::dispatch(state, &raw).await;
    serde_json::from_str(&reply).unwrap()
}

/// Request the permission and wait for the prompt to resolve.
async fn grant_permission(state: &BridgeState) {
    let mut events = state.permissions.subscribe();
    let reply = call(state, "permission.request").await;
    assert_eq!(reply.msg_type, "permission.request.response");
    assert_eq!(reply.payload["status"], "requested");
    assert!(events.recv().await.unwrap());
}

#[tokio::test]
async fn reads_return_sentinels_before_grant() {
    let state = simulated_state(true);

    let carrier = call(&state, "telephony.carrier").await;
    assert_eq!(carrier.msg_type, "telephony.carrier.response");
    assert_eq!(carrier.payload["carrier"], "Permission Required");

    let signal = call(&state, "telephony.signal").await;
    assert_eq!(signal.payload["signal_dbm"], -100);

    let network = call(&state, "telephony.network_type").await;
    assert_eq!(network.payload["network_type"], "Permission Required");

    let operator = call(&state, "telephony.operator").await;
    assert_eq!(operator.payload["operator"], "");
}

#[tokio::test]
async fn permission_check_reflects_the_flow() {
    let state = simulated_state(true);

    let before = call(&state, "permission.check").await;
    assert_eq!(before.payload["granted"], false);

    grant_permission(&state).await;

    let after = call(&state, "permission.check").await;
    assert_eq!(after.payload["granted"], true);

    // Ask-once: a second request acks without re-prompting.
    let again = call(&state, "permission.request").await;
    assert_eq!(again.payload["status"], "already granted");
}

#[tokio::test]
async fn denied_permission_keeps_sentinels() {
    let state = simulated_state(false);
    let mut events = state.permissions.subscribe();

    call(&state, "permission.request").await;
    assert!(!events.recv().await.unwrap());

    let check = call(&state, "permission.check").await;
    assert_eq!(check.payload["granted"], false);

    let carrier = call(&state, "telephony.carrier").await;
    assert_eq!(carrier.payload["carrier"], "Permission Required");
}

#[tokio::test]
async fn live_values_after_grant() {
    let state = simulated_state(true);
    grant_permission(&state).await;

    let carrier = call(&state, "telephony.carrier").await;
    assert_eq!(carrier.payload["carrier"], "T-Mobile");

    let network = call(&state, "telephony.network_type").await;
    assert_eq!(network.payload["network_type"], "4G");

    let operator = call(&state, "telephony.operator").await;
    assert_eq!(operator.payload["operator"], "310260");

    let signal = call(&state, "telephony.signal").await;
    let dbm = signal.payload["signal_dbm"].as_i64().unwrap();
    assert!((-120..=-30).contains(&dbm), "signal out of range: {dbm}");
}

#[tokio::test]
async fn replies_echo_the_request_id() {
    let state = simulated_state(true);

    let request = Envelope::new(
        "telephony.signal",
        &QueryPayload {
            request_id: Some("req_fixed".into()),
        },
    );
    let raw = serde_json::to_string(&request).unwrap();
    let reply: Envelope = serde_json::from_str(&channel::dispatch(&state, &raw).await).unwrap();
    assert_eq!(reply.payload["request_id"], "req_fixed");
}

#[tokio::test]
async fn unknown_operation_is_not_implemented() {
    let state = simulated_state(true);

    let reply = call(&state, "telephony.imei").await;
    assert_eq!(reply.msg_type, "channel.error");
    assert_eq!(reply.payload["code"], "not_implemented");
    assert!(reply.payload["message"]
        .as_str()
        .unwrap()
        .contains("telephony.imei"));
    // The correlation ID still comes back so the host can fail the call.
    assert!(reply.payload["request_id"].is_string());
}

#[tokio::test]
async fn malformed_input_is_an_error_reply_not_a_panic() {
    let state = simulated_state(true);

    let reply: Envelope =
        serde_json::from_str(&channel::dispatch(&state, "not json at all").await).unwrap();
    assert_eq!(reply.msg_type, "channel.error");
    assert_eq!(reply.payload["code"], "malformed");
}

#[tokio::test]
async fn channel_test_answers_ok() {
    let state = simulated_state(true);

    let reply = call(&state, "channel.test").await;
    assert_eq!(reply.msg_type, "channel.test.response");
    assert_eq!(reply.payload["ok"], true);
    assert_eq!(reply.payload["message"], "channel is up");
}
