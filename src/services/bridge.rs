//! Fallback window-channel bridge for the wallet connect handshake.
//!
//! The wallet extension's content script and the page share one
//! `window.postMessage` channel with unrelated traffic, so every
//! message is filtered by its `type` string. Outbound messages carry a
//! generated correlation id and a response echoing one is matched by
//! id; the sign handshake protocol cannot echo ids, so it falls back
//! to type-string matching with single-flight enforcement: a second
//! request of a type already in flight is rejected instead of letting
//! the first response satisfy an arbitrary caller.
//!
//! Listener hygiene: exactly one listener exists per outstanding
//! request, and it is removed when the response arrives, when the
//! timeout fires, or when the waiting task is dropped on teardown.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{select, Either};
use gloo_timers::future::TimeoutFuture;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MessageEvent;

use crate::config::{HANDSHAKE_TIMEOUT_MS, SIGN_REQUEST_TYPE, SIGN_RESPONSE_TYPE};
use crate::services::extension::js_error_message;
use crate::types::{AppError, AppResult, WalletIdentity};

/// Envelope exchanged on the shared channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ChannelMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
    /// Correlation id; absent on protocols that cannot echo it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

thread_local! {
    /// Response types with a request currently in flight.
    static IN_FLIGHT: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// Claim a response type for a single flight. Released on drop so a
/// torn-down waiter cannot leave the type permanently claimed.
struct FlightClaim(String);

impl FlightClaim {
    fn take(response_type: &str) -> Option<Self> {
        let fresh = IN_FLIGHT.with(|set| set.borrow_mut().insert(response_type.to_string()));
        fresh.then(|| Self(response_type.to_string()))
    }
}

impl Drop for FlightClaim {
    fn drop(&mut self) {
        IN_FLIGHT.with(|set| {
            set.borrow_mut().remove(&self.0);
        });
    }
}

/// Message listener bound to the window, removed on drop.
struct ListenerGuard {
    window: web_sys::Window,
    closure: Closure<dyn FnMut(MessageEvent)>,
}

impl ListenerGuard {
    fn install(
        window: web_sys::Window,
        closure: Closure<dyn FnMut(MessageEvent)>,
    ) -> Result<Self, JsValue> {
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())?;
        Ok(Self { window, closure })
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("message", self.closure.as_ref().unchecked_ref());
    }
}

/// Fresh correlation id for an outbound message.
fn new_correlation_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Post `{type: request_type, data}` into the shared channel and wait
/// for the first `{type: response_type}` message, up to `timeout_ms`.
///
/// Errors: a same-type request already in flight, the channel being
/// unusable, or the extension staying silent past the timeout.
pub async fn request_reply(
    request_type: &str,
    response_type: &str,
    data: Value,
    timeout_ms: u32,
) -> AppResult<Value> {
    let _claim = FlightClaim::take(response_type).ok_or_else(|| {
        AppError::Wallet(format!("A {} request is already waiting for its response", request_type))
    })?;
    exchange(request_type, response_type, data, timeout_ms).await
}

async fn exchange(
    request_type: &str,
    response_type: &str,
    data: Value,
    timeout_ms: u32,
) -> AppResult<Value> {
    let window =
        web_sys::window().ok_or_else(|| AppError::Wallet("No window object".to_string()))?;

    let correlation = new_correlation_id();
    let (tx, rx) = oneshot::channel::<Value>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let expected_type = response_type.to_string();
    let expected_id = correlation.clone();
    let sender = Rc::clone(&tx);
    let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Unrelated traffic on the shared channel parses to garbage;
        // ignore anything that is not our envelope.
        let msg: ChannelMessage = match serde_wasm_bindgen::from_value(event.data()) {
            Ok(msg) => msg,
            Err(_) => return,
        };
        if msg.kind != expected_type {
            return;
        }
        if let Some(id) = &msg.id {
            if *id != expected_id {
                return;
            }
        }
        if let Some(sender) = sender.borrow_mut().take() {
            let _ = sender.send(msg.data);
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    // Listener first, then post: the reply must not be able to win the
    // race against registration.
    let _listener = ListenerGuard::install(window.clone(), on_message)
        .map_err(|e| AppError::Wallet(js_error_message(&e)))?;

    let outbound = ChannelMessage {
        kind: request_type.to_string(),
        data,
        id: Some(correlation),
    };
    let js = serde_wasm_bindgen::to_value(&outbound)
        .map_err(|e| AppError::Wallet(format!("Failed to encode message: {}", e)))?;
    window
        .post_message(&js, "*")
        .map_err(|e| AppError::Wallet(js_error_message(&e)))?;

    log::debug!("📡 Posted {} and waiting for {}", request_type, response_type);

    let timeout = TimeoutFuture::new(timeout_ms);
    futures::pin_mut!(timeout);
    match select(rx, timeout).await {
        Either::Left((Ok(value), _)) => Ok(value),
        Either::Left((Err(_), _)) => {
            Err(AppError::Wallet("Wallet channel closed unexpectedly".to_string()))
        }
        Either::Right(((), _)) => Err(AppError::Wallet(
            "The wallet extension is unresponsive. Reload the extension and try again."
                .to_string(),
        )),
    }
}

/// Run the connect handshake: `WALLET_SIGN_REQUEST` out,
/// `WALLET_SIGN_RESPONSE` in, bounded by the configured timeout.
pub async fn connect_handshake() -> AppResult<WalletIdentity> {
    let reply = request_reply(
        SIGN_REQUEST_TYPE,
        SIGN_RESPONSE_TYPE,
        Value::Object(Default::default()),
        HANDSHAKE_TIMEOUT_MS,
    )
    .await?;
    serde_json::from_value(reply)
        .map_err(|e| AppError::Wallet(format!("Malformed sign response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_flight_claim_rejects_duplicates() {
        let first = FlightClaim::take("WALLET_SIGN_RESPONSE");
        assert!(first.is_some());
        assert!(FlightClaim::take("WALLET_SIGN_RESPONSE").is_none());
        // A different type is its own flight.
        let other = FlightClaim::take("TOKEN_PRICE_RESPONSE");
        assert!(other.is_some());

        drop(first);
        assert!(FlightClaim::take("WALLET_SIGN_RESPONSE").is_some());
    }

    #[test]
    fn channel_message_round_trips_type_field() {
        let msg = ChannelMessage {
            kind: SIGN_REQUEST_TYPE.to_string(),
            data: serde_json::json!({}),
            id: Some("ab12cd34".to_string()),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "WALLET_SIGN_REQUEST");
        assert_eq!(value["id"], "ab12cd34");

        // Inbound handshake responses carry no id.
        let inbound = r#"{"type": "WALLET_SIGN_RESPONSE", "data": {"did": "d", "username": "u"}}"#;
        let parsed: ChannelMessage = serde_json::from_str(inbound).unwrap();
        assert_eq!(parsed.kind, SIGN_RESPONSE_TYPE);
        assert!(parsed.id.is_none());
        assert_eq!(parsed.data["did"], "d");
    }

    #[test]
    fn sign_response_data_decodes_to_identity() {
        let data = serde_json::json!({"did": "did:minerva:xyz", "username": "grace"});
        let identity: WalletIdentity = serde_json::from_value(data).unwrap();
        assert_eq!(identity.did, "did:minerva:xyz");
        assert_eq!(identity.username, "grace");
    }
}
