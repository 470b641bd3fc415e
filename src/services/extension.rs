//! Wrapper for the Minerva DID wallet extension.
//!
//! The extension injects `window.minervaWallet`, a global object with
//! two promise-returning capabilities: `signIn()` and
//! `executeContract(request)`. Wallet-gated code goes through the
//! [`WalletExtension`] trait so unit tests inject a scripted double
//! instead of depending on the global.

use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::config::WALLET_GLOBAL;
use crate::types::{AppError, AppResult, ContractResult, ExecuteRequest, SignInResult};

/// Capabilities the wallet extension exposes toward the app.
///
/// `execute_contract` may reject (`Err`: extension crash, timeout,
/// malformed reply) or resolve with `status: false` (extension-reported
/// failure such as the user declining to sign). Normalizing the two is
/// the contract executor's job, not this layer's, and no retries happen
/// here: retry policy belongs to the caller.
#[allow(async_fn_in_trait)] // single-threaded wasm; no Send bound wanted
pub trait WalletExtension {
    /// True iff the host environment exposes the extension entry point.
    ///
    /// When this is false, callers must short-circuit with the
    /// install/enable prompt instead of calling the other methods.
    fn is_available(&self) -> bool;

    /// Ask the extension for the wallet identity.
    async fn sign_in(&self) -> AppResult<SignInResult>;

    /// Submit a transaction request for signing and execution.
    async fn execute_contract(&self, req: &ExecuteRequest) -> AppResult<ContractResult>;
}

/// Production client talking to the injected global.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserWallet;

impl BrowserWallet {
    pub fn new() -> Self {
        Self
    }

    /// Locate `window.minervaWallet`, if the extension injected it.
    fn entry_point() -> Option<Object> {
        let window = web_sys::window()?;
        let value = Reflect::get(&window, &JsValue::from_str(WALLET_GLOBAL)).ok()?;
        if value.is_null() || value.is_undefined() {
            return None;
        }
        value.dyn_into::<Object>().ok()
    }

    /// Call a promise-returning method on the entry point.
    async fn call(method: &str, arg: Option<JsValue>) -> AppResult<JsValue> {
        let target = Self::entry_point().ok_or(AppError::ExtensionUnavailable)?;

        let func = Reflect::get(&target, &JsValue::from_str(method))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| AppError::Wallet(format!("Extension does not expose {}", method)))?;

        let raw = match &arg {
            Some(a) => func.call1(&target, a),
            None => func.call0(&target),
        }
        .map_err(|e| AppError::Wallet(js_error_message(&e)))?;

        let promise: Promise = raw
            .dyn_into()
            .map_err(|_| AppError::Wallet(format!("{} did not return a promise", method)))?;

        JsFuture::from(promise)
            .await
            .map_err(|e| AppError::Wallet(js_error_message(&e)))
    }
}

impl WalletExtension for BrowserWallet {
    fn is_available(&self) -> bool {
        let present = Self::entry_point().is_some();
        if present {
            log::debug!("✅ Minerva wallet extension detected");
        } else {
            log::warn!("⚠️  No Minerva wallet extension found");
        }
        present
    }

    async fn sign_in(&self) -> AppResult<SignInResult> {
        log::info!("🔑 Requesting wallet sign-in...");
        let reply = Self::call("signIn", None).await?;
        serde_wasm_bindgen::from_value(reply)
            .map_err(|e| AppError::Wallet(format!("Malformed signIn response: {}", e)))
    }

    async fn execute_contract(&self, req: &ExecuteRequest) -> AppResult<ContractResult> {
        let arg = serde_wasm_bindgen::to_value(req)
            .map_err(|e| AppError::Wallet(format!("Failed to encode request: {}", e)))?;
        log::info!("📤 Submitting execute-contract request to the extension...");
        let reply = Self::call("executeContract", Some(arg)).await?;
        serde_wasm_bindgen::from_value(reply)
            .map_err(|e| AppError::Wallet(format!("Malformed executeContract response: {}", e)))
    }
}

/// Pull a readable message out of a raw JS error value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    Reflect::get(value, &"message".into())
        .ok()
        .and_then(|v| v.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "Unknown JS error".to_string())
}
