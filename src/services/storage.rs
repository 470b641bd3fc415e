//! Browser `localStorage` persistence.
//!
//! Two small concerns live here: caching the signed-in wallet identity
//! across reloads, and remembering that an account has published at
//! least one asset of a given kind. Every accessor degrades to "no
//! data" when storage is unavailable (private browsing, disabled).

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{STORAGE_UPLOADED_PREFIX, STORAGE_WALLET_KEY};
use crate::types::{AssetKind, WalletIdentity};

/// Identity record as persisted, with the time it was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedIdentity {
    pub identity: WalletIdentity,
    pub cached_at: String,
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Persist the signed-in identity for the next page load.
pub fn cache_identity(identity: &WalletIdentity) {
    let record = CachedIdentity {
        identity: identity.clone(),
        cached_at: Utc::now().to_rfc3339(),
    };
    let Ok(json) = serde_json::to_string(&record) else {
        return;
    };
    if let Some(storage) = local_storage() {
        if storage.set_item(STORAGE_WALLET_KEY, &json).is_err() {
            log::warn!("⚠️ Could not cache wallet identity");
        }
    }
}

/// Identity cached by a previous session, if any.
pub fn cached_identity() -> Option<WalletIdentity> {
    let storage = local_storage()?;
    let json = storage.get_item(STORAGE_WALLET_KEY).ok().flatten()?;
    match serde_json::from_str::<CachedIdentity>(&json) {
        Ok(record) => Some(record.identity),
        Err(_) => {
            // Stale format from an older build; drop it.
            let _ = storage.remove_item(STORAGE_WALLET_KEY);
            None
        }
    }
}

/// Forget the cached identity (disconnect).
pub fn clear_identity() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(STORAGE_WALLET_KEY);
    }
}

/// Storage key for the per-kind "has published" flag.
fn uploaded_key(kind: AssetKind) -> String {
    format!("{}{}", STORAGE_UPLOADED_PREFIX, kind.as_str())
}

/// Remember that this browser has published an asset of `kind`.
pub fn record_uploaded(kind: AssetKind) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(&uploaded_key(kind), "true");
    }
}

/// Whether this browser has ever published an asset of `kind`.
pub fn has_uploaded(kind: AssetKind) -> bool {
    local_storage()
        .and_then(|s| s.get_item(&uploaded_key(kind)).ok().flatten())
        .is_some()
}
