use leptos::*;

use crate::services::bridge;
use crate::services::extension::{BrowserWallet, WalletExtension};
use crate::services::storage;
use crate::state::{use_loaders, use_session};
use crate::types::{AppError, AppResult, WalletIdentity};

/// Shortened DID for the header chip. Counts characters, not bytes, so
/// a DID carrying multibyte text never splits mid-character.
fn short_did(did: &str) -> String {
    let total = did.chars().count();
    if total <= 16 {
        return did.to_string();
    }
    let head: String = did.chars().take(10).collect();
    let tail: String = did.chars().skip(total - 4).collect();
    format!("{}...{}", head, tail)
}

/// Full connect sequence: availability gate, `signIn()` through the
/// entry point, then the postMessage handshake. The handshake identity
/// wins; the sign-in body is only a fallback when the handshake fails
/// but sign-in already returned an identity.
async fn connect_flow() -> AppResult<WalletIdentity> {
    let wallet = BrowserWallet;
    if !wallet.is_available() {
        return Err(AppError::ExtensionUnavailable);
    }

    let reply = wallet.sign_in().await?;
    if !reply.status {
        return Err(AppError::Wallet(
            "The extension refused the sign-in request.".to_string(),
        ));
    }
    let provisional = reply.data;

    match bridge::connect_handshake().await {
        Ok(identity) => Ok(identity),
        Err(err) => match provisional {
            Some(identity) => {
                log::warn!("⚠️ Handshake failed ({}), using the sign-in identity", err);
                Ok(identity)
            }
            None => Err(err),
        },
    }
}

#[component]
pub fn Header() -> impl IntoView {
    let session = use_session();
    let loaders = use_loaders();
    let (connecting, set_connecting) = create_signal(false);
    let (connect_error, set_connect_error) = create_signal(None::<String>);

    let on_wallet_click = move |_| {
        if session.connected() {
            session.clear();
            storage::clear_identity();
            log::info!("👋 Wallet disconnected");
            return;
        }
        if connecting.get() {
            return;
        }

        log::info!("🔑 Connecting wallet...");
        set_connect_error.set(None);
        set_connecting.set(true);
        spawn_local(async move {
            match connect_flow().await {
                Ok(identity) => {
                    log::info!("✅ Wallet connected: {}", identity.did);
                    storage::cache_identity(&identity);
                    session.set(identity);
                }
                Err(e) => {
                    log::error!("❌ Wallet connection failed: {}", e);
                    set_connect_error.set(Some(e.to_string()));
                }
            }
            set_connecting.set(false);
        });
    };

    let busy_names = move || loaders.with(|l| l.active_names().join(", "));

    view! {
        <header>
            <div class="header-left">
                <a href="/" class="logo">"MINERVA"</a>
                <Show when=move || loaders.with(|l| l.has_any()) fallback=|| view! {}>
                    <span class="badge busy" title=busy_names>
                        "⏳ " {busy_names}
                    </span>
                </Show>
            </div>
            <div class="header-right">
                <Show when=move || connect_error.get().is_some() fallback=|| view! {}>
                    <span class="connect-error">
                        {move || connect_error.get().unwrap_or_default()}
                    </span>
                </Show>
                <div
                    class="wallet-status"
                    class:connected=move || session.connected()
                    on:click=on_wallet_click
                    style="cursor: pointer;"
                >
                    <span class="wallet-dot" class:connected=move || session.connected()></span>
                    <span id="walletText">
                        {move || {
                            if connecting.get() {
                                "Connecting...".to_string()
                            } else if let Some(did) = session.did() {
                                short_did(&did)
                            } else {
                                "Connect Wallet".to_string()
                            }
                        }}
                    </span>
                </div>
            </div>
        </header>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_dids_are_shortened_for_display() {
        assert_eq!(
            short_did("did:minerva:0a1b2c3d4e5f67890123"),
            "did:minerv...0123"
        );
    }

    #[test]
    fn short_dids_stay_whole() {
        assert_eq!(short_did("did:m:1"), "did:m:1");
    }

    #[test]
    fn multibyte_dids_are_cut_on_character_boundaries() {
        assert_eq!(
            short_did("did:minerä:0a1b2c3d4e5f67890123"),
            "did:minerä...0123"
        );
        assert_eq!(
            short_did("did:minerva:0a1b2c3d4e5f678ß0"),
            "did:minerv...78ß0"
        );
    }
}
