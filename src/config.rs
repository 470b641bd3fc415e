//! Application configuration.
//!
//! Centralized configuration for the Minerva frontend.
//! In development, these are hardcoded. In production, they could be
//! loaded from environment or a config file.

/// Marketplace API base URL.
///
/// Serves the read-only catalog endpoints (platforms, providers).
pub const MARKET_API: &str = "http://localhost:8080";

/// Global entry point injected by the Minerva DID wallet extension.
///
/// Presence of `window.minervaWallet` is the availability check for
/// every wallet-gated action.
pub const WALLET_GLOBAL: &str = "minervaWallet";

/// Outbound message type for the wallet connect handshake.
pub const SIGN_REQUEST_TYPE: &str = "WALLET_SIGN_REQUEST";

/// Inbound message type paired with [`SIGN_REQUEST_TYPE`].
pub const SIGN_RESPONSE_TYPE: &str = "WALLET_SIGN_RESPONSE";

/// How long the connect handshake waits for the extension before
/// failing with an "extension unresponsive" error.
pub const HANDSHAKE_TIMEOUT_MS: u32 = 30_000;

/// Auto-dismiss delay for the publish success modal.
pub const SUCCESS_NOTICE_MS: u32 = 5_000;

/// Token identifying the deployed publish contract.
///
/// Passed verbatim as `smartContractToken` on every execute request.
pub const PUBLISH_CONTRACT_TOKEN: &str = "mnrv1qpublish3x8f0c2hay6ule7d09wsk5tqf4k";

/// Quorum type required by the execute-contract endpoint.
pub const QUORUM_TYPE: u8 = 2;

/// Default fungible token denom assets are priced in.
pub const FT_DENOM: &str = "MVA";

/// DID of the denom creator, fixed per deployment.
pub const FT_DENOM_CREATOR: &str = "bafybmid4qy6qtmrmkmqzfzcbcnq6pvf6lxnkqdxtem6quantc2jnnhagq";

/// Application name, shown in the page title and wallet prompts.
pub const APP_NAME: &str = "Minerva Market";

/// Maximum artifact size for upload (in bytes).
///
/// 1 GiB limit; the provider endpoint rejects larger files anyway.
pub const MAX_UPLOAD_BYTES: f64 = 1024.0 * 1024.0 * 1024.0;

/// localStorage key caching the connected wallet identity.
pub const STORAGE_WALLET_KEY: &str = "minerva.wallet";

/// localStorage key prefix for the per-category "has uploaded" flags.
///
/// The asset kind (`model` / `dataset`) is appended; summary views
/// outside this crate consume the flags.
pub const STORAGE_UPLOADED_PREFIX: &str = "minerva.uploaded.";
