//! Common types used across the frontend application.
//!
//! This module centralizes type definitions to avoid duplication
//! and ensure consistency across components.
//!
//! # Categories
//!
//! - **Asset Types** - drafts, files, pricing
//! - **Catalog Types** - hosting platforms and providers
//! - **Wallet Types** - identity and extension envelopes
//! - **Upload Wire Types** - provider endpoint response shapes
//! - **Contract Wire Types** - execute-contract request body
//! - **Error Types** - frontend error handling

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Asset Types
// =============================================================================

/// Kind of asset a publish flow produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    /// Trained AI model artifact.
    Model,
    /// Dataset artifact.
    Dataset,
}

impl AssetKind {
    /// Wire value expected by the provider endpoint (`assetType` field).
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Model => "model",
            AssetKind::Dataset => "dataset",
        }
    }

    /// Human label for headings and buttons.
    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Model => "Model",
            AssetKind::Dataset => "Dataset",
        }
    }
}

/// A file chosen for upload.
///
/// The publish state machine only looks at `name` and `size`; the
/// browser file handle rides along so the uploader can read the bytes.
/// Drafts built without a live handle (tests, restored state) carry
/// `None` and fail at upload time, not before.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    /// Original file name, used for the stamped upload name.
    pub name: String,
    /// Size in bytes as reported by the browser.
    pub size: f64,
    /// Underlying browser handle, when one exists.
    pub handle: Option<web_sys::File>,
}

impl SelectedFile {
    /// Wrap a file handed over by a file input.
    pub fn from_browser(file: web_sys::File) -> Self {
        Self {
            name: file.name(),
            size: file.size(),
            handle: Some(file),
        }
    }

    /// Build an entry from a bare name, without a live browser handle.
    pub fn named(name: impl Into<String>, size: f64) -> Self {
        Self {
            name: name.into(),
            size,
            handle: None,
        }
    }
}

impl PartialEq for SelectedFile {
    // JS handles only compare by reference; name + size is what the
    // state machine cares about.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.size == other.size
    }
}

/// How buyers pay for an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Single purchase, permanent access.
    OneTime,
    /// Recurring subscription.
    Subscription,
    /// Metered per inference/download.
    PayPerUse,
}

impl PricingMode {
    pub fn label(&self) -> &'static str {
        match self {
            PricingMode::OneTime => "One-time",
            PricingMode::Subscription => "Subscription",
            PricingMode::PayPerUse => "Pay-per-use",
        }
    }
}

/// Pricing block of a draft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Asking price in `currency`.
    pub price: f64,
    /// Payment model.
    pub mode: PricingMode,
    /// Fungible token denom the price is quoted in.
    pub currency: String,
}

/// One quality metric attached to a model draft (e.g. accuracy, F1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub name: String,
    pub value: String,
}

/// One column description attached to a dataset draft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub dtype: String,
}

/// Mutable working copy of a publish flow.
///
/// Created when the wizard opens, edited step by step through the
/// reducer, discarded on cancel or after a successful publish.
///
/// Source invariant: at publish time exactly one of `files`
/// (non-empty) or `url` (non-empty) is set, never both and never
/// neither. The `Details` step guard refuses to advance otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadDraft {
    pub kind: AssetKind,
    pub name: String,
    pub description: String,
    /// Quality metrics (model drafts).
    pub metrics: Vec<MetricEntry>,
    /// Column descriptions (dataset drafts).
    pub schema: Vec<SchemaField>,
    pub pricing: Pricing,
    /// Files chosen in the wizard; only the first is uploaded.
    pub files: Vec<SelectedFile>,
    /// Reference URL, the alternative to uploading a file.
    pub url: String,
    /// Hosting provider picked on the review screen.
    pub provider: Option<ProviderChoice>,
    /// Artifact already accepted by the provider in this flow; a
    /// contract retry reuses it instead of uploading again.
    pub uploaded: Option<UploadedAsset>,
}

impl UploadDraft {
    /// Fresh, empty draft for one asset kind.
    pub fn new(kind: AssetKind) -> Self {
        Self {
            kind,
            name: String::new(),
            description: String::new(),
            metrics: Vec::new(),
            schema: Vec::new(),
            pricing: Pricing {
                price: 0.0,
                mode: PricingMode::OneTime,
                currency: crate::config::FT_DENOM.to_string(),
            },
            files: Vec::new(),
            url: String::new(),
            provider: None,
            uploaded: None,
        }
    }
}

// =============================================================================
// Catalog Types
// =============================================================================

/// Endpoints a provider exposes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    /// Artifact upload endpoint (multipart POST).
    pub upload: String,
}

/// A hosting provider as listed in the marketplace catalog.
///
/// Read-only: the pipeline selects providers, it never owns or
/// mutates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    /// DID of the provider node.
    pub provider_did: String,
    /// Display name.
    pub name: String,
    /// Hosting cost charged per published asset.
    pub hosting_cost: f64,
    /// Service endpoints.
    pub endpoints: ProviderEndpoints,
    /// Advertised region, when known.
    #[serde(default)]
    pub region: Option<String>,
    /// Advertised storage capacity, when known.
    #[serde(default)]
    pub storage: Option<String>,
}

/// A platform grouping providers in the two-level catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    pub providers: Vec<Provider>,
}

/// What the publish pipeline keeps from a provider selection.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderChoice {
    pub provider_did: String,
    pub name: String,
    pub hosting_cost: f64,
    pub upload_endpoint: String,
}

impl From<&Provider> for ProviderChoice {
    fn from(p: &Provider) -> Self {
        Self {
            provider_did: p.provider_did.clone(),
            name: p.name.clone(),
            hosting_cost: p.hosting_cost,
            upload_endpoint: p.endpoints.upload.clone(),
        }
    }
}

// =============================================================================
// Wallet Types
// =============================================================================

/// Connected wallet identity.
///
/// Created on successful sign-in, held in the session context and
/// mirrored to localStorage; cleared on disconnect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletIdentity {
    /// Decentralized identifier (account address).
    pub did: String,
    /// Display name chosen in the extension.
    pub username: String,
}

/// Envelope every extension call resolves with.
///
/// `status` is the single success discriminant; `data` carries the
/// call-specific body when present.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletEnvelope<T> {
    pub status: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Body of a failed (or occasionally successful) contract execution.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResultMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Extension response to `signIn()`.
pub type SignInResult = WalletEnvelope<WalletIdentity>;

/// Extension response to `executeContract()`.
pub type ContractResult = WalletEnvelope<ResultMessage>;

// =============================================================================
// Upload Wire Types
// =============================================================================

/// Provider upload endpoint response.
///
/// The provider wraps its own storage response, hence the
/// double-nested `data.data`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadEnvelope {
    pub status: bool,
    #[serde(default)]
    pub data: Option<UploadData>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadData {
    pub data: UploadedAsset,
}

/// Identity of an artifact the provider accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    /// Provider-assigned asset id, referenced by the contract payload.
    pub asset_id: String,
    /// Stored file name, absent for url-reference submissions.
    #[serde(default)]
    pub file_name: Option<String>,
}

// =============================================================================
// Contract Wire Types
// =============================================================================

/// Inner publish payload.
///
/// Built once per publish, immutable, and serialized to a JSON string
/// inside [`ExecuteRequest::smart_contract_data`]. Field names are the
/// contract's own (snake_case on the wire).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractPayload {
    pub publish_asset: PublishAsset,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublishAsset {
    pub asset_owner_did: String,
    pub asset_publish_description: String,
    pub asset_value: f64,
    pub depin_provider_did: String,
    pub depin_hosting_cost: f64,
    pub ft_denom: String,
    pub ft_denom_creator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_filename: Option<String>,
}

/// Outer execute-contract request submitted to the extension.
///
/// camelCase on the wire, matching the extension's API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    /// Human-readable comment shown in the signing popup.
    pub comment: String,
    /// DID of the signer.
    pub executor_addr: String,
    /// Always [`crate::config::QUORUM_TYPE`].
    pub quorum_type: u8,
    /// JSON string of [`ContractPayload`].
    pub smart_contract_data: String,
    /// Deployed contract token.
    pub smart_contract_token: String,
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
///
/// Unified error type for all frontend operations. Variants whose text
/// is surfaced to the user directly (`Validation`, `Upload`,
/// `Contract`) carry the complete user-facing message so display is
/// verbatim.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AppError {
    /// No wallet entry point in the page; fatal for the attempted
    /// action, the user must install or enable the extension.
    #[error("No Minerva wallet extension found. Please install or enable the extension to continue.")]
    ExtensionUnavailable,

    /// Sign-in or connect-handshake failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Draft failed a step guard; shown inline, blocks the transition.
    #[error("{0}")]
    Validation(String),

    /// Provider endpoint rejected the artifact.
    #[error("{0}")]
    Upload(String),

    /// Contract execution failed; extension message kept verbatim.
    #[error("{0}")]
    Contract(String),

    /// Network/HTTP error outside the upload path.
    #[error("Network error: {0}")]
    Network(String),
}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_envelope_deserializes() {
        let json = r#"{"status": true, "data": {"did": "did:minerva:abc123", "username": "ada"}}"#;
        let parsed: SignInResult = serde_json::from_str(json).unwrap();
        assert!(parsed.status);
        let identity = parsed.data.unwrap();
        assert_eq!(identity.did, "did:minerva:abc123");
        assert_eq!(identity.username, "ada");
    }

    #[test]
    fn contract_result_tolerates_missing_data() {
        let parsed: ContractResult = serde_json::from_str(r#"{"status": false}"#).unwrap();
        assert!(!parsed.status);
        assert!(parsed.data.is_none());

        let parsed: ContractResult =
            serde_json::from_str(r#"{"status": false, "data": {"message": "user rejected"}}"#)
                .unwrap();
        assert_eq!(parsed.data.unwrap().message.as_deref(), Some("user rejected"));
    }

    #[test]
    fn upload_envelope_is_double_nested() {
        let json = r#"{
            "status": true,
            "data": {
                "data": {
                    "assetId": "A1",
                    "fileName": "1700000000000_weights.bin"
                }
            }
        }"#;
        let parsed: UploadEnvelope = serde_json::from_str(json).unwrap();
        assert!(parsed.status);
        let asset = parsed.data.unwrap().data;
        assert_eq!(asset.asset_id, "A1");
        assert_eq!(asset.file_name.as_deref(), Some("1700000000000_weights.bin"));
    }

    #[test]
    fn execute_request_serializes_camel_case() {
        let req = ExecuteRequest {
            comment: "publish".into(),
            executor_addr: "did:minerva:abc".into(),
            quorum_type: 2,
            smart_contract_data: "{}".into(),
            smart_contract_token: "tok".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["executorAddr"], "did:minerva:abc");
        assert_eq!(value["quorumType"], 2);
        assert_eq!(value["smartContractData"], "{}");
        assert_eq!(value["smartContractToken"], "tok");
    }

    #[test]
    fn publish_payload_skips_absent_optionals() {
        let payload = ContractPayload {
            publish_asset: PublishAsset {
                asset_owner_did: "did:minerva:abc".into(),
                asset_publish_description: "desc".into(),
                asset_value: 12.5,
                depin_provider_did: "did:minerva:prov".into(),
                depin_hosting_cost: 0.4,
                ft_denom: "MVA".into(),
                ft_denom_creator: "did:minerva:creator".into(),
                asset_id: None,
                asset_metadata: None,
                asset_filename: None,
            },
        };
        let value = serde_json::to_value(&payload).unwrap();
        let inner = value.get("publish_asset").unwrap();
        assert!(inner.get("asset_id").is_none());
        assert!(inner.get("asset_metadata").is_none());
        assert_eq!(inner["depin_hosting_cost"], 0.4);
    }

    #[test]
    fn provider_catalog_entry_deserializes() {
        let json = r#"{
            "providerDid": "did:minerva:prov1",
            "name": "Helios Node",
            "hostingCost": 0.35,
            "endpoints": {"upload": "https://helios.host/api/upload"},
            "region": "eu-west"
        }"#;
        let provider: Provider = serde_json::from_str(json).unwrap();
        assert_eq!(provider.hosting_cost, 0.35);
        assert_eq!(provider.endpoints.upload, "https://helios.host/api/upload");
        assert!(provider.storage.is_none());

        let choice = ProviderChoice::from(&provider);
        assert_eq!(choice.provider_did, "did:minerva:prov1");
        assert_eq!(choice.upload_endpoint, "https://helios.host/api/upload");
    }
}
