//! Artifact upload to the selected hosting provider.
//!
//! The provider exposes one multipart endpoint accepting either a
//! binary `file` (renamed with an epoch-millisecond prefix) or a `url`
//! reference, plus `assetName` / `assetType` fields. The response
//! wraps the provider's own storage reply, hence the double-nested
//! envelope in [`crate::types::UploadEnvelope`].

use gloo_net::http::Request;
use web_sys::FormData;

use crate::types::{AppError, AppResult, AssetKind, SelectedFile, UploadEnvelope, UploadedAsset};

/// Where publish drafts send their artifact before the contract runs.
///
/// Injected into the publish driver so unit tests script the provider
/// instead of standing up HTTP.
#[allow(async_fn_in_trait)] // single-threaded wasm; no Send bound wanted
pub trait ArtifactStore {
    /// Upload the draft's file. `asset_name` is the draft name shown
    /// in the marketplace, not the file name.
    async fn upload_file(
        &self,
        endpoint: &str,
        file: &SelectedFile,
        asset_name: &str,
        kind: AssetKind,
    ) -> AppResult<UploadedAsset>;

    /// Submit a reference URL instead of a file.
    async fn upload_reference(
        &self,
        endpoint: &str,
        url: &str,
        asset_name: &str,
        kind: AssetKind,
    ) -> AppResult<UploadedAsset>;
}

/// Production store POSTing multipart forms to the provider endpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProviderStore;

impl ProviderStore {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactStore for ProviderStore {
    async fn upload_file(
        &self,
        endpoint: &str,
        file: &SelectedFile,
        asset_name: &str,
        kind: AssetKind,
    ) -> AppResult<UploadedAsset> {
        let handle = file.handle.as_ref().ok_or_else(|| {
            AppError::Upload("The selected file is no longer available. Choose it again.".to_string())
        })?;

        let stamped = stamped_file_name(js_sys::Date::now() as u64, &file.name);
        log::info!("📤 Uploading {} as {} to {}", file.name, stamped, endpoint);

        let form = FormData::new()
            .map_err(|e| AppError::Upload(format!("Failed to create form data: {:?}", e)))?;
        form.append_with_blob_and_filename("file", handle, &stamped)
            .map_err(|e| AppError::Upload(format!("Failed to append file: {:?}", e)))?;
        form.append_with_str("assetName", asset_name)
            .map_err(|e| AppError::Upload(format!("Failed to append field: {:?}", e)))?;
        form.append_with_str("assetType", kind.as_str())
            .map_err(|e| AppError::Upload(format!("Failed to append field: {:?}", e)))?;

        send_form(endpoint, form).await
    }

    async fn upload_reference(
        &self,
        endpoint: &str,
        url: &str,
        asset_name: &str,
        kind: AssetKind,
    ) -> AppResult<UploadedAsset> {
        let generated = reference_asset_name(js_sys::Date::now() as u64, asset_name);
        log::info!("📤 Submitting reference {} as {} to {}", url, generated, endpoint);

        let form = FormData::new()
            .map_err(|e| AppError::Upload(format!("Failed to create form data: {:?}", e)))?;
        form.append_with_str("url", url)
            .map_err(|e| AppError::Upload(format!("Failed to append field: {:?}", e)))?;
        form.append_with_str("assetName", &generated)
            .map_err(|e| AppError::Upload(format!("Failed to append field: {:?}", e)))?;
        form.append_with_str("assetType", kind.as_str())
            .map_err(|e| AppError::Upload(format!("Failed to append field: {:?}", e)))?;

        send_form(endpoint, form).await
    }
}

async fn send_form(endpoint: &str, form: FormData) -> AppResult<UploadedAsset> {
    let request = Request::post(endpoint)
        .body(form)
        .map_err(|e| AppError::Upload(format!("Failed to build request: {}", e)))?;

    let response = request
        .send()
        .await
        .map_err(|e| AppError::Upload(format!("HTTP request failed: {}", e)))?;

    if !response.ok() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AppError::Upload(format!(
            "Provider error ({}): {}",
            response.status(),
            error_text
        )));
    }

    let envelope = response
        .json::<UploadEnvelope>()
        .await
        .map_err(|e| AppError::Upload(format!("Failed to parse response: {}", e)))?;

    accepted_asset(envelope)
}

/// Unwrap the provider envelope into the accepted asset.
fn accepted_asset(envelope: UploadEnvelope) -> AppResult<UploadedAsset> {
    if !envelope.status {
        return Err(AppError::Upload(
            "The provider rejected the upload.".to_string(),
        ));
    }
    envelope
        .data
        .map(|d| d.data)
        .ok_or_else(|| AppError::Upload("Provider response missing asset data.".to_string()))
}

/// Upload name for a file: `<epoch-ms>_<original-name>`.
fn stamped_file_name(epoch_ms: u64, original: &str) -> String {
    format!("{}_{}", epoch_ms, original)
}

/// Generated asset name for url submissions: `ref-<epoch-ms>-<slug>`.
fn reference_asset_name(epoch_ms: u64, draft_name: &str) -> String {
    let slug: String = draft_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("ref-{}-{}", epoch_ms, slug.trim_matches('-'))
}
