//! Provider catalog queries against the marketplace API.

use gloo_net::http::Request;
use serde::Deserialize;

use crate::config::MARKET_API;
use crate::types::{AppError, AppResult, Platform};

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    pub status: bool,
    #[serde(default)]
    pub data: Option<Vec<Platform>>,
}

/// Fetch the hosting catalog: platforms, each with its providers.
pub async fn fetch_platforms() -> AppResult<Vec<Platform>> {
    let url = format!("{}/api/depin/platforms", MARKET_API);
    log::info!("🌐 Fetching provider catalog from {}", url);

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(AppError::Network(format!(
            "catalog request returned {}",
            response.status()
        )));
    }

    let body: CatalogResponse = response
        .json()
        .await
        .map_err(|e| AppError::Network(format!("invalid catalog response: {}", e)))?;

    if !body.status {
        return Err(AppError::Network("catalog request rejected".to_string()));
    }

    let platforms = body.data.unwrap_or_default();
    log::info!("📦 Catalog loaded: {} platform(s)", platforms.len());
    Ok(platforms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_response_decodes_platform_tree() {
        let json = r#"{
            "status": true,
            "data": [{
                "name": "Akash",
                "providers": [{
                    "providerDid": "did:minerva:prov1",
                    "name": "Helios Node",
                    "hostingCost": 0.35,
                    "endpoints": {"upload": "https://helios.host/api/upload"},
                    "region": "eu-west",
                    "storage": "2TB NVMe"
                }]
            }]
        }"#;
        let body: CatalogResponse = serde_json::from_str(json).unwrap();
        let platforms = body.data.unwrap();
        assert_eq!(platforms.len(), 1);
        assert_eq!(
            platforms[0].providers[0].endpoints.upload,
            "https://helios.host/api/upload"
        );
    }

    #[test]
    fn catalog_response_tolerates_missing_data() {
        let body: CatalogResponse = serde_json::from_str(r#"{"status": false}"#).unwrap();
        assert!(!body.status);
        assert!(body.data.is_none());
    }
}
