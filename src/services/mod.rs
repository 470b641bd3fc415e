//! Wallet, provider, and marketplace services.
//!
//! This module groups everything that leaves the page:
//!
//! # Services
//!
//! - [`extension`] - injected wallet extension entry point
//! - [`bridge`] - `postMessage` handshake with the extension
//! - [`upload`] - artifact upload to the selected hosting provider
//! - [`contract`] - publish-contract payloads and execution
//! - [`catalog`] - provider catalog from the marketplace API
//! - [`storage`] - `localStorage` session and publish-history cache

pub mod bridge;
pub mod catalog;
pub mod contract;
pub mod extension;
pub mod storage;
pub mod upload;

pub use bridge::*;
pub use catalog::*;
pub use contract::*;
pub use extension::*;
pub use storage::*;
pub use upload::*;
