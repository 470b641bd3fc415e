//! Cross-cutting UI state: loader flags and the wallet session.
//!
//! The loader registry is a plain struct so its invariants are
//! testable without a reactive runtime; the app wraps it in one
//! `RwSignal` and shares it through context.

use leptos::*;
use thiserror::Error;

use crate::types::{AssetKind, WalletIdentity};

// =============================================================================
// Loader Registry
// =============================================================================

/// The long-running operations tracked by the loader registry.
///
/// Entries are independent: two different operations may run
/// concurrently, and no entry implies mutual exclusion with another.
/// `BuyAsset`, `DownloadAsset` and `BuyTokens` are set by views outside
/// this crate's publish core; the registry defines the full set so the
/// busy indicator covers them uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoaderOp {
    UploadModel,
    UploadDataset,
    BuyAsset,
    DownloadAsset,
    BuyTokens,
}

impl LoaderOp {
    pub const ALL: [LoaderOp; 5] = [
        LoaderOp::UploadModel,
        LoaderOp::UploadDataset,
        LoaderOp::BuyAsset,
        LoaderOp::DownloadAsset,
        LoaderOp::BuyTokens,
    ];

    /// Stable name, used for display and logging.
    pub fn name(&self) -> &'static str {
        match self {
            LoaderOp::UploadModel => "upload-model",
            LoaderOp::UploadDataset => "upload-dataset",
            LoaderOp::BuyAsset => "buy-asset",
            LoaderOp::DownloadAsset => "download-asset",
            LoaderOp::BuyTokens => "buy-tokens",
        }
    }

    /// Loader tracking the publish pipeline for an asset kind.
    pub fn for_upload(kind: AssetKind) -> LoaderOp {
        match kind {
            AssetKind::Model => LoaderOp::UploadModel,
            AssetKind::Dataset => LoaderOp::UploadDataset,
        }
    }
}

/// Returned by [`LoaderRegistry::begin`] when the same operation is
/// already running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{} is already in progress", .0.name())]
pub struct LoaderBusy(pub LoaderOp);

/// One named boolean per independent long-running operation.
///
/// Every code path that sets a flag `true` must set it back to `false`
/// on every exit; [`LoaderGuard`] enforces that structurally for the
/// publish pipeline. A flag left `true` after an error is a defect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderRegistry {
    flags: [bool; LoaderOp::ALL.len()],
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self {
            flags: [false; LoaderOp::ALL.len()],
        }
    }

    fn index(op: LoaderOp) -> usize {
        LoaderOp::ALL.iter().position(|o| *o == op).unwrap_or(0)
    }

    /// Set a single flag.
    pub fn set(&mut self, op: LoaderOp, on: bool) {
        self.flags[Self::index(op)] = on;
    }

    /// Mark an operation as started, rejecting re-entrancy on the same
    /// name. Different names stay independent.
    pub fn begin(&mut self, op: LoaderOp) -> Result<(), LoaderBusy> {
        if self.is_loading(op) {
            return Err(LoaderBusy(op));
        }
        self.set(op, true);
        Ok(())
    }

    /// Mark an operation as finished.
    pub fn finish(&mut self, op: LoaderOp) {
        self.set(op, false);
    }

    /// Clear every entry.
    pub fn reset(&mut self) {
        self.flags = [false; LoaderOp::ALL.len()];
    }

    pub fn is_loading(&self, op: LoaderOp) -> bool {
        self.flags[Self::index(op)]
    }

    /// True when any operation is running.
    pub fn has_any(&self) -> bool {
        self.flags.iter().any(|f| *f)
    }

    /// Names of the operations currently running.
    pub fn active_names(&self) -> Vec<&'static str> {
        LoaderOp::ALL
            .iter()
            .filter(|op| self.is_loading(**op))
            .map(|op| op.name())
            .collect()
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII wrapper around a loader flag.
///
/// Acquiring sets the flag (rejecting a duplicate run of the same
/// operation); dropping clears it, so the flag cannot survive an early
/// return or an unwind.
pub struct LoaderGuard {
    loaders: RwSignal<LoaderRegistry>,
    op: LoaderOp,
}

impl LoaderGuard {
    pub fn acquire(loaders: RwSignal<LoaderRegistry>, op: LoaderOp) -> Result<Self, LoaderBusy> {
        let mut outcome = Ok(());
        loaders.update(|l| outcome = l.begin(op));
        outcome.map(|_| Self { loaders, op })
    }
}

impl Drop for LoaderGuard {
    fn drop(&mut self) {
        let op = self.op;
        // try_update: the surrounding reactive scope may already be
        // disposed during teardown.
        let _ = self.loaders.try_update(|l| l.finish(op));
    }
}

/// Install the loader registry signal at the app root.
pub fn provide_loaders() -> RwSignal<LoaderRegistry> {
    let loaders = create_rw_signal(LoaderRegistry::new());
    provide_context(loaders);
    loaders
}

/// Grab the loader registry from context.
pub fn use_loaders() -> RwSignal<LoaderRegistry> {
    expect_context::<RwSignal<LoaderRegistry>>()
}

// =============================================================================
// Wallet Session
// =============================================================================

/// Wallet session shared through context.
///
/// `None` means no wallet is connected; every wallet-gated surface
/// reads this instead of poking at the extension global.
#[derive(Clone, Copy)]
pub struct Session {
    pub identity: RwSignal<Option<WalletIdentity>>,
}

impl Session {
    pub fn connected(&self) -> bool {
        self.identity.with(|i| i.is_some())
    }

    pub fn did(&self) -> Option<String> {
        self.identity.with(|i| i.as_ref().map(|w| w.did.clone()))
    }

    pub fn set(&self, identity: WalletIdentity) {
        self.identity.update(|i| *i = Some(identity));
    }

    pub fn clear(&self) {
        self.identity.update(|i| *i = None);
    }
}

/// Install the session at the app root, seeded from the localStorage
/// cache when one survives a reload.
pub fn provide_session(cached: Option<WalletIdentity>) -> Session {
    let session = Session {
        identity: create_rw_signal(cached),
    };
    provide_context(session);
    session
}

/// Grab the wallet session from context.
pub fn use_session() -> Session {
    expect_context::<Session>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_reset_clears_everything() {
        let mut loaders = LoaderRegistry::new();
        loaders.set(LoaderOp::UploadModel, true);
        assert!(loaders.is_loading(LoaderOp::UploadModel));
        assert_eq!(loaders.active_names(), vec!["upload-model"]);

        loaders.reset();
        assert!(!loaders.is_loading(LoaderOp::UploadModel));
        assert!(loaders.active_names().is_empty());
        assert!(!loaders.has_any());
    }

    #[test]
    fn names_are_independent() {
        let mut loaders = LoaderRegistry::new();
        loaders.set(LoaderOp::UploadModel, true);
        loaders.set(LoaderOp::BuyTokens, true);

        assert!(loaders.is_loading(LoaderOp::UploadModel));
        assert!(loaders.is_loading(LoaderOp::BuyTokens));
        assert!(!loaders.is_loading(LoaderOp::UploadDataset));
        assert_eq!(loaders.active_names(), vec!["upload-model", "buy-tokens"]);

        loaders.finish(LoaderOp::UploadModel);
        assert!(!loaders.is_loading(LoaderOp::UploadModel));
        assert!(loaders.is_loading(LoaderOp::BuyTokens));
    }

    #[test]
    fn begin_rejects_reentrancy_on_same_name() {
        let mut loaders = LoaderRegistry::new();
        assert!(loaders.begin(LoaderOp::UploadDataset).is_ok());
        assert_eq!(
            loaders.begin(LoaderOp::UploadDataset),
            Err(LoaderBusy(LoaderOp::UploadDataset))
        );
        // A different name is not blocked.
        assert!(loaders.begin(LoaderOp::UploadModel).is_ok());

        loaders.finish(LoaderOp::UploadDataset);
        assert!(loaders.begin(LoaderOp::UploadDataset).is_ok());
    }

    #[test]
    fn guard_clears_flag_on_drop() {
        let runtime = leptos::create_runtime();
        let loaders = create_rw_signal(LoaderRegistry::new());

        {
            let guard = LoaderGuard::acquire(loaders, LoaderOp::UploadModel).unwrap();
            assert!(loaders.with(|l| l.is_loading(LoaderOp::UploadModel)));
            // Same name is busy while the guard lives.
            assert!(LoaderGuard::acquire(loaders, LoaderOp::UploadModel).is_err());
            drop(guard);
        }

        assert!(!loaders.with(|l| l.is_loading(LoaderOp::UploadModel)));
        assert!(loaders.with(|l| !l.has_any()));
        runtime.dispose();
    }
}
