//! Publish pipeline: wizard state machine and submission driver.
//!
//! All form state lives in one [`PublishState`] value and every change
//! goes through [`reduce`], a pure function over a tagged action enum.
//! Components dispatch actions; nothing mutates the draft directly.
//! The async side effects (artifact upload, contract execution) live in
//! [`submit_publish`], which talks to the world only through the
//! injected [`WalletExtension`] and [`ArtifactStore`] traits and feeds
//! its outcomes back as actions.

use leptos::*;

use crate::config::MAX_UPLOAD_BYTES;
use crate::services::contract;
use crate::services::extension::WalletExtension;
use crate::services::upload::ArtifactStore;
use crate::state::{LoaderGuard, LoaderOp, LoaderRegistry};
use crate::types::{
    AppError, AssetKind, MetricEntry, PricingMode, ProviderChoice, SchemaField, SelectedFile,
    UploadDraft, UploadedAsset, WalletIdentity,
};

// =============================================================================
// Validation Messages
// =============================================================================

pub const MSG_SOURCE_REQUIRED: &str = "Please upload a file or provide a reference URL.";
pub const MSG_SOURCE_EXCLUSIVE: &str =
    "Provide one or the other: an uploaded file or a reference URL, not both.";
pub const MSG_NAME_REQUIRED: &str = "Give the asset a name before continuing.";
pub const MSG_PRICE_INVALID: &str = "Price must be greater than zero.";
pub const MSG_PROVIDER_REQUIRED: &str = "Select a hosting provider before publishing.";

// Keep in sync with config::MAX_UPLOAD_BYTES.
const UPLOAD_LIMIT_LABEL: &str = "1 GiB";

// =============================================================================
// State Machine
// =============================================================================

/// Where the wizard currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishStep {
    /// Name, description, and the file-or-url source.
    Details,
    /// Dataset column schema; skipped for models.
    Metadata,
    /// Price, payment mode, currency.
    Pricing,
    /// Read-only summary plus provider selection.
    Review,
    /// Upload and contract execution running; inputs locked.
    InFlight,
    /// Published; success notice on screen.
    Done,
    /// Publish attempt failed; review screen with the error banner.
    Failed,
}

impl PublishStep {
    /// Steps whose screens accept draft edits.
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            PublishStep::Details | PublishStep::Metadata | PublishStep::Pricing
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            PublishStep::Details => "Details",
            PublishStep::Metadata => "Metadata",
            PublishStep::Pricing => "Pricing",
            PublishStep::Review => "Review",
            PublishStep::InFlight => "Publishing",
            PublishStep::Done => "Published",
            PublishStep::Failed => "Failed",
        }
    }
}

/// The pre-flight steps the progress header shows for a kind.
pub fn wizard_steps(kind: AssetKind) -> &'static [PublishStep] {
    match kind {
        AssetKind::Model => &[PublishStep::Details, PublishStep::Pricing, PublishStep::Review],
        AssetKind::Dataset => &[
            PublishStep::Details,
            PublishStep::Metadata,
            PublishStep::Pricing,
            PublishStep::Review,
        ],
    }
}

/// Complete wizard state: current step, the draft, and the error line.
#[derive(Clone, Debug, PartialEq)]
pub struct PublishState {
    pub step: PublishStep,
    pub draft: UploadDraft,
    /// Message shown in the banner; cleared by edits and transitions.
    pub error: Option<String>,
}

impl PublishState {
    pub fn new(kind: AssetKind) -> Self {
        Self {
            step: PublishStep::Details,
            draft: UploadDraft::new(kind),
            error: None,
        }
    }

    /// The review screen stays up after a failure, with the banner.
    pub fn renders_review(&self) -> bool {
        matches!(self.step, PublishStep::Review | PublishStep::Failed)
    }

    /// Publish is enabled only once a provider is chosen; the review
    /// screen renders the button disabled otherwise.
    pub fn publish_ready(&self) -> bool {
        self.renders_review() && self.draft.provider.is_some()
    }
}

/// Everything that can happen to the wizard.
#[derive(Clone, Debug, PartialEq)]
pub enum PublishAction {
    SetName(String),
    SetDescription(String),
    AddMetric(MetricEntry),
    RemoveMetric(usize),
    AddSchemaField(SchemaField),
    RemoveSchemaField(usize),
    SetPrice(f64),
    SetPricingMode(PricingMode),
    SetCurrency(String),
    AddFile(SelectedFile),
    RemoveFile(usize),
    SetUrl(String),
    SelectProvider(ProviderChoice),
    Next,
    Back,
    Cancel,
    Submit,
    /// Pre-flight refusal (extension missing); banner without a step
    /// change.
    Blocked(String),
    /// Provider accepted the artifact; recorded so a retry skips the
    /// upload.
    UploadAccepted(UploadedAsset),
    PublishSucceeded,
    PublishFailed(String),
    /// Close the success notice and start a fresh draft.
    Dismiss,
}

/// Source invariant: exactly one of files / url, checked before the
/// name so a completely empty form reports the missing source first.
fn validate_source(draft: &UploadDraft) -> Result<(), String> {
    let has_file = !draft.files.is_empty();
    let has_url = !draft.url.trim().is_empty();
    match (has_file, has_url) {
        (false, false) => Err(MSG_SOURCE_REQUIRED.to_string()),
        (true, true) => Err(MSG_SOURCE_EXCLUSIVE.to_string()),
        _ => Ok(()),
    }
}

fn validate_details(draft: &UploadDraft) -> Result<(), String> {
    validate_source(draft)?;
    if draft.name.trim().is_empty() {
        return Err(MSG_NAME_REQUIRED.to_string());
    }
    Ok(())
}

/// Apply one action to the wizard state.
///
/// Pure and total: actions that make no sense for the current step are
/// ignored, so a stale button click can never corrupt the draft. Field
/// edits are only honored on editing steps, provider selection only on
/// the review screen, and the three outcome actions only in flight.
pub fn reduce(mut state: PublishState, action: PublishAction) -> PublishState {
    use PublishAction as A;
    use PublishStep as S;

    let editing = state.step.is_editing();
    match action {
        A::SetName(v) if editing => {
            state.draft.name = v;
            state.error = None;
        }
        A::SetDescription(v) if editing => {
            state.draft.description = v;
            state.error = None;
        }
        A::AddMetric(m) if editing => {
            state.draft.metrics.push(m);
            state.error = None;
        }
        A::RemoveMetric(i) if editing => {
            if i < state.draft.metrics.len() {
                state.draft.metrics.remove(i);
            }
            state.error = None;
        }
        A::AddSchemaField(f) if editing => {
            state.draft.schema.push(f);
            state.error = None;
        }
        A::RemoveSchemaField(i) if editing => {
            if i < state.draft.schema.len() {
                state.draft.schema.remove(i);
            }
            state.error = None;
        }
        A::SetPrice(p) if editing => {
            state.draft.pricing.price = p;
            state.error = None;
        }
        A::SetPricingMode(m) if editing => {
            state.draft.pricing.mode = m;
            state.error = None;
        }
        A::SetCurrency(c) if editing => {
            state.draft.pricing.currency = c;
            state.error = None;
        }
        A::AddFile(file) if editing => {
            if file.size > MAX_UPLOAD_BYTES {
                state.error = Some(format!(
                    "'{}' is larger than the {} upload limit.",
                    file.name, UPLOAD_LIMIT_LABEL
                ));
            } else {
                state.draft.files.push(file);
                state.error = None;
            }
        }
        A::RemoveFile(i) if editing => {
            if i < state.draft.files.len() {
                state.draft.files.remove(i);
            }
            state.error = None;
        }
        A::SetUrl(u) if editing => {
            state.draft.url = u;
            state.error = None;
        }

        A::SelectProvider(p) if state.renders_review() => {
            state.draft.provider = Some(p);
            state.error = None;
        }

        A::Next => match state.step {
            S::Details => match validate_details(&state.draft) {
                Ok(()) => {
                    state.error = None;
                    state.step = match state.draft.kind {
                        AssetKind::Dataset => S::Metadata,
                        AssetKind::Model => S::Pricing,
                    };
                }
                Err(msg) => state.error = Some(msg),
            },
            S::Metadata => {
                state.error = None;
                state.step = S::Pricing;
            }
            S::Pricing => {
                let price = state.draft.pricing.price;
                if price > 0.0 && price.is_finite() {
                    state.error = None;
                    state.step = S::Review;
                } else {
                    state.error = Some(MSG_PRICE_INVALID.to_string());
                }
            }
            _ => {}
        },

        A::Back => match state.step {
            S::Metadata => {
                state.step = S::Details;
                state.error = None;
            }
            S::Pricing => {
                state.step = match state.draft.kind {
                    AssetKind::Dataset => S::Metadata,
                    AssetKind::Model => S::Details,
                };
                state.error = None;
            }
            S::Review => {
                state.step = S::Pricing;
                state.error = None;
            }
            S::Failed => {
                state.step = S::Review;
                state.error = None;
            }
            _ => {}
        },

        A::Cancel => {
            // A running publish cannot be abandoned from the UI.
            if state.step != S::InFlight {
                return PublishState::new(state.draft.kind);
            }
        }

        A::Submit => {
            if state.renders_review() {
                if state.draft.provider.is_none() {
                    state.error = Some(MSG_PROVIDER_REQUIRED.to_string());
                } else if let Err(msg) = validate_source(&state.draft) {
                    state.error = Some(msg);
                } else {
                    state.error = None;
                    state.step = S::InFlight;
                }
            }
        }

        A::Blocked(msg) => {
            if state.renders_review() {
                state.error = Some(msg);
            }
        }

        A::UploadAccepted(asset) => {
            if state.step == S::InFlight {
                state.draft.uploaded = Some(asset);
            }
        }
        A::PublishSucceeded => {
            if state.step == S::InFlight {
                state.step = S::Done;
                state.error = None;
            }
        }
        A::PublishFailed(msg) => {
            if state.step == S::InFlight {
                state.step = S::Failed;
                state.error = Some(msg);
            }
        }
        A::Dismiss => {
            if state.step == S::Done {
                return PublishState::new(state.draft.kind);
            }
        }

        // Action out of place for the current step.
        _ => {}
    }
    state
}

/// Apply an action to the shared wizard signal.
///
/// Dropped silently when the signal's scope is already disposed, so a
/// late async outcome cannot panic a torn-down wizard.
pub fn dispatch(state: RwSignal<PublishState>, action: PublishAction) {
    let _ = state.try_update(|s| *s = reduce(s.clone(), action));
}

// =============================================================================
// Submission Driver
// =============================================================================

/// Run the publish submission: upload the artifact (once), then execute
/// the publish contract, reporting every outcome back through actions.
///
/// Order of operations:
/// 1. Refuse before touching any state when the extension is missing.
/// 2. `Submit` runs the step guards; if they refuse, stop.
/// 3. Claim the kind's loader flag; a concurrent run of the same
///    operation fails the attempt instead of racing it.
/// 4. Upload the file or reference, unless a previous attempt already
///    got the artifact accepted.
/// 5. Build and execute the contract.
///
/// The loader flag clears on every exit via the guard. If the wizard's
/// route is torn down while an await is pending, the run stops before
/// the contract call instead of touching the disposed signal.
pub async fn submit_publish<E, S>(
    ext: &E,
    store: &S,
    loaders: RwSignal<LoaderRegistry>,
    state: RwSignal<PublishState>,
    identity: WalletIdentity,
) where
    E: WalletExtension,
    S: ArtifactStore,
{
    if !ext.is_available() {
        log::warn!("⚠️ Publish attempted without a wallet extension");
        dispatch(
            state,
            PublishAction::Blocked(AppError::ExtensionUnavailable.to_string()),
        );
        return;
    }

    // Another driver invocation is already running this wizard.
    if state.with_untracked(|s| s.step == PublishStep::InFlight) {
        return;
    }

    dispatch(state, PublishAction::Submit);
    if state.with_untracked(|s| s.step != PublishStep::InFlight) {
        // A guard refused; its message is already on screen.
        return;
    }

    let draft = state.with_untracked(|s| s.draft.clone());
    let kind = draft.kind;
    log::info!("🚀 Publishing {} '{}'", kind.as_str(), draft.name);

    let _guard = match LoaderGuard::acquire(loaders, LoaderOp::for_upload(kind)) {
        Ok(guard) => guard,
        Err(busy) => {
            dispatch(state, PublishAction::PublishFailed(busy.to_string()));
            return;
        }
    };

    let Some(provider) = draft.provider.clone() else {
        // Submit guard requires a provider; unreachable in practice.
        dispatch(
            state,
            PublishAction::PublishFailed(MSG_PROVIDER_REQUIRED.to_string()),
        );
        return;
    };

    if draft.uploaded.is_none() {
        let outcome = if let Some(file) = draft.files.first() {
            store
                .upload_file(&provider.upload_endpoint, file, &draft.name, kind)
                .await
        } else {
            store
                .upload_reference(&provider.upload_endpoint, &draft.url, &draft.name, kind)
                .await
        };
        match outcome {
            Ok(asset) => dispatch(state, PublishAction::UploadAccepted(asset)),
            Err(err) => {
                dispatch(state, PublishAction::PublishFailed(err.to_string()));
                return;
            }
        }
    } else {
        log::info!("↩️ Artifact already uploaded, retrying the contract only");
    }

    // The wizard may have been torn down while the upload ran.
    let Some(draft) = state.try_with_untracked(|s| s.draft.clone()) else {
        return;
    };
    let request = match contract::build_publish_request(&draft, &identity) {
        Ok(request) => request,
        Err(err) => {
            dispatch(state, PublishAction::PublishFailed(err.to_string()));
            return;
        }
    };

    match contract::execute(ext, &request).await {
        Ok(()) => dispatch(state, PublishAction::PublishSucceeded),
        Err(err) => dispatch(state, PublishAction::PublishFailed(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppResult, ContractResult, ExecuteRequest, ResultMessage, SignInResult};
    use futures::executor::block_on;
    use std::cell::RefCell;

    struct StubWallet {
        available: bool,
        replies: RefCell<Vec<AppResult<ContractResult>>>,
        calls: RefCell<Vec<ExecuteRequest>>,
    }

    impl StubWallet {
        fn with_replies(replies: Vec<AppResult<ContractResult>>) -> Self {
            Self {
                available: true,
                replies: RefCell::new(replies),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn absent() -> Self {
            Self {
                available: false,
                replies: RefCell::new(Vec::new()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl WalletExtension for StubWallet {
        fn is_available(&self) -> bool {
            self.available
        }
        async fn sign_in(&self) -> AppResult<SignInResult> {
            unreachable!("sign-in is not part of the publish flow")
        }
        async fn execute_contract(&self, req: &ExecuteRequest) -> AppResult<ContractResult> {
            self.calls.borrow_mut().push(req.clone());
            self.replies.borrow_mut().remove(0)
        }
    }

    #[derive(Default)]
    struct StubStore {
        fail: bool,
        file_calls: RefCell<Vec<(String, String)>>,
        url_calls: RefCell<Vec<(String, String)>>,
    }

    impl ArtifactStore for StubStore {
        async fn upload_file(
            &self,
            endpoint: &str,
            file: &SelectedFile,
            _asset_name: &str,
            _kind: AssetKind,
        ) -> AppResult<UploadedAsset> {
            self.file_calls
                .borrow_mut()
                .push((endpoint.to_string(), file.name.clone()));
            if self.fail {
                return Err(AppError::Upload("Provider error (503): unavailable".to_string()));
            }
            Ok(UploadedAsset {
                asset_id: "A1".to_string(),
                file_name: Some("1700000000000_weights.bin".to_string()),
            })
        }

        async fn upload_reference(
            &self,
            endpoint: &str,
            url: &str,
            _asset_name: &str,
            _kind: AssetKind,
        ) -> AppResult<UploadedAsset> {
            self.url_calls
                .borrow_mut()
                .push((endpoint.to_string(), url.to_string()));
            Ok(UploadedAsset {
                asset_id: "A2".to_string(),
                file_name: None,
            })
        }
    }

    fn ok_reply() -> AppResult<ContractResult> {
        Ok(ContractResult {
            status: true,
            data: None,
        })
    }

    fn failed_reply(message: &str) -> AppResult<ContractResult> {
        Ok(ContractResult {
            status: false,
            data: Some(ResultMessage {
                message: Some(message.to_string()),
            }),
        })
    }

    fn choice() -> ProviderChoice {
        ProviderChoice {
            provider_did: "did:minerva:prov1".to_string(),
            name: "Helios Node".to_string(),
            hosting_cost: 0.35,
            upload_endpoint: "https://helios.host/api/upload".to_string(),
        }
    }

    fn identity() -> WalletIdentity {
        WalletIdentity {
            did: "did:minerva:owner".to_string(),
            username: "ada".to_string(),
        }
    }

    fn reviewed(kind: AssetKind, with_file: bool) -> PublishState {
        let mut state = PublishState::new(kind);
        state.draft.name = "Sentiment v2".to_string();
        state.draft.description = "Binary sentiment classifier".to_string();
        if with_file {
            state.draft.files.push(SelectedFile::named("weights.bin", 2048.0));
        } else {
            state.draft.url = "https://example.org/data.csv".to_string();
        }
        state.draft.pricing.price = 12.5;
        state.draft.provider = Some(choice());
        state.step = PublishStep::Review;
        state
    }

    // ------------------------------------------------------------------
    // Reducer
    // ------------------------------------------------------------------

    #[test]
    fn empty_form_reports_missing_source_first() {
        // Name is also empty; the source check wins.
        let state = PublishState::new(AssetKind::Model);
        let next = reduce(state, PublishAction::Next);
        assert_eq!(next.step, PublishStep::Details);
        assert_eq!(next.error.as_deref(), Some(MSG_SOURCE_REQUIRED));
    }

    #[test]
    fn details_rejects_file_and_url_together() {
        let mut state = PublishState::new(AssetKind::Model);
        state.draft.name = "Sentiment v2".to_string();
        state.draft.files.push(SelectedFile::named("weights.bin", 1024.0));
        state.draft.url = "https://example.org/weights.bin".to_string();

        let next = reduce(state, PublishAction::Next);
        assert_eq!(next.step, PublishStep::Details);
        assert_eq!(next.error.as_deref(), Some(MSG_SOURCE_EXCLUSIVE));
    }

    #[test]
    fn details_requires_a_name_once_sourced() {
        let mut state = PublishState::new(AssetKind::Model);
        state.draft.files.push(SelectedFile::named("weights.bin", 1024.0));

        let next = reduce(state, PublishAction::Next);
        assert_eq!(next.error.as_deref(), Some(MSG_NAME_REQUIRED));
    }

    #[test]
    fn dataset_wizard_passes_through_metadata() {
        let mut state = PublishState::new(AssetKind::Dataset);
        state = reduce(state, PublishAction::SetName("Reviews 2024".to_string()));
        state = reduce(state, PublishAction::SetUrl("https://example.org/reviews.csv".to_string()));
        state = reduce(state, PublishAction::Next);
        assert_eq!(state.step, PublishStep::Metadata);

        state = reduce(
            state,
            PublishAction::AddSchemaField(SchemaField {
                name: "rating".to_string(),
                dtype: "int".to_string(),
            }),
        );
        state = reduce(state, PublishAction::Next);
        assert_eq!(state.step, PublishStep::Pricing);

        state = reduce(state, PublishAction::SetPrice(3.0));
        state = reduce(state, PublishAction::Next);
        assert_eq!(state.step, PublishStep::Review);
        assert_eq!(state.draft.schema.len(), 1);
    }

    #[test]
    fn model_wizard_skips_metadata() {
        let mut state = PublishState::new(AssetKind::Model);
        state = reduce(state, PublishAction::SetName("Sentiment v2".to_string()));
        state = reduce(
            state,
            PublishAction::AddFile(SelectedFile::named("weights.bin", 1024.0)),
        );
        state = reduce(state, PublishAction::Next);
        assert_eq!(state.step, PublishStep::Pricing);
        assert_eq!(
            wizard_steps(AssetKind::Model),
            &[PublishStep::Details, PublishStep::Pricing, PublishStep::Review]
        );
    }

    #[test]
    fn pricing_requires_a_positive_price() {
        let mut state = reviewed(AssetKind::Model, true);
        state.step = PublishStep::Pricing;
        state.draft.pricing.price = 0.0;

        let next = reduce(state, PublishAction::Next);
        assert_eq!(next.step, PublishStep::Pricing);
        assert_eq!(next.error.as_deref(), Some(MSG_PRICE_INVALID));
    }

    #[test]
    fn oversize_file_is_refused_with_the_limit_in_the_message() {
        let state = PublishState::new(AssetKind::Model);
        let huge = SelectedFile::named("dump.bin", MAX_UPLOAD_BYTES + 1.0);
        let next = reduce(state, PublishAction::AddFile(huge));
        assert!(next.draft.files.is_empty());
        assert!(next.error.as_deref().unwrap().contains(UPLOAD_LIMIT_LABEL));
    }

    #[test]
    fn submit_requires_a_provider() {
        let mut state = reviewed(AssetKind::Model, true);
        state.draft.provider = None;

        let next = reduce(state, PublishAction::Submit);
        assert_eq!(next.step, PublishStep::Review);
        assert_eq!(next.error.as_deref(), Some(MSG_PROVIDER_REQUIRED));
    }

    #[test]
    fn publish_stays_disabled_until_a_provider_is_chosen() {
        let mut state = reviewed(AssetKind::Model, true);
        state.draft.provider = None;
        assert!(!state.publish_ready());

        state.draft.provider = Some(choice());
        assert!(state.publish_ready());

        // Editing steps never offer the publish action.
        state.step = PublishStep::Details;
        assert!(!state.publish_ready());
    }

    #[test]
    fn edits_are_ignored_in_flight() {
        let mut state = reviewed(AssetKind::Model, true);
        state = reduce(state, PublishAction::Submit);
        assert_eq!(state.step, PublishStep::InFlight);

        let next = reduce(state.clone(), PublishAction::SetName("Renamed".to_string()));
        assert_eq!(next, state);
    }

    #[test]
    fn cancel_is_ignored_in_flight_and_resets_elsewhere() {
        let mut state = reviewed(AssetKind::Dataset, true);
        state = reduce(state, PublishAction::Submit);
        let still = reduce(state.clone(), PublishAction::Cancel);
        assert_eq!(still.step, PublishStep::InFlight);

        let back_on_review = reviewed(AssetKind::Dataset, true);
        let fresh = reduce(back_on_review, PublishAction::Cancel);
        assert_eq!(fresh, PublishState::new(AssetKind::Dataset));
    }

    #[test]
    fn dismiss_resets_for_another_publish() {
        let mut state = reviewed(AssetKind::Model, true);
        state = reduce(state, PublishAction::Submit);
        state = reduce(state, PublishAction::PublishSucceeded);
        assert_eq!(state.step, PublishStep::Done);

        let fresh = reduce(state, PublishAction::Dismiss);
        assert_eq!(fresh, PublishState::new(AssetKind::Model));
    }

    #[test]
    fn failure_returns_to_the_review_screen() {
        let mut state = reviewed(AssetKind::Model, true);
        state = reduce(state, PublishAction::Submit);
        state = reduce(state, PublishAction::PublishFailed("insufficient funds".to_string()));
        assert_eq!(state.step, PublishStep::Failed);
        assert!(state.renders_review());
        assert_eq!(state.error.as_deref(), Some("insufficient funds"));

        // Back clears the banner and re-arms the review screen proper.
        let back = reduce(state, PublishAction::Back);
        assert_eq!(back.step, PublishStep::Review);
        assert_eq!(back.error, None);
    }

    // ------------------------------------------------------------------
    // Driver
    // ------------------------------------------------------------------

    #[test]
    fn missing_extension_blocks_before_any_work() {
        let runtime = create_runtime();
        let wallet = StubWallet::absent();
        let store = StubStore::default();
        let loaders = create_rw_signal(LoaderRegistry::new());
        let state = create_rw_signal(reviewed(AssetKind::Model, true));

        block_on(submit_publish(&wallet, &store, loaders, state, identity()));

        state.with_untracked(|s| {
            assert_eq!(s.step, PublishStep::Review);
            assert_eq!(
                s.error.as_deref(),
                Some("No Minerva wallet extension found. Please install or enable the extension to continue.")
            );
        });
        assert!(store.file_calls.borrow().is_empty());
        assert!(wallet.calls.borrow().is_empty());
        assert!(loaders.with_untracked(|l| !l.has_any()));
        runtime.dispose();
    }

    #[test]
    fn file_publish_uploads_then_executes_and_finishes_clean() {
        let runtime = create_runtime();
        let wallet = StubWallet::with_replies(vec![ok_reply()]);
        let store = StubStore::default();
        let loaders = create_rw_signal(LoaderRegistry::new());
        let state = create_rw_signal(reviewed(AssetKind::Model, true));

        block_on(submit_publish(&wallet, &store, loaders, state, identity()));

        state.with_untracked(|s| {
            assert_eq!(s.step, PublishStep::Done);
            assert_eq!(s.error, None);
            assert_eq!(s.draft.uploaded.as_ref().unwrap().asset_id, "A1");
        });
        assert_eq!(
            store.file_calls.borrow().as_slice(),
            &[("https://helios.host/api/upload".to_string(), "weights.bin".to_string())]
        );

        // The provider's hosting cost rides inside the contract data.
        let calls = wallet.calls.borrow();
        assert_eq!(calls.len(), 1);
        let payload: serde_json::Value =
            serde_json::from_str(&calls[0].smart_contract_data).unwrap();
        assert_eq!(payload["publish_asset"]["depin_hosting_cost"], 0.35);
        assert_eq!(payload["publish_asset"]["asset_id"], "A1");

        assert!(loaders.with_untracked(|l| !l.has_any()));
        runtime.dispose();
    }

    #[test]
    fn url_publish_submits_a_reference_instead() {
        let runtime = create_runtime();
        let wallet = StubWallet::with_replies(vec![ok_reply()]);
        let store = StubStore::default();
        let loaders = create_rw_signal(LoaderRegistry::new());
        let state = create_rw_signal(reviewed(AssetKind::Dataset, false));

        block_on(submit_publish(&wallet, &store, loaders, state, identity()));

        assert!(store.file_calls.borrow().is_empty());
        assert_eq!(
            store.url_calls.borrow().as_slice(),
            &[(
                "https://helios.host/api/upload".to_string(),
                "https://example.org/data.csv".to_string()
            )]
        );
        state.with_untracked(|s| {
            assert_eq!(s.step, PublishStep::Done);
            assert_eq!(s.draft.uploaded.as_ref().unwrap().file_name, None);
        });
        runtime.dispose();
    }

    #[test]
    fn upload_failure_fails_the_attempt_without_touching_the_contract() {
        let runtime = create_runtime();
        let wallet = StubWallet::with_replies(vec![ok_reply()]);
        let store = StubStore {
            fail: true,
            ..StubStore::default()
        };
        let loaders = create_rw_signal(LoaderRegistry::new());
        let state = create_rw_signal(reviewed(AssetKind::Model, true));

        block_on(submit_publish(&wallet, &store, loaders, state, identity()));

        state.with_untracked(|s| {
            assert_eq!(s.step, PublishStep::Failed);
            assert_eq!(s.error.as_deref(), Some("Provider error (503): unavailable"));
            assert_eq!(s.draft.uploaded, None);
        });
        assert!(wallet.calls.borrow().is_empty());
        assert!(loaders.with_untracked(|l| !l.has_any()));
        runtime.dispose();
    }

    #[test]
    fn contract_failure_surfaces_verbatim_and_retry_skips_the_upload() {
        let runtime = create_runtime();
        let wallet =
            StubWallet::with_replies(vec![failed_reply("insufficient funds"), ok_reply()]);
        let store = StubStore::default();
        let loaders = create_rw_signal(LoaderRegistry::new());
        let state = create_rw_signal(reviewed(AssetKind::Model, true));

        block_on(submit_publish(&wallet, &store, loaders, state, identity()));
        state.with_untracked(|s| {
            assert_eq!(s.step, PublishStep::Failed);
            assert_eq!(s.error.as_deref(), Some("insufficient funds"));
        });
        assert_eq!(store.file_calls.borrow().len(), 1);
        assert!(loaders.with_untracked(|l| !l.has_any()));

        // Retry from Failed: the accepted artifact is reused.
        block_on(submit_publish(&wallet, &store, loaders, state, identity()));
        state.with_untracked(|s| {
            assert_eq!(s.step, PublishStep::Done);
            assert_eq!(s.error, None);
        });
        assert_eq!(store.file_calls.borrow().len(), 1);
        assert_eq!(wallet.calls.borrow().len(), 2);
        runtime.dispose();
    }

    /// Store whose upload outlives the wizard: the route scope is
    /// disposed before the upload resolves.
    struct VanishingStore {
        state: RwSignal<PublishState>,
    }

    impl ArtifactStore for VanishingStore {
        async fn upload_file(
            &self,
            _endpoint: &str,
            _file: &SelectedFile,
            _asset_name: &str,
            _kind: AssetKind,
        ) -> AppResult<UploadedAsset> {
            self.state.dispose();
            Ok(UploadedAsset {
                asset_id: "A1".to_string(),
                file_name: Some("1700000000000_weights.bin".to_string()),
            })
        }

        async fn upload_reference(
            &self,
            _endpoint: &str,
            _url: &str,
            _asset_name: &str,
            _kind: AssetKind,
        ) -> AppResult<UploadedAsset> {
            unreachable!("file drafts never submit a reference")
        }
    }

    #[test]
    fn teardown_during_upload_stops_the_run_and_frees_the_loader() {
        let runtime = create_runtime();
        let wallet = StubWallet::with_replies(vec![ok_reply()]);
        let loaders = create_rw_signal(LoaderRegistry::new());
        let state = create_rw_signal(reviewed(AssetKind::Model, true));
        let store = VanishingStore { state };

        block_on(submit_publish(&wallet, &store, loaders, state, identity()));

        // No contract call happens against a dead wizard, and the
        // loader does not stay busy.
        assert!(wallet.calls.borrow().is_empty());
        assert!(loaders.with_untracked(|l| !l.has_any()));
        runtime.dispose();
    }

    #[test]
    fn concurrent_same_kind_publish_is_refused() {
        let runtime = create_runtime();
        let wallet = StubWallet::with_replies(vec![ok_reply()]);
        let store = StubStore::default();
        let loaders = create_rw_signal(LoaderRegistry::new());
        let state = create_rw_signal(reviewed(AssetKind::Model, true));

        // Another surface is already running the model upload.
        loaders.update(|l| l.set(LoaderOp::UploadModel, true));

        block_on(submit_publish(&wallet, &store, loaders, state, identity()));

        state.with_untracked(|s| {
            assert_eq!(s.step, PublishStep::Failed);
            assert_eq!(s.error.as_deref(), Some("upload-model is already in progress"));
        });
        assert!(store.file_calls.borrow().is_empty());
        assert!(wallet.calls.borrow().is_empty());
        // The foreign flag is untouched.
        assert!(loaders.with_untracked(|l| l.is_loading(LoaderOp::UploadModel)));
        runtime.dispose();
    }
}
