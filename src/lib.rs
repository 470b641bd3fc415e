//! Minerva Market - Frontend Rust/Leptos Application
//!
//! A WebAssembly frontend for publishing AI models and datasets to the
//! Minerva marketplace: artifacts go to a DePIN hosting provider, the
//! publication itself is recorded on chain through the wallet browser
//! extension.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header (wallet connection, busy badge)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Routes                                                     │
//! │  ├── "/"                 Home (hero, publish entry cards)   │
//! │  ├── "/publish/model"    PublishWizard (model)              │
//! │  └── "/publish/dataset"  PublishWizard (dataset)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Common types (drafts, catalog, wire envelopes, errors)
//! - [`state`] - Shared signals (loader registry, wallet session)
//! - [`publish`] - Wizard state machine and submission driver
//! - [`components`] - UI components (Header, PublishWizard, etc.)
//! - [`services`] - Extension, provider, and marketplace communication

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod state;
pub mod publish;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // Assets
    AssetKind, MetricEntry, Pricing, PricingMode, SchemaField, SelectedFile, UploadDraft,
    // Catalog
    Platform, Provider, ProviderChoice, ProviderEndpoints,
    // Wallet
    ContractResult, ResultMessage, SignInResult, WalletEnvelope, WalletIdentity,
    // Upload wire
    UploadData, UploadEnvelope, UploadedAsset,
    // Contract wire
    ContractPayload, ExecuteRequest, PublishAsset,
    // Errors
    AppError, AppResult,
};

// State
pub use state::*;

// Publish pipeline
pub use publish::{
    dispatch, reduce, submit_publish, wizard_steps, PublishAction, PublishState, PublishStep,
};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application Shell
// =============================================================================

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_session(services::storage::cached_identity());
    provide_loaders();

    view! {
        <Title text=config::APP_NAME/>
        <Router>
            <Header/>
            <main>
                <div class="container">
                    <Routes>
                        <Route path="/" view=HomePage/>
                        <Route
                            path="/publish/model"
                            view=|| view! { <PublishWizard kind=AssetKind::Model/> }
                        />
                        <Route
                            path="/publish/dataset"
                            view=|| view! { <PublishWizard kind=AssetKind::Dataset/> }
                        />
                    </Routes>
                </div>
            </main>
            <Footer/>
        </Router>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    view! {
        <Hero/>
        <div class="kind-cards">
            <A href="/publish/model" class="kind-card">
                <h3>"Publish a model"</h3>
                <p>"Upload trained weights or link a hosted artifact."</p>
                <Show
                    when=|| services::storage::has_uploaded(AssetKind::Model)
                    fallback=|| view! {}
                >
                    <span class="kind-hint">"You have published models before"</span>
                </Show>
            </A>
            <A href="/publish/dataset" class="kind-card">
                <h3>"Publish a dataset"</h3>
                <p>"Describe the columns, pick a provider, set a price."</p>
                <Show
                    when=|| services::storage::has_uploaded(AssetKind::Dataset)
                    fallback=|| view! {}
                >
                    <span class="kind-hint">"You have published datasets before"</span>
                </Show>
            </A>
        </div>
    }
}
