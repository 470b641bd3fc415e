//! Publish wizard.
//!
//! Renders one pane per step and funnels every input through the
//! reducer; the only async work it starts is [`submit_publish`], wired
//! to the real extension and provider store. Pane components stay dumb:
//! fields dispatch actions, the shared nav row below them drives the
//! step transitions.

use leptos::*;
use leptos_router::use_navigate;
use web_sys::{Event, HtmlInputElement};

use crate::components::{ProviderPicker, StepIndicator, SuccessModal};
use crate::publish::{dispatch, submit_publish, PublishAction, PublishState, PublishStep};
use crate::services::extension::BrowserWallet;
use crate::services::storage;
use crate::services::upload::ProviderStore;
use crate::state::{use_loaders, use_session};
use crate::types::{AssetKind, MetricEntry, PricingMode, SchemaField, SelectedFile, UploadDraft};

const MSG_CONNECT_WALLET: &str = "Connect your wallet before publishing.";

fn mode_value(mode: PricingMode) -> &'static str {
    match mode {
        PricingMode::OneTime => "one_time",
        PricingMode::Subscription => "subscription",
        PricingMode::PayPerUse => "pay_per_use",
    }
}

fn mode_from_value(value: &str) -> PricingMode {
    match value {
        "subscription" => PricingMode::Subscription,
        "pay_per_use" => PricingMode::PayPerUse,
        _ => PricingMode::OneTime,
    }
}

/// Source line for the review summary.
fn source_label(draft: &UploadDraft) -> String {
    if let Some(file) = draft.files.first() {
        format!("File: {}", file.name)
    } else if !draft.url.trim().is_empty() {
        format!("URL: {}", draft.url)
    } else {
        "No source selected".to_string()
    }
}

#[component]
pub fn PublishWizard(kind: AssetKind) -> impl IntoView {
    let state = create_rw_signal(PublishState::new(kind));
    let session = use_session();
    let loaders = use_loaders();
    let navigate = use_navigate();

    // Remember the first successful publish of each kind.
    create_effect(move |prev: Option<PublishStep>| {
        let step = state.with(|s| s.step);
        if step == PublishStep::Done && prev != Some(PublishStep::Done) {
            storage::record_uploaded(kind);
        }
        step
    });

    let on_submit = Callback::new(move |_: ()| {
        let Some(identity) = session.identity.get_untracked() else {
            dispatch(state, PublishAction::Blocked(MSG_CONNECT_WALLET.to_string()));
            return;
        };
        spawn_local(async move {
            submit_publish(&BrowserWallet, &ProviderStore, loaders, state, identity).await;
        });
    });

    let on_dismiss = {
        let navigate = navigate.clone();
        Callback::new(move |_: ()| {
            dispatch(state, PublishAction::Dismiss);
            navigate("/", Default::default());
        })
    };

    let on_cancel = {
        let navigate = navigate.clone();
        move |_| {
            dispatch(state, PublishAction::Cancel);
            navigate("/", Default::default());
        }
    };

    let step = move || state.with(|s| s.step);
    let error = move || state.with(|s| s.error.clone());

    view! {
        <div class="wizard">
            <h2>{format!("Publish a {}", kind.label().to_lowercase())}</h2>
            <StepIndicator state=state/>

            <Show when=move || error().is_some() fallback=|| view! {}>
                <div class="error-banner">{move || error().unwrap_or_default()}</div>
            </Show>

            {move || match step() {
                PublishStep::Details => view! { <DetailsPane state=state/> }.into_view(),
                PublishStep::Metadata => view! { <MetadataPane state=state/> }.into_view(),
                PublishStep::Pricing => view! { <PricingPane state=state/> }.into_view(),
                PublishStep::Review | PublishStep::Failed => {
                    view! { <ReviewPane state=state/> }.into_view()
                }
                PublishStep::InFlight => view! {
                    <div class="publishing">
                        <span class="spinner"></span>
                        "Publishing... keep this tab open."
                    </div>
                }
                .into_view(),
                PublishStep::Done => view! {
                    <SuccessModal
                        message=format!(
                            "Your {} is now live in the marketplace.",
                            kind.label().to_lowercase(),
                        )
                        on_dismiss=on_dismiss
                    />
                }
                .into_view(),
            }}

            <div class="wizard-nav">
                <Show
                    when=move || {
                        matches!(
                            step(),
                            PublishStep::Metadata
                                | PublishStep::Pricing
                                | PublishStep::Review
                                | PublishStep::Failed
                        )
                    }
                    fallback=|| view! {}
                >
                    <button
                        class="nav-button back"
                        on:click=move |_| dispatch(state, PublishAction::Back)
                    >
                        "Back"
                    </button>
                </Show>
                <Show when=move || step().is_editing() fallback=|| view! {}>
                    <button
                        class="nav-button next"
                        on:click=move |_| dispatch(state, PublishAction::Next)
                    >
                        "Next"
                    </button>
                </Show>
                <Show when=move || state.with(|s| s.renders_review()) fallback=|| view! {}>
                    <button
                        class="nav-button submit"
                        prop:disabled=move || !state.with(|s| s.publish_ready())
                        on:click=move |_| on_submit.call(())
                    >
                        {move || if step() == PublishStep::Failed { "Retry publish" } else { "Publish" }}
                    </button>
                </Show>
                <Show
                    when=move || !matches!(step(), PublishStep::InFlight | PublishStep::Done)
                    fallback=|| view! {}
                >
                    <button class="nav-button cancel" on:click=on_cancel.clone()>
                        "Cancel"
                    </button>
                </Show>
            </div>
        </div>
    }
}

#[component]
fn DetailsPane(state: RwSignal<PublishState>) -> impl IntoView {
    let kind = state.with_untracked(|s| s.draft.kind);

    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(files) = input.files() {
            if let Some(file) = files.get(0) {
                dispatch(state, PublishAction::AddFile(SelectedFile::from_browser(file)));
            }
            // Allow re-selecting the same file after a remove.
            input.set_value("");
        }
    };

    view! {
        <div class="pane details-pane">
            <label>"Name"</label>
            <input
                type="text"
                prop:value=move || state.with(|s| s.draft.name.clone())
                on:input=move |ev| dispatch(state, PublishAction::SetName(event_target_value(&ev)))
            />

            <label>"Description"</label>
            <textarea
                prop:value=move || state.with(|s| s.draft.description.clone())
                on:input=move |ev| {
                    dispatch(state, PublishAction::SetDescription(event_target_value(&ev)))
                }
            ></textarea>

            <Show when=move || kind == AssetKind::Model fallback=|| view! {}>
                <MetricsEditor state=state/>
            </Show>

            <div class="source-section">
                <label>"Artifact"</label>
                <input type="file" on:change=on_file_change/>
                <For
                    each=move || {
                        state.with(|s| {
                            s.draft
                                .files
                                .iter()
                                .map(|f| (f.name.clone(), f.size))
                                .enumerate()
                                .collect::<Vec<_>>()
                        })
                    }
                    key=|(i, _)| *i
                    children=move |(i, (name, size))| {
                        view! {
                            <div class="file-row">
                                <span>{name} " (" {format!("{:.0}", size)} " bytes)"</span>
                                <button
                                    class="remove-button"
                                    on:click=move |_| dispatch(state, PublishAction::RemoveFile(i))
                                >
                                    "✕"
                                </button>
                            </div>
                        }
                    }
                />

                <label>"...or a reference URL"</label>
                <input
                    type="url"
                    placeholder="https://"
                    prop:value=move || state.with(|s| s.draft.url.clone())
                    on:input=move |ev| {
                        dispatch(state, PublishAction::SetUrl(event_target_value(&ev)))
                    }
                />
            </div>
        </div>
    }
}

#[component]
fn MetricsEditor(state: RwSignal<PublishState>) -> impl IntoView {
    let (name, set_name) = create_signal(String::new());
    let (value, set_value) = create_signal(String::new());

    let add = move |_| {
        let n = name.get().trim().to_string();
        let v = value.get().trim().to_string();
        if n.is_empty() || v.is_empty() {
            return;
        }
        dispatch(state, PublishAction::AddMetric(MetricEntry { name: n, value: v }));
        set_name.set(String::new());
        set_value.set(String::new());
    };

    view! {
        <div class="row-editor">
            <label>"Quality metrics"</label>
            <For
                each=move || {
                    state.with(|s| s.draft.metrics.clone().into_iter().enumerate().collect::<Vec<_>>())
                }
                key=|(i, _)| *i
                children=move |(i, entry)| {
                    view! {
                        <div class="metric-row">
                            <span>{entry.name} ": " {entry.value}</span>
                            <button
                                class="remove-button"
                                on:click=move |_| dispatch(state, PublishAction::RemoveMetric(i))
                            >
                                "✕"
                            </button>
                        </div>
                    }
                }
            />
            <div class="row-inputs">
                <input
                    type="text"
                    placeholder="accuracy"
                    prop:value=move || name.get()
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    placeholder="0.93"
                    prop:value=move || value.get()
                    on:input=move |ev| set_value.set(event_target_value(&ev))
                />
                <button class="add-button" on:click=add>"Add metric"</button>
            </div>
        </div>
    }
}

#[component]
fn MetadataPane(state: RwSignal<PublishState>) -> impl IntoView {
    let (name, set_name) = create_signal(String::new());
    let (dtype, set_dtype) = create_signal(String::new());

    let add = move |_| {
        let n = name.get().trim().to_string();
        let d = dtype.get().trim().to_string();
        if n.is_empty() || d.is_empty() {
            return;
        }
        dispatch(state, PublishAction::AddSchemaField(SchemaField { name: n, dtype: d }));
        set_name.set(String::new());
        set_dtype.set(String::new());
    };

    view! {
        <div class="pane metadata-pane">
            <label>"Column schema"</label>
            <For
                each=move || {
                    state.with(|s| s.draft.schema.clone().into_iter().enumerate().collect::<Vec<_>>())
                }
                key=|(i, _)| *i
                children=move |(i, field)| {
                    view! {
                        <div class="schema-row">
                            <span>{field.name} " : " {field.dtype}</span>
                            <button
                                class="remove-button"
                                on:click=move |_| {
                                    dispatch(state, PublishAction::RemoveSchemaField(i))
                                }
                            >
                                "✕"
                            </button>
                        </div>
                    }
                }
            />
            <div class="row-inputs">
                <input
                    type="text"
                    placeholder="column name"
                    prop:value=move || name.get()
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    placeholder="dtype (int, float, text...)"
                    prop:value=move || dtype.get()
                    on:input=move |ev| set_dtype.set(event_target_value(&ev))
                />
                <button class="add-button" on:click=add>"Add column"</button>
            </div>
        </div>
    }
}

#[component]
fn PricingPane(state: RwSignal<PublishState>) -> impl IntoView {
    view! {
        <div class="pane pricing-pane">
            <label>"Price"</label>
            <input
                type="number"
                min="0"
                step="0.01"
                prop:value=move || state.with(|s| s.draft.pricing.price.to_string())
                on:input=move |ev| {
                    let raw = event_target_value(&ev);
                    dispatch(state, PublishAction::SetPrice(raw.parse().unwrap_or(0.0)));
                }
            />

            <label>"Payment model"</label>
            <select
                prop:value=move || state.with(|s| mode_value(s.draft.pricing.mode))
                on:change=move |ev| {
                    let mode = mode_from_value(&event_target_value(&ev));
                    dispatch(state, PublishAction::SetPricingMode(mode));
                }
            >
                <option value="one_time">{PricingMode::OneTime.label()}</option>
                <option value="subscription">{PricingMode::Subscription.label()}</option>
                <option value="pay_per_use">{PricingMode::PayPerUse.label()}</option>
            </select>

            <label>"Currency"</label>
            <input
                type="text"
                prop:value=move || state.with(|s| s.draft.pricing.currency.clone())
                on:input=move |ev| {
                    dispatch(state, PublishAction::SetCurrency(event_target_value(&ev)))
                }
            />
        </div>
    }
}

#[component]
fn ReviewPane(state: RwSignal<PublishState>) -> impl IntoView {
    let draft = move || state.with(|s| s.draft.clone());

    view! {
        <div class="pane review-pane">
            <div class="summary">
                <div class="summary-row">
                    <span class="summary-key">"Name"</span>
                    <span>{move || draft().name}</span>
                </div>
                <div class="summary-row">
                    <span class="summary-key">"Kind"</span>
                    <span>{move || draft().kind.label()}</span>
                </div>
                <div class="summary-row">
                    <span class="summary-key">"Source"</span>
                    <span>{move || source_label(&draft())}</span>
                </div>
                <div class="summary-row">
                    <span class="summary-key">"Price"</span>
                    <span>
                        {move || {
                            let d = draft();
                            format!(
                                "{} {} ({})",
                                d.pricing.price,
                                d.pricing.currency,
                                d.pricing.mode.label(),
                            )
                        }}
                    </span>
                </div>
                <div class="summary-row">
                    <span class="summary-key">"Provider"</span>
                    <span>
                        {move || {
                            match draft().provider {
                                Some(p) => format!("{} ({} {}/mo)", p.name, p.hosting_cost, crate::config::FT_DENOM),
                                None => "None selected".to_string(),
                            }
                        }}
                    </span>
                </div>
                <Show
                    when=move || draft().uploaded.is_some()
                    fallback=|| view! {}
                >
                    <div class="summary-row">
                        <span class="summary-key">"Artifact"</span>
                        <span>"Already accepted by the provider"</span>
                    </div>
                </Show>
            </div>

            <ProviderPicker state=state/>
        </div>
    }
}
