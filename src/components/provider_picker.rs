//! Two-level provider selection: platform first, then one of its
//! providers. Shown on the review screen.

use leptos::*;

use crate::publish::{dispatch, PublishAction, PublishState};
use crate::services::catalog;
use crate::types::{Platform, Provider, ProviderChoice};

/// Providers whose name contains `query`, case-insensitively. An empty
/// or whitespace query keeps everything.
fn filter_providers<'a>(providers: &'a [Provider], query: &str) -> Vec<&'a Provider> {
    let needle = query.trim().to_lowercase();
    providers
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect()
}

#[component]
pub fn ProviderPicker(state: RwSignal<PublishState>) -> impl IntoView {
    let (catalog, set_catalog) = create_signal(None::<Vec<Platform>>);
    let (load_error, set_load_error) = create_signal(None::<String>);
    let (open_platform, set_open_platform) = create_signal(None::<String>);
    let (query, set_query) = create_signal(String::new());

    let load = move || {
        set_load_error.set(None);
        spawn_local(async move {
            match catalog::fetch_platforms().await {
                Ok(platforms) => set_catalog.set(Some(platforms)),
                Err(e) => {
                    log::error!("❌ Provider catalog unavailable: {}", e);
                    set_load_error.set(Some(e.to_string()));
                }
            }
        });
    };
    load();

    let selected_did = move || {
        state.with(|s| s.draft.provider.as_ref().map(|p| p.provider_did.clone()))
    };

    view! {
        <div class="provider-picker">
            <h3>"Hosting provider"</h3>

            <Show when=move || load_error.get().is_some() fallback=|| view! {}>
                <div class="picker-error">
                    {move || load_error.get().unwrap_or_default()}
                    <button class="retry-button" on:click=move |_| load()>
                        "Retry"
                    </button>
                </div>
            </Show>

            <Show
                when=move || catalog.get().is_some()
                fallback=move || {
                    view! {
                        <Show when=move || load_error.get().is_none() fallback=|| view! {}>
                            <div class="picker-loading">"Loading providers..."</div>
                        </Show>
                    }
                }
            >
                <For
                    each=move || catalog.get().unwrap_or_default()
                    key=|platform| platform.name.clone()
                    children=move |platform: Platform| {
                        let name = platform.name.clone();
                        let toggle_name = name.clone();
                        let is_open = {
                            let name = name.clone();
                            move || open_platform.get().as_deref() == Some(name.as_str())
                        };
                        let row_open = is_open.clone();
                        let providers = platform.providers.clone();
                        view! {
                            <div class="platform" class:open=row_open>
                                <div
                                    class="platform-name"
                                    on:click=move |_| {
                                        let next = if open_platform.get().as_deref()
                                            == Some(toggle_name.as_str())
                                        {
                                            None
                                        } else {
                                            Some(toggle_name.clone())
                                        };
                                        set_open_platform.set(next);
                                        set_query.set(String::new());
                                    }
                                >
                                    {name.clone()}
                                    <span class="platform-count">
                                        {format!("{} providers", platform.providers.len())}
                                    </span>
                                </div>
                                <Show when=is_open fallback=|| view! {}>
                                    <input
                                        type="text"
                                        class="provider-filter"
                                        placeholder="Filter providers"
                                        prop:value=move || query.get()
                                        on:input=move |ev| set_query.set(event_target_value(&ev))
                                    />
                                    {
                                        let providers = providers.clone();
                                        move || {
                                            let q = query.get();
                                            filter_providers(&providers, &q)
                                                .into_iter()
                                                .map(|provider| {
                                                    let choice = ProviderChoice::from(provider);
                                                    let did = choice.provider_did.clone();
                                                    let row = choice.clone();
                                                    view! {
                                                        <div
                                                            class="provider-row"
                                                            class:selected=move || {
                                                                selected_did().as_deref()
                                                                    == Some(did.as_str())
                                                            }
                                                            on:click=move |_| {
                                                                dispatch(
                                                                    state,
                                                                    PublishAction::SelectProvider(
                                                                        row.clone(),
                                                                    ),
                                                                );
                                                                set_open_platform.set(None);
                                                            }
                                                        >
                                                            <span class="provider-name">
                                                                {choice.name.clone()}
                                                            </span>
                                                            <span class="provider-meta">
                                                                {provider
                                                                    .region
                                                                    .clone()
                                                                    .unwrap_or_default()}
                                                                " "
                                                                {provider
                                                                    .storage
                                                                    .clone()
                                                                    .unwrap_or_default()}
                                                            </span>
                                                            <span class="provider-cost">
                                                                {format!(
                                                                    "{} {}/mo",
                                                                    choice.hosting_cost,
                                                                    crate::config::FT_DENOM,
                                                                )}
                                                            </span>
                                                        </div>
                                                    }
                                                })
                                                .collect_view()
                                        }
                                    }
                                </Show>
                            </div>
                        }
                    }
                />
            </Show>
        </div>
    }
}
