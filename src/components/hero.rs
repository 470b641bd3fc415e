//! Hero section component

use leptos::*;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"Minerva Market"</h1>
            <p class="subtitle">
                "Publish AI models and datasets to the decentralized marketplace. "
                "Artifacts are stored with the DePIN provider you pick; ownership "
                "and pricing are recorded on chain through your wallet."
            </p>
        </div>
    }
}
