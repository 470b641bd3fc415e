use gloo_timers::callback::Timeout;
use leptos::*;

use crate::config::SUCCESS_NOTICE_MS;

/// Success notice shown after a publish.
///
/// Dismisses itself after [`SUCCESS_NOTICE_MS`] or on the close button,
/// whichever comes first. The timer is cancelled when the modal leaves
/// the tree, so an early manual dismiss cannot fire a second one.
#[component]
pub fn SuccessModal(message: String, on_dismiss: Callback<()>) -> impl IntoView {
    let timer = Timeout::new(SUCCESS_NOTICE_MS, move || on_dismiss.call(()));
    on_cleanup(move || drop(timer));

    view! {
        <div class="modal-backdrop">
            <div class="modal success-modal">
                <div class="modal-icon">"🎉"</div>
                <h2>"Published!"</h2>
                <p>{message}</p>
                <button class="modal-close" on:click=move |_| on_dismiss.call(())>
                    "Close"
                </button>
            </div>
        </div>
    }
}
