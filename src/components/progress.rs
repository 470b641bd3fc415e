use leptos::*;

use crate::publish::{wizard_steps, PublishState, PublishStep};

/// Index of `step` within the pre-flight sequence. In-flight and
/// terminal steps park on the last (review) slot.
fn step_position(steps: &[PublishStep], step: PublishStep) -> usize {
    steps
        .iter()
        .position(|p| *p == step)
        .unwrap_or(steps.len().saturating_sub(1))
}

#[component]
pub fn StepIndicator(state: RwSignal<PublishState>) -> impl IntoView {
    // The kind never changes over a wizard's lifetime.
    let steps = state.with_untracked(|s| wizard_steps(s.draft.kind));
    let position = move || state.with(|s| step_position(steps, s.step));
    let fill = move || {
        let last = steps.len().saturating_sub(1).max(1);
        format!("width: {}%;", position() * 100 / last)
    };

    view! {
        <div class="step-indicator">
            <div class="progress-bar">
                <div class="progress-fill" style=fill></div>
            </div>
            <div class="step-labels">
                {steps
                    .iter()
                    .enumerate()
                    .map(|(i, step)| {
                        let active = move || position() == i;
                        let done = move || position() > i;
                        view! {
                            <span class="step-label" class:active=active class:done=done>
                                {step.title()}
                            </span>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
