//! Delete Task Button Component
//!
//! Honors the configured delete policy: either an inline two-step confirm
//! or a single click that deletes immediately.

use leptos::prelude::*;

use crate::config::DeletePolicy;

#[component]
pub fn DeleteTaskButton(
    policy: DeletePolicy,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let (arming, set_arming) = signal(false);

    view! {
        <Show when=move || !arming.get()>
            <button
                class="delete-btn"
                on:click=move |ev| {
                    ev.stop_propagation();
                    match policy {
                        DeletePolicy::Immediate => on_confirm.run(()),
                        DeletePolicy::Confirm => set_arming.set(true),
                    }
                }
            >
                "Delete"
            </button>
        </Show>
        <Show when=move || arming.get()>
            <span class="delete-confirm">
                <span class="delete-confirm-text">"Delete?"</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_arming.set(false);
                        on_confirm.run(());
                    }
                >
                    "✓"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_arming.set(false);
                    }
                >
                    "✗"
                </button>
            </span>
        </Show>
    }
}
