//! New Task Form Component

use leptos::prelude::*;

/// Form for adding a task. The parent owns `title` so it can clear the
/// input only after the backend accepts the row.
#[component]
pub fn NewTaskForm(title: RwSignal<String>, #[prop(into)] on_add: Callback<String>) -> impl IntoView {
    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = title.get_untracked().trim().to_string();
        if text.is_empty() {
            return;
        }
        on_add.run(text);
    };

    view! {
        <form class="new-task-form" on:submit=submit>
            <input
                type="text"
                placeholder="Add a new task..."
                prop:value=move || title.get()
                on:input=move |ev| title.set(event_target_value(&ev))
            />
            <button type="submit">"Add"</button>
        </form>
    }
}
