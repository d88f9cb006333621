//! Task Row Component

use leptos::prelude::*;
use uuid::Uuid;

use crate::components::DeleteTaskButton;
use crate::config::DeletePolicy;
use crate::models::Task;

/// One task: completion checkbox, title, delete control.
///
/// The checkbox reflects the last confirmed server state; a toggle goes to
/// the backend and the row re-renders from the next reload.
#[component]
pub fn TaskRow(
    task: Task,
    delete_policy: DeletePolicy,
    #[prop(into)] on_toggle: Callback<(Uuid, bool)>,
    #[prop(into)] on_delete: Callback<Uuid>,
) -> impl IntoView {
    let id = task.id;
    let completed = task.completed;

    view! {
        <li class="task-row">
            <label class="task-main">
                <input
                    type="checkbox"
                    checked=completed
                    on:change=move |_| on_toggle.run((id, completed))
                />
                <span class=if completed { "task-title done" } else { "task-title" }>
                    {task.title}
                </span>
            </label>
            <DeleteTaskButton
                policy=delete_policy
                on_confirm=Callback::new(move |_| on_delete.run(id))
            />
        </li>
    }
}
