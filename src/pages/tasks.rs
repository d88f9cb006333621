//! Task List Page
//!
//! Session-gated list with add/toggle/delete and sign-out. Every mutation
//! and every change-feed event triggers a full authoritative reload; the
//! local list is never patched in place.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use leptos_router::NavigateOptions;
use uuid::Uuid;

use crate::backend::{Backend, TaskSubscription};
use crate::components::{use_notice, NewTaskForm, NoticeBanner, TaskRow};
use crate::context::use_app_context;
use crate::epoch::Epoch;
use crate::models::{Notice, Task};

/// Fetch the current user's tasks, or `None` when no session exists.
///
/// The no-session path issues no task query; the caller redirects.
pub async fn load_tasks(backend: &Rc<dyn Backend>) -> Result<Option<Vec<Task>>, String> {
    match backend.current_session().await {
        None => Ok(None),
        Some(session) => backend.list_tasks(session.user_id).await.map(Some),
    }
}

#[component]
pub fn TasksPage() -> impl IntoView {
    let ctx = use_app_context();
    let navigate = StoredValue::new(use_navigate());
    let delete_policy = ctx.delete_policy;
    let (tasks, set_tasks) = signal(Vec::<Task>::new());
    let (loading, set_loading) = signal(true);
    let (reload_trigger, set_reload_trigger) = signal(0u32);
    let new_title = RwSignal::new(String::new());
    let (slot, show_notice) = use_notice();
    let epoch = Epoch::new();

    // Held until teardown; dropping it releases the change feed.
    let subscription: StoredValue<Option<TaskSubscription>, LocalStorage> =
        StoredValue::new_local(None);

    // Mount: verify the session, then attach to the change feed. Any row
    // event, whatever its origin, bumps the reload trigger.
    {
        let token = epoch.token();
        Effect::new(move |_| {
            let backend = ctx.backend();
            let token = token.clone();
            spawn_local(async move {
                if backend.current_session().await.is_none() {
                    if token.is_current() {
                        navigate.with_value(|nav| nav("/login", NavigateOptions::default()));
                    }
                    return;
                }
                if !token.is_current() {
                    return;
                }
                let on_change: Rc<dyn Fn()> =
                    Rc::new(move || set_reload_trigger.update(|v| *v += 1));
                let handle = backend.subscribe_task_changes(on_change);
                subscription.update_value(|slot| *slot = Some(handle));
            });
        });
    }

    // Initial load plus every reload: replace the whole list. A failure
    // leaves the previous list visible.
    {
        let epoch = epoch.clone();
        Effect::new(move |_| {
            let _ = reload_trigger.get();
            let backend = ctx.backend();
            let token = epoch.token();
            spawn_local(async move {
                set_loading.set(true);
                let result = load_tasks(&backend).await;
                if !token.is_current() {
                    return;
                }
                match result {
                    Ok(None) => {
                        navigate.with_value(|nav| nav("/login", NavigateOptions::default()))
                    }
                    Ok(Some(list)) => set_tasks.set(list),
                    Err(message) => show_notice.run(Notice::error(message)),
                }
                set_loading.set(false);
            });
        });
    }

    let add_task = {
        let epoch = epoch.clone();
        Callback::new(move |title: String| {
            let backend = ctx.backend();
            let token = epoch.token();
            spawn_local(async move {
                // Session may have expired since mount.
                let Some(session) = backend.current_session().await else {
                    if token.is_current() {
                        navigate.with_value(|nav| nav("/login", NavigateOptions::default()));
                    }
                    return;
                };
                let result = backend.create_task(session.user_id, title).await;
                if !token.is_current() {
                    return;
                }
                match result {
                    Ok(()) => {
                        new_title.set(String::new());
                        show_notice.run(Notice::success("Task added"));
                        set_reload_trigger.update(|v| *v += 1);
                    }
                    // Input is left as typed.
                    Err(message) => show_notice.run(Notice::error(message)),
                }
            });
        })
    };

    let toggle_task = {
        let epoch = epoch.clone();
        Callback::new(move |(id, completed): (Uuid, bool)| {
            let backend = ctx.backend();
            let token = epoch.token();
            spawn_local(async move {
                let result = backend.set_task_completed(id, !completed).await;
                if !token.is_current() {
                    return;
                }
                match result {
                    Ok(()) => {
                        show_notice.run(Notice::success("Task updated"));
                        set_reload_trigger.update(|v| *v += 1);
                    }
                    Err(message) => show_notice.run(Notice::error(message)),
                }
            });
        })
    };

    let delete_task = {
        let epoch = epoch.clone();
        Callback::new(move |id: Uuid| {
            let backend = ctx.backend();
            let token = epoch.token();
            spawn_local(async move {
                let result = backend.delete_task(id).await;
                if !token.is_current() {
                    return;
                }
                match result {
                    Ok(()) => {
                        show_notice.run(Notice::success("Task deleted"));
                        set_reload_trigger.update(|v| *v += 1);
                    }
                    Err(message) => show_notice.run(Notice::error(message)),
                }
            });
        })
    };

    let sign_out = {
        let epoch = epoch.clone();
        move |_| {
            let backend = ctx.backend();
            let token = epoch.token();
            spawn_local(async move {
                backend.sign_out().await;
                if token.is_current() {
                    navigate.with_value(|nav| nav("/login", NavigateOptions::default()));
                }
            });
        }
    };

    on_cleanup(move || {
        epoch.bump();
        subscription.update_value(|slot| {
            slot.take();
        });
    });

    view! {
        <div class="tasks-screen">
            <NoticeBanner slot=slot/>
            <header class="tasks-header">
                <h1>"Your Tasks"</h1>
                <button class="signout-btn" on:click=sign_out>"Sign Out"</button>
            </header>
            <NewTaskForm title=new_title on_add=add_task/>
            <Show when=move || loading.get()>
                <p class="muted">"Loading..."</p>
            </Show>
            <Show when=move || !loading.get() && tasks.get().is_empty()>
                <p class="muted">"No tasks yet."</p>
            </Show>
            <ul class="task-list">
                <For
                    each=move || tasks.get()
                    key=|task| (task.id, task.completed)
                    children=move |task| {
                        view! {
                            <TaskRow
                                task=task
                                delete_policy=delete_policy
                                on_toggle=toggle_task
                                on_delete=delete_task
                            />
                        }
                    }
                />
            </ul>
        </div>
    }
}
