//! Root Redirector
//!
//! Sends the visitor to the task list when a session exists, otherwise to
//! the login page. A failed session query reads as "no session".

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use leptos_router::NavigateOptions;

use crate::context::use_app_context;
use crate::epoch::Epoch;

#[component]
pub fn HomePage() -> impl IntoView {
    let ctx = use_app_context();
    let navigate = StoredValue::new(use_navigate());
    let epoch = Epoch::new();

    {
        let token = epoch.token();
        Effect::new(move |_| {
            let backend = ctx.backend();
            let token = token.clone();
            spawn_local(async move {
                let target = if backend.current_session().await.is_some() {
                    "/tasks"
                } else {
                    "/login"
                };
                if token.is_current() {
                    navigate.with_value(|nav| nav(target, NavigateOptions::default()));
                }
            });
        });
    }

    on_cleanup(move || epoch.bump());

    view! {
        <div class="redirect-screen">
            <p class="muted">"Redirecting..."</p>
        </div>
    }
}
