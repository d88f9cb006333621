//! Taskpad App
//!
//! Routed shell: builds the backend client from config and provides it to
//! every page through context.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::backend::{Backend, SupabaseBackend};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::pages::{HomePage, LoginPage, TasksPage};

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::from_env();
    let backend: Rc<dyn Backend> =
        Rc::new(SupabaseBackend::new(&config.supabase_url, &config.supabase_anon_key));
    provide_context(AppContext::new(backend, config.delete_policy));

    view! {
        <Router>
            <Routes fallback=|| view! { <p class="muted">"Not found"</p> }>
                <Route path=path!("/") view=HomePage/>
                <Route path=path!("/login") view=LoginPage/>
                <Route path=path!("/tasks") view=TasksPage/>
            </Routes>
        </Router>
    }
}
