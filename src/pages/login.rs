//! Login / Signup Page
//!
//! Two modes behind one form. Backend error text is shown verbatim; a
//! successful sign-in navigates to the task list, a successful sign-up only
//! tells the user to confirm by email.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use leptos_router::NavigateOptions;

use crate::backend::Backend;
use crate::components::{use_notice, NoticeBanner};
use crate::context::use_app_context;
use crate::epoch::Epoch;
use crate::models::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SignIn,
    SignUp,
}

/// What one submit produced: the notice to show, and whether to move on to
/// the task list.
pub struct SubmitOutcome {
    pub notice: Notice,
    pub go_to_tasks: bool,
}

/// Run one submit against the auth capability.
pub async fn submit(
    backend: &Rc<dyn Backend>,
    mode: Mode,
    email: String,
    password: String,
) -> SubmitOutcome {
    match mode {
        Mode::SignIn => match backend.sign_in(email, password).await {
            Ok(_) => SubmitOutcome {
                notice: Notice::success("Signed in! Redirecting..."),
                go_to_tasks: true,
            },
            Err(message) => SubmitOutcome { notice: Notice::error(message), go_to_tasks: false },
        },
        Mode::SignUp => match backend.sign_up(email, password).await {
            Ok(_) => SubmitOutcome {
                notice: Notice::success("Account created! Check your email to confirm."),
                go_to_tasks: false,
            },
            Err(message) => SubmitOutcome { notice: Notice::error(message), go_to_tasks: false },
        },
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_app_context();
    let navigate = StoredValue::new(use_navigate());
    let (mode, set_mode) = signal(Mode::SignIn);
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let (busy, set_busy) = signal(false);
    let (slot, show_notice) = use_notice();
    let epoch = Epoch::new();

    // Already signed in: skip the form entirely.
    {
        let token = epoch.token();
        Effect::new(move |_| {
            let backend = ctx.backend();
            let token = token.clone();
            spawn_local(async move {
                if backend.current_session().await.is_some() && token.is_current() {
                    navigate.with_value(|nav| nav("/tasks", NavigateOptions::default()));
                }
            });
        });
    }

    let on_submit = {
        let epoch = epoch.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            if busy.get_untracked() {
                return;
            }
            let email_value = email.get_untracked().trim().to_string();
            let password_value = password.get_untracked();
            if email_value.is_empty() || password_value.is_empty() {
                return;
            }
            set_busy.set(true);
            let backend = ctx.backend();
            let token = epoch.token();
            let current_mode = mode.get_untracked();
            spawn_local(async move {
                let outcome = submit(&backend, current_mode, email_value, password_value).await;
                if !token.is_current() {
                    return;
                }
                set_busy.set(false);
                show_notice.run(outcome.notice);
                if outcome.go_to_tasks {
                    navigate.with_value(|nav| nav("/tasks", NavigateOptions::default()));
                }
            });
        }
    };

    on_cleanup(move || epoch.bump());

    view! {
        <div class="login-screen">
            <NoticeBanner slot=slot/>
            <div class="login-card">
                <h2>
                    {move || match mode.get() {
                        Mode::SignIn => "Welcome Back",
                        Mode::SignUp => "Create Account",
                    }}
                </h2>
                <form class="login-form" on:submit=on_submit>
                    <label>
                        "Email"
                        <input
                            type="email"
                            required=true
                            placeholder="you@example.com"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                    </label>
                    <label>
                        "Password"
                        <input
                            type="password"
                            required=true
                            placeholder="password"
                            prop:value=move || password.get()
                            on:input=move |ev| password.set(event_target_value(&ev))
                        />
                    </label>
                    <button type="submit" disabled=move || busy.get()>
                        {move || {
                            if busy.get() {
                                "Please wait..."
                            } else {
                                match mode.get() {
                                    Mode::SignIn => "Sign In",
                                    Mode::SignUp => "Sign Up",
                                }
                            }
                        }}
                    </button>
                </form>
                <p class="mode-switch">
                    {move || match mode.get() {
                        Mode::SignIn => "Don't have an account?",
                        Mode::SignUp => "Already have an account?",
                    }}
                    <button
                        type="button"
                        class="link-btn"
                        on:click=move |_| {
                            set_mode.update(|m| {
                                *m = match m {
                                    Mode::SignIn => Mode::SignUp,
                                    Mode::SignUp => Mode::SignIn,
                                }
                            })
                        }
                    >
                        {move || match mode.get() {
                            Mode::SignIn => "Sign up",
                            Mode::SignUp => "Sign in",
                        }}
                    </button>
                </p>
            </div>
        </div>
    }
}
