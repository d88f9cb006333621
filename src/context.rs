//! Application Context
//!
//! The injected backend capability plus UI policy, provided via the Leptos
//! Context API. The backend handle is arena-stored so the `Copy` context
//! can be captured by event handlers and callbacks, which must be `Send`.

use std::rc::Rc;

use leptos::prelude::*;

use crate::backend::Backend;
use crate::config::DeletePolicy;

/// Shared per-app wiring handed to every page
#[derive(Clone, Copy)]
pub struct AppContext {
    backend: StoredValue<Rc<dyn Backend>, LocalStorage>,
    pub delete_policy: DeletePolicy,
}

impl AppContext {
    pub fn new(backend: Rc<dyn Backend>, delete_policy: DeletePolicy) -> Self {
        Self { backend: StoredValue::new_local(backend), delete_policy }
    }

    /// A handle to the backend capability.
    pub fn backend(&self) -> Rc<dyn Backend> {
        self.backend.with_value(Rc::clone)
    }
}

/// Get the app context from context
pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
