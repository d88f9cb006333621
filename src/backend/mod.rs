//! Backend Capability
//!
//! Everything stateful (accounts, sessions, task rows, change feed) lives in
//! the hosted backend. Views reach it only through this trait, injected via
//! context, so tests can substitute the in-memory fake.

#[cfg(test)]
mod memory;
mod realtime;
mod supabase;

#[cfg(test)]
pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use uuid::Uuid;

use crate::models::{Session, Task};

/// Errors cross this boundary as the backend's message text, shown verbatim.
pub type BackendResult<T> = Result<T, String>;

/// The backend capability interface.
///
/// Futures are boxed and non-`Send`; the client runs on the single-threaded
/// wasm event loop.
pub trait Backend {
    /// Current session, if any. Query failures read as "no session".
    fn current_session(&self) -> LocalBoxFuture<'_, Option<Session>>;

    fn sign_in(&self, email: String, password: String) -> LocalBoxFuture<'_, BackendResult<Session>>;

    /// May return a session with an empty token when the account still
    /// requires email confirmation.
    fn sign_up(&self, email: String, password: String) -> LocalBoxFuture<'_, BackendResult<Session>>;

    fn sign_out(&self) -> LocalBoxFuture<'_, ()>;

    /// All tasks owned by `user_id`, newest first.
    fn list_tasks(&self, user_id: Uuid) -> LocalBoxFuture<'_, BackendResult<Vec<Task>>>;

    fn create_task(&self, user_id: Uuid, title: String) -> LocalBoxFuture<'_, BackendResult<()>>;

    fn set_task_completed(&self, task_id: Uuid, completed: bool) -> LocalBoxFuture<'_, BackendResult<()>>;

    fn delete_task(&self, task_id: Uuid) -> LocalBoxFuture<'_, BackendResult<()>>;

    /// Subscribe to the task change feed. `on_change` fires for any
    /// insert/update/delete on the task store, regardless of origin or
    /// owner; per-user filtering happens at query time.
    fn subscribe_task_changes(&self, on_change: Rc<dyn Fn()>) -> TaskSubscription;
}

/// RAII handle for a change-feed subscription.
///
/// Dropping it releases the subscription; release runs at most once no
/// matter how teardown is reached.
pub struct TaskSubscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl TaskSubscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self { unsubscribe: Some(Box::new(unsubscribe)) }
    }

    /// A handle that releases nothing (for fakes without a live feed).
    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }
}

impl Drop for TaskSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.unsubscribe.take() {
            release();
        }
    }
}
