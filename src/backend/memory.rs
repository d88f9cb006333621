//! In-Memory Backend Fake
//!
//! Implements the capability trait over an `Rc<RefCell<_>>` store with
//! immediately-ready futures, so view logic can be exercised in plain unit
//! tests. Clones share the store; a clone stands in for "another session"
//! when testing the change feed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use crate::models::{Session, Task};

use super::{Backend, BackendResult, TaskSubscription};

struct Account {
    email: String,
    password: String,
    user_id: Uuid,
    confirmed: bool,
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    session: Option<Session>,
    tasks: Vec<Task>,
    listeners: HashMap<u64, Rc<dyn Fn()>>,
    next_listener_id: u64,
    ticks: i64,
    list_calls: u32,
    require_confirmation: bool,
    fail_next: Option<String>,
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a confirmed account without going through sign_up.
    pub fn seed_account(&self, email: &str, password: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        self.state.borrow_mut().accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
            user_id,
            confirmed: true,
        });
        user_id
    }

    /// When on, sign_up leaves the account unconfirmed and returns a
    /// tokenless session, like a backend with email confirmation enabled.
    pub fn require_confirmation(&self, on: bool) {
        self.state.borrow_mut().require_confirmation = on;
    }

    /// Make the next data operation fail with `message`.
    pub fn fail_next(&self, message: &str) {
        self.state.borrow_mut().fail_next = Some(message.to_string());
    }

    pub fn list_call_count(&self) -> u32 {
        self.state.borrow().list_calls
    }

    fn take_injected_failure(&self) -> Option<String> {
        self.state.borrow_mut().fail_next.take()
    }

    /// Deterministic, strictly increasing creation timestamps.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut state = self.state.borrow_mut();
        state.ticks += 1;
        DateTime::from_timestamp(1_700_000_000 + state.ticks, 0).unwrap_or_default()
    }

    fn notify(&self) {
        // Collect first: a listener may re-enter the store.
        let listeners: Vec<Rc<dyn Fn()>> =
            self.state.borrow().listeners.values().cloned().collect();
        for listener in listeners {
            listener();
        }
    }
}

impl Backend for MemoryBackend {
    fn current_session(&self) -> LocalBoxFuture<'_, Option<Session>> {
        let session = self.state.borrow().session.clone();
        Box::pin(async move { session })
    }

    fn sign_in(&self, email: String, password: String) -> LocalBoxFuture<'_, BackendResult<Session>> {
        let result = {
            let mut state = self.state.borrow_mut();
            match state.accounts.iter().find(|a| a.email == email) {
                Some(account) if !account.confirmed => Err("Email not confirmed".to_string()),
                Some(account) if account.password == password => {
                    let session = Session {
                        user_id: account.user_id,
                        email: account.email.clone(),
                        access_token: format!("token-{}", account.user_id),
                    };
                    state.session = Some(session.clone());
                    Ok(session)
                }
                _ => Err("Invalid login credentials".to_string()),
            }
        };
        Box::pin(async move { result })
    }

    fn sign_up(&self, email: String, password: String) -> LocalBoxFuture<'_, BackendResult<Session>> {
        let result = {
            let mut state = self.state.borrow_mut();
            if state.accounts.iter().any(|a| a.email == email) {
                Err("User already registered".to_string())
            } else {
                let user_id = Uuid::new_v4();
                let confirmed = !state.require_confirmation;
                state.accounts.push(Account {
                    email: email.clone(),
                    password,
                    user_id,
                    confirmed,
                });
                let session = Session {
                    user_id,
                    email,
                    access_token: if confirmed {
                        format!("token-{}", user_id)
                    } else {
                        String::new()
                    },
                };
                if confirmed {
                    state.session = Some(session.clone());
                }
                Ok(session)
            }
        };
        Box::pin(async move { result })
    }

    fn sign_out(&self) -> LocalBoxFuture<'_, ()> {
        self.state.borrow_mut().session = None;
        Box::pin(async {})
    }

    fn list_tasks(&self, user_id: Uuid) -> LocalBoxFuture<'_, BackendResult<Vec<Task>>> {
        let result = match self.take_injected_failure() {
            Some(message) => Err(message),
            None => {
                let mut state = self.state.borrow_mut();
                state.list_calls += 1;
                let mut tasks: Vec<Task> = state
                    .tasks
                    .iter()
                    .filter(|t| t.user_id == user_id)
                    .cloned()
                    .collect();
                tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(tasks)
            }
        };
        Box::pin(async move { result })
    }

    fn create_task(&self, user_id: Uuid, title: String) -> LocalBoxFuture<'_, BackendResult<()>> {
        let result = match self.take_injected_failure() {
            Some(message) => Err(message),
            None => {
                let created_at = self.next_timestamp();
                self.state.borrow_mut().tasks.push(Task {
                    id: Uuid::new_v4(),
                    user_id,
                    title,
                    completed: false,
                    created_at,
                });
                self.notify();
                Ok(())
            }
        };
        Box::pin(async move { result })
    }

    fn set_task_completed(&self, task_id: Uuid, completed: bool) -> LocalBoxFuture<'_, BackendResult<()>> {
        let result = match self.take_injected_failure() {
            Some(message) => Err(message),
            None => {
                let updated = {
                    let mut state = self.state.borrow_mut();
                    match state.tasks.iter_mut().find(|t| t.id == task_id) {
                        Some(task) => {
                            task.completed = completed;
                            true
                        }
                        None => false,
                    }
                };
                if updated {
                    self.notify();
                    Ok(())
                } else {
                    Err("No such task".to_string())
                }
            }
        };
        Box::pin(async move { result })
    }

    fn delete_task(&self, task_id: Uuid) -> LocalBoxFuture<'_, BackendResult<()>> {
        let result = match self.take_injected_failure() {
            Some(message) => Err(message),
            None => {
                let removed = {
                    let mut state = self.state.borrow_mut();
                    let before = state.tasks.len();
                    state.tasks.retain(|t| t.id != task_id);
                    state.tasks.len() != before
                };
                if removed {
                    self.notify();
                    Ok(())
                } else {
                    Err("No such task".to_string())
                }
            }
        };
        Box::pin(async move { result })
    }

    fn subscribe_task_changes(&self, on_change: Rc<dyn Fn()>) -> TaskSubscription {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_listener_id;
            state.next_listener_id += 1;
            state.listeners.insert(id, on_change);
            id
        };
        let state = Rc::clone(&self.state);
        TaskSubscription::new(move || {
            state.borrow_mut().listeners.remove(&id);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    fn signed_in(backend: &MemoryBackend) -> Session {
        backend.seed_account("bob@example.com", "hunter2");
        block_on(backend.sign_in("bob@example.com".into(), "hunter2".into()))
            .expect("seeded credentials should sign in")
    }

    #[test]
    fn sign_in_with_valid_credentials_yields_a_session() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend);
        let current = block_on(backend.current_session());
        assert_eq!(current, Some(session));
    }

    #[test]
    fn sign_in_with_bad_password_reports_the_backend_message() {
        let backend = MemoryBackend::new();
        backend.seed_account("bob@example.com", "hunter2");
        let err = block_on(backend.sign_in("bob@example.com".into(), "wrong".into()))
            .expect_err("bad password must fail");
        assert_eq!(err, "Invalid login credentials");
        assert_eq!(block_on(backend.current_session()), None);
    }

    #[test]
    fn sign_up_with_confirmation_returns_a_tokenless_session() {
        let backend = MemoryBackend::new();
        backend.require_confirmation(true);
        let session = block_on(backend.sign_up("new@example.com".into(), "pw".into()))
            .expect("sign up should succeed");
        assert!(session.access_token.is_empty());
        assert_eq!(block_on(backend.current_session()), None);
        let err = block_on(backend.sign_in("new@example.com".into(), "pw".into()))
            .expect_err("unconfirmed account cannot sign in");
        assert_eq!(err, "Email not confirmed");
    }

    #[test]
    fn duplicate_sign_up_is_rejected() {
        let backend = MemoryBackend::new();
        backend.seed_account("bob@example.com", "hunter2");
        let err = block_on(backend.sign_up("bob@example.com".into(), "other".into()))
            .expect_err("duplicate email must fail");
        assert_eq!(err, "User already registered");
    }

    #[test]
    fn sign_out_clears_the_session() {
        let backend = MemoryBackend::new();
        signed_in(&backend);
        block_on(backend.sign_out());
        assert_eq!(block_on(backend.current_session()), None);
    }

    #[test]
    fn added_task_shows_up_once_incomplete_and_owned() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend);
        block_on(backend.create_task(session.user_id, "Buy milk".into())).unwrap();
        let tasks = block_on(backend.list_tasks(session.user_id)).unwrap();
        let matching: Vec<_> = tasks.iter().filter(|t| t.title == "Buy milk").collect();
        assert_eq!(matching.len(), 1);
        assert!(!matching[0].completed);
        assert_eq!(matching[0].user_id, session.user_id);
    }

    #[test]
    fn tasks_list_newest_first() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend);
        for title in ["first", "second", "third"] {
            block_on(backend.create_task(session.user_id, title.into())).unwrap();
        }
        let titles: Vec<String> = block_on(backend.list_tasks(session.user_id))
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[test]
    fn toggling_twice_restores_the_original_value() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend);
        block_on(backend.create_task(session.user_id, "flip me".into())).unwrap();
        let task = block_on(backend.list_tasks(session.user_id)).unwrap().remove(0);
        block_on(backend.set_task_completed(task.id, !task.completed)).unwrap();
        block_on(backend.set_task_completed(task.id, task.completed)).unwrap();
        let after = block_on(backend.list_tasks(session.user_id)).unwrap().remove(0);
        assert_eq!(after.completed, task.completed);
    }

    #[test]
    fn delete_only_touches_the_owners_task() {
        let backend = MemoryBackend::new();
        let alice = backend.seed_account("alice@example.com", "pw");
        let bob = backend.seed_account("bob@example.com", "pw");
        block_on(backend.create_task(alice, "hers".into())).unwrap();
        block_on(backend.create_task(bob, "his".into())).unwrap();
        let hers = block_on(backend.list_tasks(alice)).unwrap().remove(0);
        block_on(backend.delete_task(hers.id)).unwrap();
        assert!(block_on(backend.list_tasks(alice)).unwrap().is_empty());
        assert_eq!(block_on(backend.list_tasks(bob)).unwrap().len(), 1);
    }

    #[test]
    fn every_mutation_reaches_every_subscriber_through_any_handle() {
        let backend = MemoryBackend::new();
        let user = backend.seed_account("bob@example.com", "pw");

        let hits_a = Rc::new(Cell::new(0u32));
        let hits_b = Rc::new(Cell::new(0u32));
        let a = Rc::clone(&hits_a);
        let b = Rc::clone(&hits_b);
        let _sub_a = backend.subscribe_task_changes(Rc::new(move || a.set(a.get() + 1)));
        let _sub_b = backend.subscribe_task_changes(Rc::new(move || b.set(b.get() + 1)));

        // A second handle to the same store, as another session would hold.
        let other_session = backend.clone();
        block_on(other_session.create_task(user, "shared".into())).unwrap();
        let task = block_on(backend.list_tasks(user)).unwrap().remove(0);
        block_on(backend.set_task_completed(task.id, true)).unwrap();
        block_on(other_session.delete_task(task.id)).unwrap();

        assert_eq!(hits_a.get(), 3);
        assert_eq!(hits_b.get(), 3);
    }

    #[test]
    fn dropped_subscription_stops_receiving_events() {
        let backend = MemoryBackend::new();
        let user = backend.seed_account("bob@example.com", "pw");
        let hits = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&hits);
        let sub = backend.subscribe_task_changes(Rc::new(move || counter.set(counter.get() + 1)));

        block_on(backend.create_task(user, "one".into())).unwrap();
        drop(sub);
        block_on(backend.create_task(user, "two".into())).unwrap();

        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn injected_failure_surfaces_verbatim_and_clears() {
        let backend = MemoryBackend::new();
        let session = signed_in(&backend);
        backend.fail_next("duplicate key value violates unique constraint");
        let err = block_on(backend.create_task(session.user_id, "x".into())).unwrap_err();
        assert_eq!(err, "duplicate key value violates unique constraint");
        // Next operation succeeds again.
        block_on(backend.create_task(session.user_id, "x".into())).unwrap();
    }
}
