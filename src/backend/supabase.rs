//! Supabase Backend Client
//!
//! Thin HTTP wiring around the hosted backend: GoTrue for auth, PostgREST
//! for task rows, the realtime socket for the change feed. The access token
//! lives in `localStorage` under this client's key; views never see it, they
//! only query session state.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::{Session, Task};

use super::{realtime, Backend, BackendResult, TaskSubscription};

const SESSION_KEY: &str = "taskpad.session";

#[derive(Clone)]
pub struct SupabaseBackend {
    url: String,
    anon_key: String,
}

/// Token material persisted between page loads, like the official JS client.
#[derive(Serialize, Deserialize)]
struct StoredAuth {
    access_token: String,
    user_id: Uuid,
    email: String,
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
    email: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

impl SupabaseBackend {
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn rest_url(&self, query: &str) -> String {
        format!("{}/rest/v1/tasks{}", self.url, query)
    }

    fn realtime_url(&self) -> String {
        // http -> ws, https -> wss
        let ws_base = self.url.replacen("http", "ws", 1);
        format!("{}/realtime/v1/websocket?apikey={}&vsn=1.0.0", ws_base, self.anon_key)
    }

    fn with_keys(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", &format!("Bearer {}", token))
    }

    async fn fetch_user(&self, token: &str) -> Option<AuthUser> {
        let resp = self
            .with_keys(Request::get(&self.auth_url("/user")), token)
            .send()
            .await
            .ok()?;
        if !resp.ok() {
            return None;
        }
        resp.json::<AuthUser>().await.ok()
    }

    async fn current_session_impl(&self) -> Option<Session> {
        let auth = load_auth()?;
        match self.fetch_user(&auth.access_token).await {
            Some(user) => Some(Session {
                user_id: user.id,
                email: user.email.unwrap_or(auth.email),
                access_token: auth.access_token,
            }),
            None => {
                // Token rejected or unreachable; treat as signed out.
                clear_auth();
                None
            }
        }
    }

    async fn sign_in_impl(&self, email: String, password: String) -> BackendResult<Session> {
        let resp = Request::post(&format!("{}?grant_type=password", self.auth_url("/token")))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(error_message(resp).await);
        }
        let token: TokenResponse = resp.json().await.map_err(|e| e.to_string())?;
        let session = Session {
            user_id: token.user.id,
            email: token.user.email.unwrap_or(email),
            access_token: token.access_token,
        };
        save_auth(&session);
        Ok(session)
    }

    async fn sign_up_impl(&self, email: String, password: String) -> BackendResult<Session> {
        let resp = Request::post(&self.auth_url("/signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(error_message(resp).await);
        }
        // With email confirmation enabled GoTrue returns the bare user and
        // no token; with autoconfirm it returns a full token response.
        let body: serde_json::Value = resp.json().await.map_err(|e| e.to_string())?;
        if body.get("access_token").is_some() {
            let token: TokenResponse =
                serde_json::from_value(body).map_err(|e| e.to_string())?;
            let session = Session {
                user_id: token.user.id,
                email: token.user.email.unwrap_or(email),
                access_token: token.access_token,
            };
            save_auth(&session);
            return Ok(session);
        }
        let user: AuthUser = serde_json::from_value(body).map_err(|e| e.to_string())?;
        Ok(Session {
            user_id: user.id,
            email: user.email.unwrap_or(email),
            access_token: String::new(),
        })
    }

    async fn sign_out_impl(&self) {
        if let Some(auth) = load_auth() {
            let result = self
                .with_keys(Request::post(&self.auth_url("/logout")), &auth.access_token)
                .send()
                .await;
            if let Err(e) = result {
                log::warn!("logout request failed: {}", e);
            }
        }
        clear_auth();
    }

    fn bearer(&self) -> BackendResult<String> {
        load_auth()
            .map(|auth| auth.access_token)
            .ok_or_else(|| "Not signed in".to_string())
    }

    async fn list_tasks_impl(&self, user_id: Uuid) -> BackendResult<Vec<Task>> {
        let token = self.bearer()?;
        let query = format!("?select=*&user_id=eq.{}&order=created_at.desc", user_id);
        let resp = self
            .with_keys(Request::get(&self.rest_url(&query)), &token)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(error_message(resp).await);
        }
        resp.json::<Vec<Task>>().await.map_err(|e| e.to_string())
    }

    async fn create_task_impl(&self, user_id: Uuid, title: String) -> BackendResult<()> {
        let token = self.bearer()?;
        let resp = self
            .with_keys(Request::post(&self.rest_url("")), &token)
            .header("Prefer", "return=minimal")
            .json(&json!({ "user_id": user_id, "title": title, "completed": false }))
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(error_message(resp).await);
        }
        Ok(())
    }

    async fn set_task_completed_impl(&self, task_id: Uuid, completed: bool) -> BackendResult<()> {
        let token = self.bearer()?;
        let resp = self
            .with_keys(Request::patch(&self.rest_url(&format!("?id=eq.{}", task_id))), &token)
            .header("Prefer", "return=minimal")
            .json(&json!({ "completed": completed }))
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(error_message(resp).await);
        }
        Ok(())
    }

    async fn delete_task_impl(&self, task_id: Uuid) -> BackendResult<()> {
        let token = self.bearer()?;
        let resp = self
            .with_keys(Request::delete(&self.rest_url(&format!("?id=eq.{}", task_id))), &token)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(error_message(resp).await);
        }
        Ok(())
    }
}

impl Backend for SupabaseBackend {
    fn current_session(&self) -> LocalBoxFuture<'_, Option<Session>> {
        Box::pin(self.current_session_impl())
    }

    fn sign_in(&self, email: String, password: String) -> LocalBoxFuture<'_, BackendResult<Session>> {
        Box::pin(self.sign_in_impl(email, password))
    }

    fn sign_up(&self, email: String, password: String) -> LocalBoxFuture<'_, BackendResult<Session>> {
        Box::pin(self.sign_up_impl(email, password))
    }

    fn sign_out(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(self.sign_out_impl())
    }

    fn list_tasks(&self, user_id: Uuid) -> LocalBoxFuture<'_, BackendResult<Vec<Task>>> {
        Box::pin(self.list_tasks_impl(user_id))
    }

    fn create_task(&self, user_id: Uuid, title: String) -> LocalBoxFuture<'_, BackendResult<()>> {
        Box::pin(self.create_task_impl(user_id, title))
    }

    fn set_task_completed(&self, task_id: Uuid, completed: bool) -> LocalBoxFuture<'_, BackendResult<()>> {
        Box::pin(self.set_task_completed_impl(task_id, completed))
    }

    fn delete_task(&self, task_id: Uuid) -> LocalBoxFuture<'_, BackendResult<()>> {
        Box::pin(self.delete_task_impl(task_id))
    }

    fn subscribe_task_changes(&self, on_change: Rc<dyn Fn()>) -> TaskSubscription {
        realtime::subscribe(&self.realtime_url(), on_change)
    }
}

/// Pull the backend's own message out of an error response.
async fn error_message(resp: Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    if body.is_empty() {
        format!("Request failed with status {}", status)
    } else {
        body
    }
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

fn load_auth() -> Option<StoredAuth> {
    let raw = storage()?.get_item(SESSION_KEY).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

fn save_auth(session: &Session) {
    let auth = StoredAuth {
        access_token: session.access_token.clone(),
        user_id: session.user_id,
        email: session.email.clone(),
    };
    if let (Some(storage), Ok(raw)) = (storage(), serde_json::to_string(&auth)) {
        let _ = storage.set_item(SESSION_KEY, &raw);
    }
}

fn clear_auth() {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(SESSION_KEY);
    }
}
