//! Application Configuration
//!
//! Backend endpoint and UI policy knobs, resolved at compile time.

/// What happens when the user hits a task's delete control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Inline two-step confirmation before the delete request is sent
    Confirm,
    /// Delete on first click
    Immediate,
}

/// Static app configuration, provided via context at mount
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the hosted backend, e.g. `https://xyz.supabase.co`
    pub supabase_url: String,
    /// Public (anon) API key sent with every request
    pub supabase_anon_key: String,
    pub delete_policy: DeletePolicy,
}

impl AppConfig {
    /// Resolve from compile-time env, falling back to local-dev defaults.
    pub fn from_env() -> Self {
        let supabase_url = option_env!("TASKPAD_SUPABASE_URL")
            .unwrap_or("http://localhost:54321")
            .trim_end_matches('/')
            .to_string();
        let supabase_anon_key = option_env!("TASKPAD_SUPABASE_ANON_KEY")
            .unwrap_or("")
            .to_string();
        let delete_policy = match option_env!("TASKPAD_DELETE_POLICY") {
            Some("immediate") => DeletePolicy::Immediate,
            _ => DeletePolicy::Confirm,
        };
        Self { supabase_url, supabase_anon_key, delete_policy }
    }
}
