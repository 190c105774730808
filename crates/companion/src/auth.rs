//! Authentication gate
//!
//! The auth provider itself lives elsewhere; this module consumes it as a
//! capability and decides what a given auth status lets the user see:
//! - While the status is loading, nothing protected renders
//! - Signed-out users are sent to the auth view
//! - Signed-in users visiting the auth view are sent home
//!
//! Provider errors are classified so the known failures get friendly text.

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Shown after a successful sign-up that still needs email confirmation
pub const SIGN_UP_CONFIRMATION: &str =
    "Check your email for a confirmation link to complete your signup.";

/// Shortest password the local providers accept
pub const MIN_PASSWORD_LEN: usize = 6;

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Failures reported by an auth provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Email not confirmed")]
    EmailNotConfirmed,

    #[error("User already registered")]
    AlreadyRegistered,

    #[error("{0}")]
    Provider(String),
}

impl AuthError {
    /// Classify a raw provider error message
    pub fn from_provider_message(message: &str) -> Self {
        if message.contains("Invalid login credentials") {
            AuthError::InvalidCredentials
        } else if message.contains("Email not confirmed") {
            AuthError::EmailNotConfirmed
        } else if message.contains("User already registered") {
            AuthError::AlreadyRegistered
        } else {
            AuthError::Provider(message.to_string())
        }
    }

    /// Text to show the person signing in
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => {
                "Invalid email or password. Please try again.".to_string()
            }
            AuthError::EmailNotConfirmed => {
                "Please check your email and click the confirmation link.".to_string()
            }
            AuthError::AlreadyRegistered => {
                "An account with this email already exists. Please sign in instead.".to_string()
            }
            AuthError::Provider(message) => message.clone(),
        }
    }
}

/// Capability exposed by an external authentication service
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> impl Future<Output = Option<User>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// What the app knows about the current user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// Provider has not answered yet
    Loading,
    SignedOut,
    SignedIn(User),
}

impl AuthStatus {
    /// Ask the provider for the current user
    pub async fn resolve<P: AuthProvider>(provider: &P) -> Self {
        match provider.current_user().await {
            Some(user) => AuthStatus::SignedIn(user),
            None => AuthStatus::SignedOut,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthStatus::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// App views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Home,
    Chat,
    Mood,
    Breathing,
    Journal,
    Auth,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Chat => "chat",
            Route::Mood => "mood",
            Route::Breathing => "breathing",
            Route::Journal => "journal",
            Route::Auth => "auth",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "home" => Some(Route::Home),
            "chat" => Some(Route::Chat),
            "mood" => Some(Route::Mood),
            "breathing" => Some(Route::Breathing),
            "journal" => Some(Route::Journal),
            "auth" => Some(Route::Auth),
            _ => None,
        }
    }

    /// Navigation label
    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Chat => "AI Chat",
            Route::Mood => "Mood Tracker",
            Route::Breathing => "Breathing",
            Route::Journal => "Journal",
            Route::Auth => "Sign In",
        }
    }

    /// Whether the view requires a signed-in user
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Auth)
    }

    pub fn all() -> &'static [Self] {
        &[
            Route::Home,
            Route::Chat,
            Route::Mood,
            Route::Breathing,
            Route::Journal,
            Route::Auth,
        ]
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of checking a route against the auth status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Auth status unresolved; render nothing protected yet
    Wait,
    Render(Route),
    Redirect(Route),
}

/// Decide whether a requested route may render
pub fn guard(status: &AuthStatus, requested: Route) -> RouteDecision {
    match (status, requested.is_protected()) {
        (AuthStatus::Loading, true) => RouteDecision::Wait,
        (AuthStatus::Loading, false) => RouteDecision::Render(requested),
        (AuthStatus::SignedOut, true) => RouteDecision::Redirect(Route::Auth),
        (AuthStatus::SignedOut, false) => RouteDecision::Render(requested),
        (AuthStatus::SignedIn(_), true) => RouteDecision::Render(requested),
        (AuthStatus::SignedIn(_), false) => RouteDecision::Redirect(Route::Home),
    }
}
