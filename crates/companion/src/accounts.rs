//! Local account providers
//!
//! Both providers keep an `AccountBook`: the registered accounts, each with a
//! salted password hash, and the signed-in account.
//! - InMemoryAuth: lives as long as the process (tests and demos)
//! - LocalAuth: ~/.local/share/mindmate/companion/auth.json, so a sign-in
//!   carries over between runs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::{AuthError, AuthProvider, User, MIN_PASSWORD_LEN};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    user: User,
    password_hash: String,
    confirmed: bool,
}

/// Registered accounts and the current session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountBook {
    /// Keyed by normalized email
    accounts: BTreeMap<String, Account>,
    /// Email of the signed-in account
    current: Option<String>,
    next_id: u64,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The user id salts the hash
fn hash_password(user_id: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl AccountBook {
    pub fn current_user(&self) -> Option<User> {
        let email = self.current.as_ref()?;
        self.accounts.get(email).map(|a| a.user.clone())
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);
        let account = self
            .accounts
            .get(&email)
            .filter(|a| a.password_hash == hash_password(&a.user.id, password))
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.confirmed {
            return Err(AuthError::EmailNotConfirmed);
        }

        let user = account.user.clone();
        info!(user = %user.id, "Signed in");
        self.current = Some(email);
        Ok(user)
    }

    /// Register an account. A confirmed account is signed in straight away.
    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
        confirmed: bool,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(AuthError::Provider(
                "Unable to validate email address: invalid format".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Provider(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.accounts.contains_key(&email) {
            return Err(AuthError::AlreadyRegistered);
        }

        self.next_id += 1;
        let user = User {
            id: format!("user-{}", self.next_id),
            email: email.clone(),
            display_name: display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
        };

        self.accounts.insert(
            email.clone(),
            Account {
                user: user.clone(),
                password_hash: hash_password(&user.id, password),
                confirmed,
            },
        );
        if confirmed {
            self.current = Some(email);
        }

        debug!(user = %user.id, confirmed, "Signed up");
        Ok(user)
    }

    pub fn sign_out(&mut self) -> Option<User> {
        let user = self.current_user();
        self.current = None;
        if let Some(user) = &user {
            info!(user = %user.id, "Signed out");
        }
        user
    }

    /// Mark an account's email as confirmed. Returns false for unknown emails.
    pub fn confirm(&mut self, email: &str) -> bool {
        match self.accounts.get_mut(&normalize_email(email)) {
            Some(account) => {
                account.confirmed = true;
                true
            }
            None => false,
        }
    }
}

/// Process-local auth provider.
///
/// Accounts are unconfirmed after sign-up unless auto-confirm is enabled.
#[derive(Default)]
pub struct InMemoryAuth {
    book: Mutex<AccountBook>,
    auto_confirm: bool,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that confirms and signs in new accounts immediately
    pub fn auto_confirming() -> Self {
        Self {
            auto_confirm: true,
            ..Self::default()
        }
    }

    pub async fn confirm(&self, email: &str) -> bool {
        self.book.lock().await.confirm(email)
    }
}

impl AuthProvider for InMemoryAuth {
    async fn current_user(&self) -> Option<User> {
        self.book.lock().await.current_user()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.book.lock().await.sign_in(email, password)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError> {
        self.book
            .lock()
            .await
            .sign_up(email, password, display_name, self.auto_confirm)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.book.lock().await.sign_out();
        Ok(())
    }
}

/// Auth provider backed by a JSON file
pub struct LocalAuth {
    path: PathBuf,
    auto_confirm: bool,
    lock: Mutex<()>,
}

impl LocalAuth {
    pub fn new(path: &Path, auto_confirm: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            auto_confirm,
            lock: Mutex::new(()),
        }
    }

    /// Provider keeping its file in a tool's state directory
    pub fn in_dir(state_dir: &Path, auto_confirm: bool) -> Self {
        Self::new(&state_dir.join("auth.json"), auto_confirm)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mark an account's email as confirmed, standing in for the emailed link
    pub async fn confirm(&self, email: &str) -> Result<bool, AuthError> {
        self.update(|book| Ok(book.confirm(email))).await
    }

    async fn load(&self) -> Result<AccountBook, AuthError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AccountBook::default()),
            Err(e) => {
                return Err(AuthError::Provider(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(AccountBook::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            AuthError::Provider(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn save(&self, book: &AccountBook) -> Result<(), AuthError> {
        let write_error =
            |e: std::io::Error| AuthError::Provider(format!("Failed to write {}: {}", self.path.display(), e));

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(write_error)?;
        }

        let content = serde_json::to_string_pretty(book)
            .map_err(|e| AuthError::Provider(format!("Failed to serialize accounts: {}", e)))?;
        tokio::fs::write(&self.path, content).await.map_err(write_error)
    }

    /// Load, change, and write back the book. Nothing is written on error.
    async fn update<T, F>(&self, change: F) -> Result<T, AuthError>
    where
        F: FnOnce(&mut AccountBook) -> Result<T, AuthError> + Send,
    {
        let _guard = self.lock.lock().await;
        let mut book = self.load().await?;
        let out = change(&mut book)?;
        self.save(&book).await?;
        Ok(out)
    }
}

impl AuthProvider for LocalAuth {
    async fn current_user(&self) -> Option<User> {
        match self.load().await {
            Ok(book) => book.current_user(),
            Err(e) => {
                warn!(error = %e, "Treating unreadable session as signed out");
                None
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.update(|book| book.sign_in(email, password)).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, AuthError> {
        let confirmed = self.auto_confirm;
        self.update(|book| book.sign_up(email, password, display_name, confirmed))
            .await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.update(|book| Ok(book.sign_out())).await.map(|_| ())
    }
}
