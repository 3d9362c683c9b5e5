//! Login flow.
//!
//! `LoggedOut → Authenticating → LoggedIn`, and back to `LoggedOut` on
//! [`AuthFlow::logout`] or when any request comes back 401.
//!
//! Login is a pipeline of provider code, token exchange, then one
//! [`SessionStore::save`](crate::session::SessionStore::save). Nothing is
//! written until every step has succeeded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::client::LibrisClient;
use crate::error::{Error, Result};
use crate::session::{SessionStore, SharedSessionStore, UserProfile};
use crate::types::LoginResponse;

/// Source of one-time login codes (the platform's login prompt).
#[async_trait]
pub trait LoginCodeProvider: Send + Sync {
    /// Obtain a fresh code.
    ///
    /// Return [`Error::AuthProviderDenied`] when the user or provider declines.
    async fn login_code(&self) -> Result<String>;
}

/// A provider that always hands out the same code.
#[derive(Debug, Clone)]
pub struct StaticCodeProvider(pub String);

#[async_trait]
impl LoginCodeProvider for StaticCodeProvider {
    async fn login_code(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Where the flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    Authenticating,
    LoggedIn,
}

/// Login, logout and session queries over a shared session store.
pub struct AuthFlow {
    client: LibrisClient,
    session: SharedSessionStore,
    provider: Arc<dyn LoginCodeProvider>,
    authenticating: AtomicBool,
}

/// Clears the in-progress flag however `login` exits.
struct InProgress<'a>(&'a AtomicBool);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AuthFlow {
    /// Build a flow that persists into the client's own session store, so a
    /// 401 seen by the client logs this flow out as well.
    pub fn new(client: LibrisClient, provider: Arc<dyn LoginCodeProvider>) -> Self {
        let session = client.session().clone();
        Self {
            client,
            session,
            provider,
            authenticating: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> AuthState {
        if self.authenticating.load(Ordering::SeqCst) {
            AuthState::Authenticating
        } else if self.check_login() {
            AuthState::LoggedIn
        } else {
            AuthState::LoggedOut
        }
    }

    /// Obtain a provider code, exchange it, and persist the session.
    pub async fn login(&self) -> Result<LoginResponse> {
        self.authenticating.store(true, Ordering::SeqCst);
        let _in_progress = InProgress(&self.authenticating);

        let code = self.provider.login_code().await?;
        let code = code.trim();
        if code.is_empty() {
            return Err(Error::AuthProviderDenied(
                "provider returned no login code".to_string(),
            ));
        }

        let response = self.client.auth().wx_login(code).await?;
        if response.access_token.trim().is_empty() {
            return Err(Error::Session(
                "server issued an empty access token".to_string(),
            ));
        }

        self.session.save(&response.access_token, &response.user)?;
        tracing::info!(user_id = response.user.id, "logged in");
        Ok(response)
    }

    /// True iff a non-empty token is stored. No network call.
    pub fn check_login(&self) -> bool {
        self.session.token().is_some()
    }

    /// Stored profile, if any. No network call.
    pub fn get_user(&self) -> Option<UserProfile> {
        self.session.load().user
    }

    /// Forget the session. No network call.
    pub fn logout(&self) {
        self.session.clear();
        tracing::info!("logged out");
    }
}
