use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, Weak};

use portfolio_logging::{portfolio_error, portfolio_info, portfolio_warn};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::client::BackendClient;
use crate::{FailureKind, RemoteError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The auth service refused the request (bad credentials, duplicate account, ...).
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] RemoteError),
}

impl AuthError {
    fn from_remote(err: RemoteError) -> Self {
        match err.kind {
            FailureKind::HttpStatus(status @ (400 | 401 | 403 | 422)) => AuthError::Rejected {
                status,
                message: err.message,
            },
            _ => AuthError::Transport(err),
        }
    }
}

/// Fan-out of session changes to whoever is currently subscribed.
#[derive(Debug, Default)]
pub struct SessionHub {
    inner: Arc<HubInner>,
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(u64, mpsc::Sender<AuthEvent>)>>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            subscribers.push((id, tx));
        }
        SessionSubscription {
            id,
            hub: Arc::downgrade(&self.inner),
            rx,
        }
    }

    pub fn notify(&self, event: AuthEvent) {
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }
}

/// Live registration with a `SessionHub`; unsubscribes when dropped.
#[derive(Debug)]
pub struct SessionSubscription {
    id: u64,
    hub: Weak<HubInner>,
    rx: mpsc::Receiver<AuthEvent>,
}

impl SessionSubscription {
    pub fn try_recv(&self) -> Option<AuthEvent> {
        self.rx.try_recv().ok()
    }

    /// Stops delivery; the same as dropping the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            if let Ok(mut subscribers) = hub.subscribers.lock() {
                subscribers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

/// The hosted auth service as the rest of the app sees it.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<AuthUser>, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Returns the new user; a session only exists if the service signed them in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    fn on_session_change(&self) -> SessionSubscription;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

/// `AuthProvider` over the hosted auth REST API.
pub struct RestAuth {
    client: Arc<BackendClient>,
    hub: SessionHub,
}

impl RestAuth {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self {
            client,
            hub: SessionHub::new(),
        }
    }

    fn start_session(&self, session: TokenResponse) -> AuthUser {
        self.client.set_access_token(Some(session.access_token));
        self.hub.notify(AuthEvent::SignedIn(session.user.clone()));
        session.user
    }
}

#[async_trait::async_trait]
impl AuthProvider for RestAuth {
    async fn current_user(&self) -> Result<Option<AuthUser>, AuthError> {
        if !self.client.has_access_token() {
            return Ok(None);
        }
        let url = self.client.endpoint("auth/v1/user")?;
        let request = self.client.request(Method::GET, url);
        match self.client.send_json::<AuthUser>(request).await {
            Ok(user) => Ok(Some(user)),
            Err(err) if err.kind == FailureKind::HttpStatus(401) => Ok(None),
            Err(err) => Err(AuthError::from_remote(err)),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let mut url = self.client.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let request = self
            .client
            .request(Method::POST, url)
            .json(&json!({ "email": email, "password": password }));
        let session: TokenResponse = self
            .client
            .send_json(request)
            .await
            .map_err(AuthError::from_remote)?;
        Ok(self.start_session(session))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let url = self.client.endpoint("auth/v1/signup")?;
        let request = self
            .client
            .request(Method::POST, url)
            .json(&json!({ "email": email, "password": password }));
        let body: Value = self
            .client
            .send_json(request)
            .await
            .map_err(AuthError::from_remote)?;

        // With email confirmation on, the service returns the bare user and no session.
        if body.get("access_token").is_some() {
            let session: TokenResponse = serde_json::from_value(body)
                .map_err(|err| RemoteError::new(FailureKind::Decode, err.to_string()))?;
            return Ok(self.start_session(session));
        }
        let user: AuthUser = serde_json::from_value(body)
            .map_err(|err| RemoteError::new(FailureKind::Decode, err.to_string()))?;
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.client.has_access_token() {
            let url = self.client.endpoint("auth/v1/logout")?;
            let request = self.client.request(Method::POST, url);
            self.client.send(request).await.map_err(AuthError::from_remote)?;
        }
        self.client.set_access_token(None);
        self.hub.notify(AuthEvent::SignedOut);
        Ok(())
    }

    fn on_session_change(&self) -> SessionSubscription {
        self.hub.subscribe()
    }
}

/// Local view of who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthSession {
    pub user: Option<AuthUser>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthSession {
    fn from_user(user: Option<AuthUser>) -> Self {
        Self {
            is_authenticated: user.is_some(),
            user,
            is_loading: false,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

/// Read-through mirror of the auth provider's session.
///
/// `initialize` takes the current user once and subscribes to session changes;
/// pending changes are applied whenever the mirror is read. `teardown` (or drop)
/// ends the subscription.
pub struct AuthSessionMirror {
    provider: Arc<dyn AuthProvider>,
    session: Mutex<AuthSession>,
    subscription: Mutex<Option<SessionSubscription>>,
}

impl AuthSessionMirror {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            session: Mutex::new(AuthSession {
                is_loading: true,
                ..AuthSession::default()
            }),
            subscription: Mutex::new(None),
        }
    }

    pub async fn initialize(&self) {
        match self.provider.current_user().await {
            Ok(user) => self.set(AuthSession::from_user(user)),
            Err(err) => {
                portfolio_error!("Auth initialization error: {}", err);
                self.set(AuthSession::default());
            }
        }
        let subscription = self.provider.on_session_change();
        if let Ok(mut slot) = self.subscription.lock() {
            // Replacing an earlier subscription drops it, which unsubscribes.
            *slot = Some(subscription);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    pub fn session(&self) -> AuthSession {
        self.drain_events();
        self.session
            .lock()
            .map(|session| session.clone())
            .unwrap_or_default()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        match self.provider.sign_in_with_password(email, password).await {
            Ok(user) => {
                portfolio_info!("Signed in as {}", user.email.as_deref().unwrap_or(&user.id));
                self.set(AuthSession::from_user(Some(user)));
                Ok(())
            }
            Err(err) => {
                portfolio_warn!("Sign in error: {}", err);
                Err(err)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.provider.sign_up(email, password).await.map_err(|err| {
            portfolio_warn!("Sign up error: {}", err);
            err
        })
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        match self.provider.sign_out().await {
            Ok(()) => {
                self.set(AuthSession::from_user(None));
                Ok(())
            }
            Err(err) => {
                portfolio_warn!("Sign out error: {}", err);
                Err(err)
            }
        }
    }

    pub fn teardown(&self) {
        if let Ok(mut slot) = self.subscription.lock() {
            if let Some(subscription) = slot.take() {
                subscription.unsubscribe();
            }
        }
    }

    fn set(&self, session: AuthSession) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = session;
        }
    }

    fn drain_events(&self) {
        let events: Vec<AuthEvent> = match self.subscription.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(subscription) => std::iter::from_fn(|| subscription.try_recv()).collect(),
                None => Vec::new(),
            },
            Err(_) => Vec::new(),
        };
        for event in events {
            let user = match event {
                AuthEvent::SignedIn(user) => Some(user),
                AuthEvent::SignedOut => None,
            };
            self.set(AuthSession::from_user(user));
        }
    }
}
