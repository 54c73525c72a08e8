use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::Cookie;

use crate::{
    config::AppConfig,
    error::RestoreError,
    models::{ApiEnvelope, User},
    store::AuthStore,
};

/// The credential a current-user lookup is made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Access(String),
    Refresh(String),
}

/// CurrentUser
///
/// A successful current-user lookup. `access_token` is set when the transport
/// refreshed the session along the way and handed back a new token.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub user: User,
    pub access_token: Option<String>,
}

/// MeClient
///
/// The one backend call the restore flow makes. Retries and token refresh are
/// the implementation's business; the restorer takes the first answer.
#[async_trait]
pub trait MeClient: Send + Sync {
    async fn current_user(&self, credential: &Credential) -> Result<CurrentUser, RestoreError>;
}

/// HttpMeClient
///
/// `GET <api_base_url>/me` over reqwest. Access tokens go in the bearer header;
/// refresh tokens go in the refresh cookie so the backend can rotate the session
/// and answer with a new access-token cookie.
#[derive(Clone)]
pub struct HttpMeClient {
    client: reqwest::Client,
    me_url: String,
    access_cookie: String,
    refresh_cookie: String,
}

impl HttpMeClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            client,
            me_url: format!("{}/me", config.api_base_url.trim_end_matches('/')),
            access_cookie: config.access_cookie.clone(),
            refresh_cookie: config.refresh_cookie.clone(),
        }
    }
}

#[async_trait]
impl MeClient for HttpMeClient {
    async fn current_user(&self, credential: &Credential) -> Result<CurrentUser, RestoreError> {
        let request = self.client.get(&self.me_url);
        let request = match credential {
            Credential::Access(token) => request.bearer_auth(token),
            Credential::Refresh(token) => {
                request.header(header::COOKIE, format!("{}={}", self.refresh_cookie, token))
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| RestoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestoreError::Status(status.as_u16()));
        }

        let access_token = issued_cookie(response.headers(), &self.access_cookie);

        let envelope: ApiEnvelope<User> = response
            .json()
            .await
            .map_err(|e| RestoreError::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(RestoreError::Rejected);
        }
        let user = envelope.data.ok_or(RestoreError::MissingUser)?;

        Ok(CurrentUser { user, access_token })
    }
}

// Value of the `name` cookie among the response's Set-Cookie headers, if any.
fn issued_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| Cookie::parse(raw).ok())
        .find(|cookie| cookie.name() == name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

/// RestoreOutcome
///
/// Which path a call to [`SessionRestorer::restore`] took.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// The store was already initialized; nothing was done.
    AlreadyInitialized,
    /// Another restore is running; this call did nothing.
    InProgress,
    /// The backend confirmed the session.
    Restored(User),
    /// No token of any kind was stored.
    Anonymous,
    /// The backend lookup failed and local auth state was cleared.
    LoggedOut(RestoreError),
}

/// SessionRestorer
///
/// Reconciles persisted auth state with the backend once per application load.
///
/// 1. An already-initialized store is left alone.
/// 2. The store is hydrated from storage.
/// 3. A stored access token is checked against `/me`.
/// 4. Failing that, a stored refresh token is tried the same way.
/// 5. The store is marked initialized on every path.
///
/// Any lookup failure ends in [`AuthStore::logout`]; nothing is retried here.
pub struct SessionRestorer {
    store: Arc<AuthStore>,
    client: Arc<dyn MeClient>,
    in_flight: AtomicBool,
}

// Releases the re-entrancy flag even if the restore future is dropped midway,
// so a later mount can try again.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionRestorer {
    pub fn new(store: Arc<AuthStore>, client: Arc<dyn MeClient>) -> Self {
        Self {
            store,
            client,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<AuthStore> {
        &self.store
    }

    pub async fn restore(&self) -> RestoreOutcome {
        if self.store.is_initialized() {
            self.store.mark_initialized();
            return RestoreOutcome::AlreadyInitialized;
        }

        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("session restore already running");
            return RestoreOutcome::InProgress;
        }
        let _guard = InFlight(&self.in_flight);

        let outcome = self.reconcile().await;
        self.store.mark_initialized();
        outcome
    }

    async fn reconcile(&self) -> RestoreOutcome {
        self.store.hydrate();

        let credential = match (self.store.token(), self.store.refresh_token()) {
            (Some(access), _) => Credential::Access(access),
            (None, Some(refresh)) => Credential::Refresh(refresh),
            (None, None) => return RestoreOutcome::Anonymous,
        };

        let result = self.client.current_user(&credential).await;
        match self.adopt(&credential, result) {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "session restored");
                RestoreOutcome::Restored(user)
            }
            Err(reason) => self.logout(reason),
        }
    }

    fn adopt(
        &self,
        credential: &Credential,
        result: Result<CurrentUser, RestoreError>,
    ) -> Result<User, RestoreError> {
        let CurrentUser { user, access_token } = result?;

        // A token the server just issued wins over whatever was stored.
        match (credential, access_token) {
            (_, Some(issued)) => self.store.login(user.clone(), issued),
            (Credential::Access(stored), None) => self.store.login(user.clone(), stored.clone()),
            (Credential::Refresh(_), None) => {
                tracing::debug!(user_id = %user.id, "refresh accepted without a new access token");
                self.store.set_user(user.clone());
            }
        }
        Ok(user)
    }

    /// The single failure transition: clear everything and report why.
    fn logout(&self, reason: RestoreError) -> RestoreOutcome {
        tracing::warn!(error = %reason, "session restore failed, logging out");
        self.store.logout();
        RestoreOutcome::LoggedOut(reason)
    }
}
