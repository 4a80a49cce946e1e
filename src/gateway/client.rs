use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::config::GatewayConfig;
use super::cookies::{credential_cookie, find_set_cookie};
use super::navigator::{Navigator, NoopNavigator};
use super::refresh::Renewal;
use super::request::ApiRequest;
use super::store::CredentialStore;
use crate::error::Error;

/// Single entry point for every backend request.
///
/// Attaches the stored access token and anti-forgery token to each request,
/// renews an expired access token once per request, and ends the session when
/// renewal is impossible. Clones share the store, navigator, connection pool
/// and refresh guard.
#[derive(Clone)]
pub struct Gateway {
    pub(super) config: Arc<GatewayConfig>,
    pub(super) http: reqwest::Client,
    pub(super) store: Arc<dyn CredentialStore>,
    pub(super) navigator: Arc<dyn Navigator>,
    pub(super) refresh_guard: Arc<tokio::sync::Mutex<()>>,
}

impl Gateway {
    /// Create a gateway over `store`.
    #[must_use]
    pub fn new(config: GatewayConfig, store: impl CredentialStore) -> Self {
        let http = build_http_client(&config);
        Self {
            config: Arc::new(config),
            http,
            store: Arc::new(store),
            navigator: Arc::new(NoopNavigator),
            refresh_guard: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Route the logged-out transition to `navigator`.
    #[must_use]
    pub fn with_navigator(mut self, navigator: impl Navigator) -> Self {
        self.navigator = Arc::new(navigator);
        self
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    ///
    /// The client is used as-is: enable its cookie store yourself if the
    /// backend relies on server cookies.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Issue `request`, renewing the session once on `401 Unauthorized`.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] on transport failure.
    /// - [`Error::Api`] for any non-success status that was not recovered,
    ///   including the original 401 when renewal failed and a 401 on the
    ///   retried request.
    /// - [`Error::Store`] if the credential store cannot be read.
    pub async fn send(&self, mut request: ApiRequest) -> Result<reqwest::Response, Error> {
        let access = self.store.value(&self.config.names.access)?;
        let csrf = self.store.value(&self.config.names.csrf)?;
        let response = self
            .dispatch(&request, access.as_deref(), csrf.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED || !request.mark_retried() {
            return ensure_success(&request, response).await;
        }

        match self.renew(access.as_deref()).await {
            Renewal::Renewed(token) => {
                let csrf = self.store.value(&self.config.names.csrf)?;
                let retry = self
                    .dispatch(&request, Some(&token), csrf.as_deref())
                    .await?;
                ensure_success(&request, retry).await
            }
            Renewal::Expired | Renewal::AlreadyExpired => ensure_success(&request, response).await,
        }
    }

    /// Issue `request` with credentials attached but without 401 recovery.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), except a 401 is returned immediately.
    pub async fn send_once(&self, request: ApiRequest) -> Result<reqwest::Response, Error> {
        let access = self.store.value(&self.config.names.access)?;
        let csrf = self.store.value(&self.config.names.csrf)?;
        let response = self
            .dispatch(&request, access.as_deref(), csrf.as_deref())
            .await?;
        ensure_success(&request, response).await
    }

    /// Send `request` and decode the JSON body. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Errors of [`send`](Self::send), plus [`Error::Json`] if the body does
    /// not match `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, Error> {
        let response = self.send(request).await?;
        decode_body(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: impl Into<String>) -> Result<T, Error> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<T, B>(&self, path: impl Into<String>, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put_json<T, B>(&self, path: impl Into<String>, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch_json<T, B>(&self, path: impl Into<String>, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(ApiRequest::patch(path).json(body)?).await
    }

    /// Send a `DELETE`, discarding any response body.
    pub async fn delete(&self, path: impl Into<String>) -> Result<(), Error> {
        self.send(ApiRequest::delete(path)).await.map(drop)
    }

    /// Store the tokens handed out at login.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if either write fails.
    pub fn start_session(&self, access: &str, refresh: &str) -> Result<(), Error> {
        let names = &self.config.names;
        self.store
            .set(credential_cookie(&names.access, access, &self.config.access_policy))?;
        self.store
            .set(credential_cookie(&names.refresh, refresh, &self.config.refresh_policy))
    }

    /// Remove all three credentials, the anti-forgery token included.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::Store`] encountered; later removals are
    /// still attempted.
    pub fn clear_session(&self) -> Result<(), Error> {
        let names = &self.config.names;
        let mut first_err = None;
        for name in [&names.access, &names.refresh, &names.csrf] {
            if let Err(e) = self.store.remove(name) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Whether an access or refresh token is currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be read.
    pub fn has_session(&self) -> Result<bool, Error> {
        let names = &self.config.names;
        Ok(self.store.get(&names.access)?.is_some() || self.store.get(&names.refresh)?.is_some())
    }

    /// Send one HTTP request. No interception, no status check.
    pub(super) async fn dispatch(
        &self,
        request: &ApiRequest,
        access: Option<&str>,
        csrf: Option<&str>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.config.endpoint(request.path())?;
        let mut builder = self.http.request(request.method().clone(), url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(token) = access {
            builder = builder.bearer_auth(token);
        }
        if let Some(token) = csrf {
            builder = builder.header(self.config.csrf_header.as_str(), token);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;

        tracing::debug!(
            method = %request.method(),
            path = %request.path(),
            status = %response.status(),
            retried = request.is_retried(),
            "Gateway request"
        );

        self.capture_csrf(response.headers());
        Ok(response)
    }

    /// Drop the access and refresh tokens and leave for the login route.
    ///
    /// The anti-forgery token is kept.
    pub(super) fn expire_session(&self) {
        let names = &self.config.names;
        for name in [&names.access, &names.refresh] {
            if let Err(e) = self.store.remove(name) {
                tracing::error!(error = %e, credential = %name, "Failed to remove credential");
            }
        }
        tracing::warn!(route = %self.config.login_route, "Session could not be renewed, logging out");
        self.navigator.navigate(&self.config.login_route);
    }

    pub(crate) fn navigate_to_login(&self) {
        self.navigator.navigate(&self.config.login_route);
    }

    fn capture_csrf(&self, headers: &HeaderMap) {
        if !self.config.with_credentials {
            return;
        }
        if let Some(cookie) = find_set_cookie(headers, &self.config.names.csrf) {
            if let Err(e) = self.store.set(cookie) {
                tracing::warn!(error = %e, "Failed to store anti-forgery token");
            }
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

fn build_http_client(config: &GatewayConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(config.with_credentials)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Checks HTTP response status; returns the response on success or an error with details.
pub(super) async fn ensure_success(
    request: &ApiRequest,
    response: reqwest::Response,
) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let detail = response.text().await.unwrap_or_default();
    Err(Error::Api {
        method: request.method().clone(),
        path: request.path().to_string(),
        status,
        detail,
    })
}

pub(super) async fn decode_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(serde_json::from_value(JsonValue::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
