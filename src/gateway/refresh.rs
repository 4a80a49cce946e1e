//! Access token renewal.
//!
//! [`Gateway::refresh_access_token`] exchanges the stored refresh token for a
//! new access token and never fails loudly: every error is logged and turned
//! into `None`. When refresh coalescing is enabled, [`Gateway::renew`] runs the
//! exchange under a per-gateway guard so concurrent 401s share one call; a
//! waiter that finds the stale token already replaced reuses the new one, and
//! a waiter that finds the session already expired does not expire it again.

use serde::{Deserialize, Serialize};

use super::client::{Gateway, decode_body, ensure_success};
use super::cookies::credential_cookie;
use super::request::ApiRequest;
use crate::error::Error;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present when the backend rotates refresh tokens.
    #[serde(default)]
    refresh: Option<String>,
}

/// Outcome of [`Gateway::renew`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Renewal {
    Renewed(String),
    /// Renewal failed and this call expired the session.
    Expired,
    /// Another request already expired the session.
    AlreadyExpired,
}

impl Gateway {
    /// Exchange the stored refresh token for a new access token.
    ///
    /// On success the new token is written to the store with the access
    /// policy and returned. A rotated refresh token is stored as well.
    /// Returns `None` when no refresh token is stored or the exchange fails.
    pub async fn refresh_access_token(&self) -> Option<String> {
        let refresh = match self.store.value(&self.config.names.refresh) {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::debug!("No refresh token stored");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read refresh token");
                return None;
            }
        };

        match self.exchange_refresh_token(&refresh).await {
            Ok(access) => {
                tracing::info!("Access token refreshed");
                Some(access)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                None
            }
        }
    }

    /// Obtain a fresh access token for a request rejected with `stale_access`.
    ///
    /// When no token can be obtained the session is expired before returning.
    /// With coalescing on, expiry happens under the guard, so waiters that
    /// find the session already gone report [`Renewal::AlreadyExpired`] and
    /// the navigator is called once.
    pub(super) async fn renew(&self, stale_access: Option<&str>) -> Renewal {
        if !self.config.coalesce_refresh {
            return match self.refresh_access_token().await {
                Some(token) => Renewal::Renewed(token),
                None => {
                    self.expire_session();
                    Renewal::Expired
                }
            };
        }

        let _singleflight = self.refresh_guard.lock().await;

        match self.store.value(&self.config.names.access) {
            Ok(Some(current)) if stale_access != Some(current.as_str()) => {
                tracing::debug!("Reusing access token renewed by a concurrent request");
                return Renewal::Renewed(current);
            }
            Ok(None) if stale_access.is_some() && !self.holds_refresh_token() => {
                tracing::debug!("Session already expired by a concurrent request");
                return Renewal::AlreadyExpired;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read access token"),
        }

        match self.refresh_access_token().await {
            Some(token) => Renewal::Renewed(token),
            None => {
                self.expire_session();
                Renewal::Expired
            }
        }
    }

    fn holds_refresh_token(&self) -> bool {
        matches!(self.store.get(&self.config.names.refresh), Ok(Some(_)))
    }

    async fn exchange_refresh_token(&self, refresh: &str) -> Result<String, Error> {
        let request =
            ApiRequest::post(self.config.refresh_path.clone()).json(&RefreshRequest { refresh })?;

        let response = self.dispatch(&request, None, None).await?;
        let response = ensure_success(&request, response).await?;
        let body: RefreshResponse = decode_body(response).await?;

        let names = &self.config.names;
        self.store.set(credential_cookie(
            &names.access,
            &body.access,
            &self.config.access_policy,
        ))?;
        if let Some(rotated) = body.refresh.as_deref() {
            self.store.set(credential_cookie(
                &names.refresh,
                rotated,
                &self.config.refresh_policy,
            ))?;
        }

        Ok(body.access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_response_without_rotation() {
        let body: RefreshResponse = serde_json::from_str(r#"{"access":"a2"}"#).unwrap();
        assert_eq!(body.access, "a2");
        assert!(body.refresh.is_none());
    }

    #[test]
    fn refresh_response_with_rotation() {
        let body: RefreshResponse =
            serde_json::from_str(r#"{"access":"a2","refresh":"r2"}"#).unwrap();
        assert_eq!(body.refresh.as_deref(), Some("r2"));
    }

    #[test]
    fn refresh_response_requires_access() {
        assert!(serde_json::from_str::<RefreshResponse>(r#"{"refresh":"r2"}"#).is_err());
    }

    #[test]
    fn refresh_request_shape() {
        let json = serde_json::to_value(RefreshRequest { refresh: "r1" }).unwrap();
        assert_eq!(json, serde_json::json!({"refresh": "r1"}));
    }
}
