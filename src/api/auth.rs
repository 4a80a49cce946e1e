use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::gateway::{ApiRequest, Gateway};
use crate::types::{Role, StationId};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    refresh: &'a str,
}

/// Body returned by the role login endpoints.
///
/// Owners receive `station_ids`, managers and attendants a single
/// `station_id`.
#[derive(Deserialize)]
struct LoginResponse {
    name: String,
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    station_ids: Vec<StationId>,
    #[serde(default)]
    station_id: Option<StationId>,
    access: String,
    refresh: String,
}

/// Who is logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Profile {
    pub role: Role,
    pub id: Option<Uuid>,
    pub name: String,
    /// Stations the account can act on. Managers and attendants have at most one.
    pub station_ids: Vec<StationId>,
}

impl Profile {
    fn from_login(role: Role, body: &LoginResponse) -> Self {
        let mut station_ids = body.station_ids.clone();
        if let Some(id) = body.station_id {
            if !station_ids.contains(&id) {
                station_ids.push(id);
            }
        }
        Self {
            role,
            id: body.id,
            name: body.name.clone(),
            station_ids,
        }
    }

    /// The station a manager or attendant is assigned to, or an owner's first station.
    #[must_use]
    pub fn station_id(&self) -> Option<StationId> {
        self.station_ids.first().copied()
    }
}

impl Gateway {
    /// Log in as `role` and store the returned tokens.
    ///
    /// The login call itself is not subject to silent refresh: a 401 here
    /// means the credentials were rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when the backend rejects the credentials
    /// (e.g. 401, or 403 when the account does not have `role`),
    /// [`Error::Http`] on transport failure, and [`Error::Store`] if the
    /// tokens cannot be stored.
    pub async fn login(&self, role: Role, email: &str, password: &str) -> Result<Profile, Error> {
        let request = ApiRequest::post(role.login_path()).json(&LoginRequest { email, password })?;
        let response = self.send_once(request).await?;
        let body: LoginResponse = response.json().await?;

        self.start_session(&body.access, &body.refresh)?;

        let profile = Profile::from_login(role, &body);
        tracing::info!(role = %role, stations = profile.station_ids.len(), "Login successful");
        Ok(profile)
    }

    /// Invalidate the refresh token server-side, then clear local credentials
    /// and navigate to the login route.
    ///
    /// The revocation is authenticated by the refresh token in the body and
    /// is sent without 401 recovery, so the navigator is called once. A failed
    /// server call is logged and does not stop the local logout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if local credentials could not be removed.
    pub async fn logout(&self) -> Result<(), Error> {
        match self.store().value(self.config().refresh_cookie_name()) {
            Ok(Some(refresh)) => {
                let path = self.config().logout_path().to_string();
                let result = match ApiRequest::post(path).json(&LogoutRequest { refresh: &refresh }) {
                    Ok(request) => self.send_once(request).await.map(drop),
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Server-side logout failed");
                }
            }
            Ok(None) => tracing::debug!("No refresh token to revoke"),
            Err(e) => tracing::warn!(error = %e, "Failed to read refresh token during logout"),
        }

        let cleared = self.clear_session();
        tracing::info!("Logged out");
        self.navigate_to_login();
        cleared
    }
}
