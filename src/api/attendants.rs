use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{Contact, PasswordChange};
use crate::error::Error;
use crate::gateway::Gateway;
use crate::types::{AttendantId, StationId};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct Attendant {
    #[serde(default)]
    pub id: Option<AttendantId>,
    #[serde(flatten)]
    pub contact: Contact,
}

/// Body for creating a pump attendant.
#[derive(Debug, Clone, Serialize)]
pub struct NewAttendant {
    #[serde(flatten)]
    pub contact: Contact,
    pub password: String,
}

impl NewAttendant {
    #[must_use]
    pub fn new(contact: Contact, password: impl Into<String>) -> Self {
        Self {
            contact,
            password: password.into(),
        }
    }
}

/// Attendant endpoints (station manager only).
pub struct Attendants<'a> {
    gateway: &'a Gateway,
}

impl Gateway {
    #[must_use]
    pub fn attendants(&self) -> Attendants<'_> {
        Attendants { gateway: self }
    }
}

impl Attendants<'_> {
    pub async fn list(&self, station: StationId) -> Result<Vec<Attendant>, Error> {
        self.gateway.get_json(format!("attendants/{station}")).await
    }

    pub async fn get(&self, station: StationId, id: AttendantId) -> Result<Attendant, Error> {
        self.gateway
            .get_json(format!("attendants/{station}/{id}"))
            .await
    }

    pub async fn create(
        &self,
        station: StationId,
        attendant: &NewAttendant,
    ) -> Result<Attendant, Error> {
        self.gateway
            .post_json(format!("attendants/{station}"), attendant)
            .await
    }

    pub async fn update(
        &self,
        station: StationId,
        id: AttendantId,
        attendant: &Contact,
    ) -> Result<Attendant, Error> {
        self.gateway
            .put_json(format!("attendants/{station}/{id}"), attendant)
            .await
    }

    pub async fn delete(&self, station: StationId, id: AttendantId) -> Result<(), Error> {
        self.gateway
            .delete(format!("attendants/{station}/{id}"))
            .await
    }

    pub async fn change_password(
        &self,
        id: AttendantId,
        password: &str,
    ) -> Result<JsonValue, Error> {
        self.gateway
            .put_json(
                format!("attendant/{id}/change_password"),
                &PasswordChange { password },
            )
            .await
    }
}
