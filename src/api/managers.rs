use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{Contact, PasswordChange};
use crate::error::Error;
use crate::gateway::Gateway;
use crate::types::{ManagerId, StationId};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct Manager {
    #[serde(default)]
    pub id: Option<ManagerId>,
    #[serde(flatten)]
    pub contact: Contact,
}

/// Body for creating a station manager.
#[derive(Debug, Clone, Serialize)]
pub struct NewManager {
    #[serde(flatten)]
    pub contact: Contact,
    pub password: String,
}

impl NewManager {
    #[must_use]
    pub fn new(contact: Contact, password: impl Into<String>) -> Self {
        Self {
            contact,
            password: password.into(),
        }
    }
}

/// Station manager endpoints.
pub struct Managers<'a> {
    gateway: &'a Gateway,
}

impl Gateway {
    #[must_use]
    pub fn managers(&self) -> Managers<'_> {
        Managers { gateway: self }
    }
}

impl Managers<'_> {
    pub async fn list(&self, station: StationId) -> Result<Vec<Manager>, Error> {
        self.gateway.get_json(format!("manager/{station}")).await
    }

    pub async fn by_station(&self, station: StationId) -> Result<Vec<Manager>, Error> {
        self.gateway.get_json(format!("manager/station/{station}")).await
    }

    pub async fn get(&self, station: StationId, id: ManagerId) -> Result<Manager, Error> {
        self.gateway.get_json(format!("manager/{station}/{id}")).await
    }

    /// Create the manager of `station`.
    pub async fn create(&self, station: StationId, manager: &NewManager) -> Result<Manager, Error> {
        self.gateway.post_json(format!("manager/{station}"), manager).await
    }

    pub async fn update(
        &self,
        station: StationId,
        id: ManagerId,
        manager: &Contact,
    ) -> Result<Manager, Error> {
        self.gateway
            .put_json(format!("manager/{station}/{id}"), manager)
            .await
    }

    pub async fn delete(&self, station: StationId, id: ManagerId) -> Result<(), Error> {
        self.gateway.delete(format!("manager/{station}/{id}")).await
    }

    /// Set a new password. Returns the backend's confirmation message.
    pub async fn change_password(&self, id: ManagerId, password: &str) -> Result<JsonValue, Error> {
        self.gateway
            .put_json(format!("manager/{id}/change_password"), &PasswordChange { password })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_flattens_contact() {
        let body = NewManager::new(Contact::new("Bola", "bola@example.com"), "pw");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["name"], "Bola");
        assert_eq!(json["password"], "pw");
        assert!(json.get("contact").is_none());
    }
}
