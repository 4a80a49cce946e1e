use serde::Deserialize;
use time::OffsetDateTime;

use super::{Attendant, Contact, Manager};
use crate::error::Error;
use crate::gateway::Gateway;
use crate::types::{OwnerId, StationId};

/// A filling station.
///
/// Create and update responses echo only the contact block, so `id` and the
/// relations are optional.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Station {
    #[serde(default)]
    pub id: Option<StationId>,
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(default)]
    pub owner: Option<OwnerId>,
    #[serde(default)]
    pub manager: Option<Manager>,
    #[serde(default)]
    pub attendants: Vec<Attendant>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Station endpoints (owner only).
pub struct Stations<'a> {
    gateway: &'a Gateway,
}

impl Gateway {
    #[must_use]
    pub fn stations(&self) -> Stations<'_> {
        Stations { gateway: self }
    }
}

impl Stations<'_> {
    pub async fn list(&self) -> Result<Vec<Station>, Error> {
        self.gateway.get_json("stations").await
    }

    pub async fn get(&self, id: StationId) -> Result<Station, Error> {
        self.gateway.get_json(format!("stations/{id}")).await
    }

    pub async fn create(&self, station: &Contact) -> Result<Station, Error> {
        self.gateway.post_json("stations", station).await
    }

    pub async fn update(&self, id: StationId, station: &Contact) -> Result<Station, Error> {
        self.gateway.put_json(format!("stations/{id}"), station).await
    }

    pub async fn delete(&self, id: StationId) -> Result<(), Error> {
        self.gateway.delete(format!("stations/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_with_nested_staff_parses() {
        let station: Station = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000001",
                "name": "Lekki 1",
                "email": "lekki@example.com",
                "city": "Lagos",
                "owner": "00000000-0000-0000-0000-0000000000aa",
                "manager": {
                    "id": "00000000-0000-0000-0000-0000000000bb",
                    "name": "Bola",
                    "email": "bola@example.com"
                },
                "attendants": [],
                "created_at": "2024-05-01T10:00:00.123456Z",
                "updated_at": "2024-05-02T08:30:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(station.contact.name, "Lekki 1");
        assert_eq!(station.manager.unwrap().contact.name, "Bola");
        assert!(station.created_at.is_some());
    }

    #[test]
    fn create_echo_without_id_parses() {
        let station: Station =
            serde_json::from_str(r#"{"name":"Ikeja","email":"ikeja@example.com"}"#).unwrap();
        assert!(station.id.is_none());
        assert!(station.attendants.is_empty());
    }
}
