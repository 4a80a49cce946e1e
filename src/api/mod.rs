//! Typed REST surface of the Gas World backend.
//!
//! Each resource is reached through a borrowed handle on [`Gateway`]:
//!
//! ```rust,ignore
//! let profile = gateway.login(Role::Owner, "owner@example.com", "secret").await?;
//! let stations = gateway.stations().list().await?;
//! let pumps = gateway.pumps().by_station(stations[0].id.unwrap()).await?;
//! gateway.logout().await?;
//! ```
//!
//! All calls go through [`Gateway::send`], so an expired access token is
//! renewed transparently. Records mirror the backend serializers; fields the
//! backend may omit are `Option`s.
//!
//! [`Gateway`]: crate::gateway::Gateway
//! [`Gateway::send`]: crate::gateway::Gateway::send

mod attendants;
mod auth;
mod managers;
mod pits;
mod products;
mod pumps;
mod sales;
mod stations;

use serde::{Deserialize, Serialize};

pub use attendants::{Attendant, Attendants, NewAttendant};
pub use auth::Profile;
pub use managers::{Manager, Managers, NewManager};
pub use pits::{NewPit, Pit, PitReading, PitReadingUpdate, PitReadings, Pits};
pub use products::{NewProduct, Product, Products};
pub use pumps::{NewPump, NewPumpReading, Pump, PumpReading, PumpReadingStatus, PumpReadings, Pumps};
pub use sales::{Sale, SaleUpdate, Sales};
pub use stations::{Station, Stations};

/// Contact block shared by stations, managers and attendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Contact {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Contact {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn with_address(
        mut self,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.address = Some(address.into());
        self.city = Some(city.into());
        self.state = Some(state.into());
        self
    }

    #[must_use]
    pub fn with_zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.zip_code = Some(zip_code.into());
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// Body of a password change request.
#[derive(Serialize)]
struct PasswordChange<'a> {
    password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_skips_missing_fields() {
        let contact = Contact::new("Lekki 1", "lekki@example.com").with_phone("0800");
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["name"], "Lekki 1");
        assert_eq!(json["phone"], "0800");
        assert!(json.get("city").is_none());
    }

    #[test]
    fn contact_accepts_nulls() {
        let contact: Contact = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.com","phone":null,"city":"Lagos"}"#,
        )
        .unwrap();
        assert_eq!(contact.phone, None);
        assert_eq!(contact.city.as_deref(), Some("Lagos"));
    }
}
