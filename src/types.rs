use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr,
            From, Into,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);
    };
}

uuid_id!(
    /// Backend identifier of an owner account.
    OwnerId
);
uuid_id!(
    /// Backend identifier of a station.
    StationId
);
uuid_id!(
    /// Backend identifier of a station manager.
    ManagerId
);
uuid_id!(
    /// Backend identifier of a station attendant.
    AttendantId
);
uuid_id!(ProductId);
uuid_id!(PumpId);
uuid_id!(PumpReadingId);
uuid_id!(PitId);
uuid_id!(PitReadingId);
uuid_id!(SaleId);

/// Decimal amount as serialized by the backend (`"1250.00"`).
///
/// Kept as text so no precision is lost in transit. Computed fields arrive as
/// JSON numbers and are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display, From, Into)]
#[serde(transparent)]
pub struct Amount(pub String);

impl Amount {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// Account role. Each role logs in through its own endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Manager,
    Attendant,
}

impl Role {
    /// Login endpoint relative to the API base.
    #[must_use]
    pub fn login_path(self) -> &'static str {
        match self {
            Self::Owner => "owner/login",
            Self::Manager => "manager/login",
            Self::Attendant => "attendant/login",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Manager => "manager",
            Self::Attendant => "attendant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "manager" => Ok(Self::Manager),
            "attendant" => Ok(Self::Attendant),
            other => Err(Error::Config(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_login_paths() {
        assert_eq!(Role::Owner.login_path(), "owner/login");
        assert_eq!(Role::Manager.login_path(), "manager/login");
        assert_eq!(Role::Attendant.login_path(), "attendant/login");
    }

    #[test]
    fn role_parses_from_str() {
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert!("cashier".parse::<Role>().is_err());
    }

    #[test]
    fn role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Attendant).unwrap(), "\"attendant\"");
    }

    #[test]
    fn station_id_serde_roundtrip() {
        let id = StationId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
        let parsed: StationId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_display_matches_path_segment() {
        let id: PumpId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert_eq!(format!("pumps/{id}"), "pumps/67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn newtypes_prevent_mixing() {
        fn takes_station(_: StationId) {}
        fn takes_pump(_: PumpId) {}

        takes_station(StationId(Uuid::nil()));
        takes_pump(PumpId(Uuid::nil()));
        // takes_station(PumpId(Uuid::nil()));  // Compile error!
    }

    #[test]
    fn amount_keeps_backend_text() {
        let amount: Amount = serde_json::from_str("\"1250.50\"").unwrap();
        assert_eq!(amount.as_str(), "1250.50");
    }

    #[test]
    fn amount_accepts_numbers() {
        let amount: Amount = serde_json::from_str("42.5").unwrap();
        assert_eq!(amount.as_str(), "42.5");
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"42.5\"");
    }
}
