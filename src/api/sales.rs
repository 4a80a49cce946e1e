use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::gateway::Gateway;
use crate::types::{Amount, AttendantId, PumpId, SaleId, StationId};

/// Money collected for one pump reading.
///
/// `shortage_or_excess` is computed by the backend from the reading amount
/// and the collected total.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Sale {
    pub id: SaleId,
    #[serde(default)]
    pub pump_reading_name: Option<String>,
    #[serde(default)]
    pub attendant_name: Option<String>,
    pub cash: Amount,
    pub transfer: Amount,
    pub pos: Amount,
    pub expenses: Amount,
    #[serde(default)]
    pub shortage_or_excess: Option<Amount>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

fn default_active() -> bool {
    true
}

/// Partial update of a sale. Setting `is_active` to `false` closes the shift.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SaleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub struct Sales<'a> {
    gateway: &'a Gateway,
}

impl Gateway {
    #[must_use]
    pub fn sales(&self) -> Sales<'_> {
        Sales { gateway: self }
    }
}

impl Sales<'_> {
    pub async fn list(&self) -> Result<Vec<Sale>, Error> {
        self.gateway.get_json("sales").await
    }

    pub async fn get(&self, id: SaleId) -> Result<Sale, Error> {
        self.gateway.get_json(format!("sales/{id}")).await
    }

    pub async fn update(&self, id: SaleId, update: &SaleUpdate) -> Result<Sale, Error> {
        self.gateway.patch_json(format!("sales/{id}"), update).await
    }

    pub async fn by_station(&self, station: StationId) -> Result<Vec<Sale>, Error> {
        self.gateway.get_json(format!("sales/station/{station}")).await
    }

    pub async fn by_pump(&self, pump: PumpId) -> Result<Vec<Sale>, Error> {
        self.gateway.get_json(format!("sales/pump/{pump}")).await
    }

    pub async fn by_attendant(&self, attendant: AttendantId) -> Result<Vec<Sale>, Error> {
        self.gateway
            .get_json(format!("sales/attendant/{attendant}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_update_only_sends_set_fields() {
        let update = SaleUpdate {
            cash: Some("150000.00".into()),
            is_active: Some(false),
            ..SaleUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["cash"], "150000.00");
        assert_eq!(json["is_active"], false);
        assert!(json.get("pos").is_none());
    }

    #[test]
    fn sale_parses_backend_shape() {
        let sale: Sale = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000030",
                "pump_reading_name": "Pump 1",
                "attendant_name": "Chidi",
                "cash": "150000.00",
                "transfer": "4000.00",
                "pos": "0.00",
                "expenses": "500.00",
                "shortage_or_excess": "58.50",
                "is_active": true,
                "timestamp": "2024-05-01T18:00:00Z",
                "created_at": "2024-05-01T18:00:00Z",
                "updated_at": "2024-05-01T18:05:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(sale.shortage_or_excess.unwrap().as_str(), "58.50");
        assert!(sale.is_active);
    }
}
