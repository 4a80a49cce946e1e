use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::gateway::Gateway;
use crate::types::{Amount, AttendantId, PitId, ProductId, PumpId, PumpReadingId, StationId};

#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Pump {
    #[serde(default)]
    pub id: Option<PumpId>,
    pub name: String,
    pub station: StationId,
    pub product_type: ProductId,
    pub initial_meter: Amount,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Body for creating or replacing a pump. A pump draws from one pit.
#[derive(Debug, Clone, Serialize)]
pub struct NewPump {
    pub name: String,
    pub station: StationId,
    pub product_type: ProductId,
    pub initial_meter: Amount,
    pub pump_pit: PitId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PumpReadingStatus {
    Accepted,
    Pending,
    Completed,
}

/// Opening and closing meter of one attendant shift on a pump.
///
/// `pump` and `attendant` are display names. `liters_sold` and `amount` are
/// computed by the backend.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct PumpReading {
    #[serde(default)]
    pub id: Option<PumpReadingId>,
    pub pump: String,
    pub attendant: String,
    pub opening_meter: Amount,
    pub closing_meter: Amount,
    pub rate: Amount,
    #[serde(default)]
    pub liters_sold: Option<Amount>,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub status: Option<PumpReadingStatus>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

/// Body for recording a shift on a pump.
///
/// Leave `opening_meter` empty to continue from the pump's last closing meter.
#[derive(Debug, Clone, Serialize)]
pub struct NewPumpReading {
    pub attendant: AttendantId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_meter: Option<Amount>,
    pub closing_meter: Amount,
    pub rate: Amount,
}

pub struct Pumps<'a> {
    gateway: &'a Gateway,
}

pub struct PumpReadings<'a> {
    gateway: &'a Gateway,
}

impl Gateway {
    #[must_use]
    pub fn pumps(&self) -> Pumps<'_> {
        Pumps { gateway: self }
    }

    #[must_use]
    pub fn pump_readings(&self) -> PumpReadings<'_> {
        PumpReadings { gateway: self }
    }
}

impl Pumps<'_> {
    pub async fn list(&self) -> Result<Vec<Pump>, Error> {
        self.gateway.get_json("pumps").await
    }

    pub async fn by_station(&self, station: StationId) -> Result<Vec<Pump>, Error> {
        self.gateway.get_json(format!("pumps/station/{station}")).await
    }

    pub async fn by_product(&self, product: ProductId) -> Result<Vec<Pump>, Error> {
        self.gateway.get_json(format!("pumps/product/{product}")).await
    }

    pub async fn by_pit(&self, pit: PitId) -> Result<Vec<Pump>, Error> {
        self.gateway.get_json(format!("pumps/pit/{pit}/")).await
    }

    pub async fn get(&self, id: PumpId) -> Result<Pump, Error> {
        self.gateway.get_json(format!("pumps/{id}")).await
    }

    pub async fn create(&self, pump: &NewPump) -> Result<Pump, Error> {
        self.gateway.post_json("pumps", pump).await
    }

    pub async fn update(&self, id: PumpId, pump: &NewPump) -> Result<Pump, Error> {
        self.gateway.put_json(format!("pumps/{id}"), pump).await
    }

    pub async fn delete(&self, id: PumpId) -> Result<(), Error> {
        self.gateway.delete(format!("pumps/{id}")).await
    }
}

impl PumpReadings<'_> {
    pub async fn for_pump(&self, pump: PumpId) -> Result<Vec<PumpReading>, Error> {
        self.gateway
            .get_json(format!("pumpreadings/pump/{pump}"))
            .await
    }

    /// Record a shift on `pump`. The backend opens the matching sale and pit reading.
    pub async fn create(
        &self,
        pump: PumpId,
        reading: &NewPumpReading,
    ) -> Result<PumpReading, Error> {
        self.gateway
            .post_json(format!("pumpreadings/pump/{pump}"), reading)
            .await
    }

    pub async fn by_station(&self, station: StationId) -> Result<Vec<PumpReading>, Error> {
        self.gateway
            .get_json(format!("pumpreadings/station/{station}"))
            .await
    }

    pub async fn by_attendant(&self, attendant: AttendantId) -> Result<Vec<PumpReading>, Error> {
        self.gateway
            .get_json(format!("pumpreadings/attendant/{attendant}"))
            .await
    }

    pub async fn get(&self, id: PumpReadingId) -> Result<PumpReading, Error> {
        self.gateway.get_json(format!("pumpreadings/{id}")).await
    }

    pub async fn update(
        &self,
        id: PumpReadingId,
        reading: &NewPumpReading,
    ) -> Result<PumpReading, Error> {
        self.gateway
            .put_json(format!("pumpreadings/{id}"), reading)
            .await
    }

    pub async fn delete(&self, id: PumpReadingId) -> Result<(), Error> {
        self.gateway.delete(format!("pumpreadings/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pump_reading_accepts_computed_numbers() {
        let reading: PumpReading = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000010",
                "pump": "Pump 1",
                "attendant": "Chidi",
                "opening_meter": "1000.00",
                "closing_meter": "1250.50",
                "rate": "617.00",
                "liters_sold": 250.5,
                "amount": 154558.5,
                "timestamp": "2024-05-01T18:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(reading.liters_sold.unwrap().as_str(), "250.5");
        assert_eq!(reading.status, None);
    }

    #[test]
    fn new_reading_omits_missing_opening_meter() {
        let body = NewPumpReading {
            attendant: AttendantId(uuid::Uuid::nil()),
            opening_meter: None,
            closing_meter: "1250.50".into(),
            rate: "617.00".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("opening_meter").is_none());
        assert_eq!(json["closing_meter"], "1250.50");
    }

    #[test]
    fn status_uses_backend_spelling() {
        let status: PumpReadingStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, PumpReadingStatus::Completed);
    }
}
