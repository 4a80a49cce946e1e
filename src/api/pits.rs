use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::gateway::Gateway;
use crate::types::{Amount, PitId, PitReadingId, ProductId, PumpId, StationId};

/// An underground storage tank holding one product.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Pit {
    #[serde(default)]
    pub id: Option<PitId>,
    pub name: String,
    pub pit_product: ProductId,
    pub station: StationId,
    #[serde(default)]
    pub current_volume: f64,
    pub max_volume: f64,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPit {
    pub name: String,
    pub pit_product: ProductId,
    pub station: StationId,
    pub current_volume: f64,
    pub max_volume: f64,
}

/// Stock movement of a pit over one shift.
///
/// Everything except `actual_closing_stock` is filled in by the backend;
/// `excess_or_shortage` stays empty until the dip reading is recorded.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct PitReading {
    #[serde(default)]
    pub id: Option<PitReadingId>,
    #[serde(default)]
    pub reading_pit: Option<PitId>,
    #[serde(default)]
    pub pit_name: Option<String>,
    #[serde(default)]
    pub supply: f64,
    pub opening_stock: f64,
    #[serde(default)]
    pub closing_stock: Option<f64>,
    #[serde(default)]
    pub actual_closing_stock: Option<f64>,
    #[serde(default)]
    pub excess_or_shortage: Option<Amount>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

/// The only writable field of a pit reading: the measured closing stock.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PitReadingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_closing_stock: Option<f64>,
}

pub struct Pits<'a> {
    gateway: &'a Gateway,
}

pub struct PitReadings<'a> {
    gateway: &'a Gateway,
}

impl Gateway {
    #[must_use]
    pub fn pits(&self) -> Pits<'_> {
        Pits { gateway: self }
    }

    #[must_use]
    pub fn pit_readings(&self) -> PitReadings<'_> {
        PitReadings { gateway: self }
    }
}

impl Pits<'_> {
    pub async fn list(&self) -> Result<Vec<Pit>, Error> {
        self.gateway.get_json("pits").await
    }

    pub async fn by_station(&self, station: StationId) -> Result<Vec<Pit>, Error> {
        self.gateway.get_json(format!("pits/station/{station}")).await
    }

    pub async fn by_product(&self, product: ProductId) -> Result<Vec<Pit>, Error> {
        self.gateway.get_json(format!("pits/product/{product}")).await
    }

    pub async fn get(&self, id: PitId) -> Result<Pit, Error> {
        self.gateway.get_json(format!("pits/{id}")).await
    }

    pub async fn create(&self, pit: &NewPit) -> Result<Pit, Error> {
        self.gateway.post_json("pits", pit).await
    }

    pub async fn update(&self, id: PitId, pit: &NewPit) -> Result<Pit, Error> {
        self.gateway.put_json(format!("pits/{id}"), pit).await
    }

    pub async fn delete(&self, id: PitId) -> Result<(), Error> {
        self.gateway.delete(format!("pits/{id}")).await
    }
}

impl PitReadings<'_> {
    pub async fn create(&self, pit: PitId, reading: &PitReadingUpdate) -> Result<PitReading, Error> {
        self.gateway
            .post_json(format!("pitreadings/pit/{pit}"), reading)
            .await
    }

    pub async fn by_pit(&self, pit: PitId) -> Result<Vec<PitReading>, Error> {
        self.gateway
            .get_json(format!("pitreadings/pit-get/{pit}"))
            .await
    }

    pub async fn by_station(&self, station: StationId) -> Result<Vec<PitReading>, Error> {
        self.gateway
            .get_json(format!("pitreadings/station/{station}"))
            .await
    }

    pub async fn by_pump(&self, pump: PumpId) -> Result<Vec<PitReading>, Error> {
        self.gateway
            .get_json(format!("pitreadings/pump/{pump}"))
            .await
    }

    pub async fn get(&self, id: PitReadingId) -> Result<PitReading, Error> {
        self.gateway.get_json(format!("pitreadings/{id}")).await
    }

    /// Record the measured closing stock of a reading.
    pub async fn update(
        &self,
        id: PitReadingId,
        reading: &PitReadingUpdate,
    ) -> Result<PitReading, Error> {
        self.gateway
            .patch_json(format!("pitreadings/{id}"), reading)
            .await
    }

    pub async fn delete(&self, id: PitReadingId) -> Result<(), Error> {
        self.gateway.delete(format!("pitreadings/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_pit_reading_parses() {
        let reading: PitReading = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000020",
                "reading_pit": "00000000-0000-0000-0000-000000000021",
                "pit_name": "Tank A",
                "supply": 0.0,
                "opening_stock": 33000.0,
                "closing_stock": 32750.0,
                "actual_closing_stock": null,
                "excess_or_shortage": null
            }"#,
        )
        .unwrap();

        assert_eq!(reading.pit_name.as_deref(), Some("Tank A"));
        assert!(reading.excess_or_shortage.is_none());
    }

    #[test]
    fn empty_update_serializes_to_empty_object() {
        let json = serde_json::to_string(&PitReadingUpdate::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
