use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::gateway::Gateway;
use crate::types::{ProductId, StationId};

/// A fuel product sold at a station (PMS, AGO, ...).
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Product {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub station: StationId,
}

pub struct Products<'a> {
    gateway: &'a Gateway,
}

impl Gateway {
    #[must_use]
    pub fn products(&self) -> Products<'_> {
        Products { gateway: self }
    }
}

impl Products<'_> {
    pub async fn list(&self) -> Result<Vec<Product>, Error> {
        self.gateway.get_json("products").await
    }

    pub async fn by_station(&self, station: StationId) -> Result<Vec<Product>, Error> {
        self.gateway
            .get_json(format!("products/station/{station}"))
            .await
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, Error> {
        self.gateway.get_json(format!("products/{id}")).await
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, Error> {
        self.gateway.post_json("products", product).await
    }

    pub async fn update(&self, id: ProductId, product: &NewProduct) -> Result<Product, Error> {
        self.gateway.put_json(format!("products/{id}"), product).await
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), Error> {
        self.gateway.delete(format!("products/{id}")).await
    }
}
