#![doc = include_str!("../README.md")]

pub mod error;
pub mod gateway;

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "api")]
pub mod types;

// Re-exports for convenient access
pub use error::Error;
pub use gateway::{
    ApiRequest, CookiePolicy, CredentialStore, FileStore, Gateway, GatewayConfig, MemoryStore,
    Navigator, NoopNavigator,
};
#[cfg(feature = "api")]
pub use api::Profile;
#[cfg(feature = "api")]
pub use types::{
    Amount, AttendantId, ManagerId, OwnerId, PitId, PitReadingId, ProductId, PumpId,
    PumpReadingId, Role, SaleId, StationId,
};
