//! Authenticated API gateway for the Gas World backend.
//!
//! Every backend call goes through [`Gateway::send`]. The gateway reads the
//! session credentials from an injected [`CredentialStore`], attaches them as
//! `Authorization: Bearer ...` and `X-CSRFToken` headers, and recovers from an
//! expired access token on its own:
//!
//! 1. a request answered with `401` that has not been retried is marked retried,
//! 2. the stored refresh token is exchanged for a new access token,
//! 3. the request is sent again, once, with the new token.
//!
//! If no new token can be obtained, the access and refresh tokens are removed,
//! the [`Navigator`] is sent to the login route, and the original `401` is
//! returned to the caller.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gas_world_client::gateway::{Gateway, GatewayConfig, FileStore};
//!
//! let config = GatewayConfig::from_env()?;
//! let store = FileStore::open("credentials.json")?;
//! let gateway = Gateway::new(config, store)
//!     .with_navigator(|route: &str| println!("redirect to {route}"));
//!
//! let stations: serde_json::Value = gateway.get_json("/stations").await?;
//! ```

mod client;
mod config;
mod cookies;
mod navigator;
mod refresh;
mod request;
mod store;

pub use client::Gateway;
pub use config::GatewayConfig;
pub use cookies::CookiePolicy;
pub use navigator::{Navigator, NoopNavigator};
pub use request::ApiRequest;
pub use store::{CredentialStore, FileStore, MemoryStore};

/// Re-export cookie types used by [`CredentialStore`] and [`CookiePolicy`].
pub use cookie::{Cookie, SameSite};
