//! # Shipping-Line Relay
//!
//! A small HTTP relay invoked by Shopify Flow to normalize the shipping-line
//! label on an order immediately after creation, so downstream 3PL systems
//! can map orders by a canonical shipping code.
//!
//! ## Overview
//!
//! One webhook-style request per order flows through:
//!
//! - [`validate`]: storefront-domain shape check, region resolution,
//!   constant-time shared-secret verification, order-reference
//!   canonicalization
//! - [`Orchestrator`]: the five-step order-edit sequence (fetch → begin →
//!   add → conditionally remove → commit), with dry-run short-circuit
//! - [`CommerceGateway`]: authenticated, timeout-bounded Admin GraphQL calls
//! - [`RegionRegistry`]: immutable storefront-domain → credential map built
//!   once at startup
//!
//! ## Quick Start
//!
//! ```rust
//! use shipline_relay::{ApiVersion, RegionEntry, RelayConfig, RegionRegistry};
//!
//! let config = RelayConfig::builder()
//!     .region(RegionEntry::new(
//!         "de",
//!         Some("store-de.myshopify.com"),
//!         Some("shpat_abc"),
//!         Some("flow-secret"),
//!     ))
//!     .api_version(ApiVersion::latest())
//!     .build();
//!
//! let registry = RegionRegistry::from_entries(config.regions().to_vec()).unwrap();
//! assert!(registry.lookup("store-de.myshopify.com").is_some());
//! ```
//!
//! ## Running the relay
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shipline_relay::{
//!     server, AppState, CommerceGateway, Orchestrator, RegionRegistry, RelayConfig,
//! };
//!
//! let config = RelayConfig::from_env()?;
//! let registry = RegionRegistry::from_entries(config.regions().to_vec())?;
//! let orchestrator = Orchestrator::new(CommerceGateway::new(&config));
//! let app = server::router(Arc::new(AppState::new(&config, registry, orchestrator)));
//! // axum::serve(listener, app).await
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is loaded once into an immutable
//!   value and passed explicitly
//! - **Fail-fast validation**: All request validation runs before the first
//!   remote call; newtypes validate on construction
//! - **No hidden recovery**: Remote failures abort the sequence and name the
//!   failing step; nothing is rolled back silently
//! - **Thread-safe**: All shared types are `Send + Sync`
//! - **Async-first**: Designed for the Tokio runtime

pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod region;
pub mod server;
pub mod validate;

// Re-export public types at crate root for convenience
pub use config::{
    AccessToken, ApiVersion, HostUrl, RegionEntry, RelayConfig, RelayConfigBuilder, SharedSecret,
    ShopDomain,
};
pub use error::ConfigError;
pub use gateway::{CommerceGateway, GatewayError};
pub use orchestrator::{
    AppliedLine, EditError, EditMode, EditRequest, EditResult, Orchestrator, ShippingLine,
};
pub use region::{Region, RegionRegistry};
pub use server::AppState;
pub use validate::ValidationError;
