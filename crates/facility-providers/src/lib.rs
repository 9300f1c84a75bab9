//! Concrete providers for the facility orchestrator: an HTTP gateway client
//! for nearby search and routing, and a fixed-origin location provider.

pub mod client;
pub mod error;
pub mod fixed;
pub(crate) mod retry;

pub use client::GatewayClient;
pub use error::ProviderError;
pub use fixed::FixedLocationProvider;
