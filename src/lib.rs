//! P2P energy trade pricing: transaction cost estimation across grid
//! zones, plus order book depth and price-impact analytics.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod router;
pub mod services;
pub mod startup;

pub use app_state::AppState;
pub use config::{Config, PricingConfig};
pub use error::{ApiError, PricingError};
pub use router::build_router;
