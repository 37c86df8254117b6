pub mod health;
pub mod market_data;
pub mod metrics;
pub mod p2p;
pub mod zones;

pub use health::{HealthStatus, ZoneRatesHealth};
pub use zones::{ZoneRatesRefreshResponse, ZoneRatesResponse};
