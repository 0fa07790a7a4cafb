//! HTTP API handlers for marquee-resolver

pub mod health;
pub mod search;
pub mod titles;

pub use health::health_routes;
pub use search::search_routes;
pub use titles::title_routes;
