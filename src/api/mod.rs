pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{ROUTE_POLICIES, RoutePolicy, routes};
