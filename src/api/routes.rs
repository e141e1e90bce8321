/*
 * Responsibility
 * - URL layout of the API
 * - Each route declares the capability level it needs; the gate layer is
 *   attached from this table, not from the handlers
 */
use axum::{
    Router,
    routing::{MethodFilter, MethodRouter, on},
};

use crate::api::handlers::{health, resources};
use crate::middleware::gate;
use crate::services::gate::CapabilityLevel;
use crate::state::AppState;

pub struct RoutePolicy {
    pub path: &'static str,
    pub method: MethodFilter,
    pub level: CapabilityLevel,
    // Binds the handler to whatever `method` says
    mount: fn(MethodFilter) -> MethodRouter<AppState>,
}

pub const ROUTE_POLICIES: &[RoutePolicy] = &[
    RoutePolicy {
        path: "/",
        method: MethodFilter::GET,
        level: CapabilityLevel::None,
        mount: |method| on(method, health::index),
    },
    RoutePolicy {
        path: "/health",
        method: MethodFilter::GET,
        level: CapabilityLevel::None,
        mount: |method| on(method, health::health),
    },
    RoutePolicy {
        path: "/public",
        method: MethodFilter::GET,
        level: CapabilityLevel::None,
        mount: |method| on(method, resources::public),
    },
    RoutePolicy {
        path: "/protected",
        method: MethodFilter::GET,
        level: CapabilityLevel::Authenticated,
        mount: |method| on(method, resources::protected),
    },
    RoutePolicy {
        path: "/admin",
        method: MethodFilter::POST,
        level: CapabilityLevel::Admin,
        mount: |method| on(method, resources::admin),
    },
];

pub fn routes(state: &AppState) -> Router<AppState> {
    ROUTE_POLICIES.iter().fold(Router::new(), |router, policy| {
        tracing::debug!(path = policy.path, level = %policy.level, "mounting route");
        router.route(
            policy.path,
            gate::require(state, policy.level, (policy.mount)(policy.method)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(path: &str) -> &'static RoutePolicy {
        ROUTE_POLICIES
            .iter()
            .find(|p| p.path == path)
            .unwrap_or_else(|| panic!("no policy for {path}"))
    }

    #[test]
    fn capability_table() {
        assert_eq!(policy("/").level, CapabilityLevel::None);
        assert_eq!(policy("/health").level, CapabilityLevel::None);
        assert_eq!(policy("/public").level, CapabilityLevel::None);
        assert_eq!(policy("/protected").level, CapabilityLevel::Authenticated);
        assert_eq!(policy("/admin").level, CapabilityLevel::Admin);
        assert!(ROUTE_POLICIES.iter().all(|p| p.path != "/nope"));
    }

    #[test]
    fn paths_are_unique() {
        let mut paths: Vec<_> = ROUTE_POLICIES.iter().map(|p| p.path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), ROUTE_POLICIES.len());
    }

    #[test]
    fn admin_is_the_only_post() {
        let posts: Vec<_> = ROUTE_POLICIES
            .iter()
            .filter(|p| p.method == MethodFilter::POST)
            .map(|p| p.path)
            .collect();
        assert_eq!(posts, vec!["/admin"]);
    }
}
