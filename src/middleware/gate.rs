//! Bearer token check → `VerifiedClaims` in request extensions.
//!
//! Applied per route with the capability level that route declares. The
//! handler only ever sees requests the gate allowed.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::error::AppError;
use crate::services::gate::{CapabilityLevel, Decision};
use crate::state::AppState;

#[derive(Clone)]
struct GateLayerState {
    app: AppState,
    level: CapabilityLevel,
}

/// Wrap `route` so that requests must satisfy `level`.
///
/// ```ignore
/// .route("/admin", middleware::gate::require(&state, CapabilityLevel::Admin, post(admin)))
/// ```
pub fn require(
    state: &AppState,
    level: CapabilityLevel,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let layer_state = GateLayerState {
        app: state.clone(),
        level,
    };
    // route_layer so unmatched methods still fall through to 405
    route.route_layer(middleware::from_fn_with_state(layer_state, gate_middleware))
}

async fn gate_middleware(
    State(gate): State<GateLayerState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let decision = gate
        .app
        .gate
        .authorize_header(req.headers().get(header::AUTHORIZATION), gate.level);

    let claims = match decision {
        Decision::Allow(claims) => claims,
        Decision::Deny(reason) => {
            tracing::warn!(
                reason = reason.as_str(),
                level = %gate.level,
                method = %req.method(),
                path = %req.uri().path(),
                "request denied"
            );
            return Err(AppError::Denied(reason));
        }
    };

    if let Some(subject) = claims.subject.as_deref() {
        tracing::debug!(subject, level = %gate.level, "request allowed");
    }

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
