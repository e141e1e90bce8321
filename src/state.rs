/*
 * Responsibility
 * - Shared context handed to the Router (AppState)
 * - Cheap to Clone; the gate lives behind an Arc
 */
use std::sync::Arc;

use crate::services::gate::TokenGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<TokenGate>,
}

impl AppState {
    pub fn new(gate: Arc<TokenGate>) -> Self {
        Self { gate }
    }
}
