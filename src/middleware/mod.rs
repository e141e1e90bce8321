/*
 * Responsibility
 * - Router-level layers (cors, http, security_headers) and the per-route gate
 */
pub mod cors;
pub mod gate;
pub mod http;
pub mod security_headers;
