//! HTTP clients for external service providers.

pub mod open_ai;
pub mod zoom;
