//! # credence-observability
//!
//! Structured logging for the Credence components: subscriber setup driven by
//! [`ObservabilityConfig`](credence_core::config::ObservabilityConfig) and one
//! span macro per component.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, spans::names};
