//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, in-memory venues, metrics
//! exporters). Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `signal`: decision service polling over HTTP
//! - `venue`: terminal bridge REST client and paper venue
//! - `metrics`: Prometheus metrics export and health checks

pub mod metrics;
pub mod signal;
pub mod venue;
