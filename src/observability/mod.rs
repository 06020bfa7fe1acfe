//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config loader, resolvers, task runner, HTTP surface
//!     → tracing events with structured fields
//!     → logging.rs subscriber (fmt layer, EnvFilter)
//!     → stdout
//! ```

pub mod logging;
