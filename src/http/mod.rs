//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! GET /
//!     → server.rs index handler
//!     → Resolver::resolve_import("write_log") → call with a message
//!     → Resolver::resolve_path("log_writer")
//!     → JSON { message, log_path }
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
