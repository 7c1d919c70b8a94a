//! Cross-cutting service plumbing: health endpoints, request-id middleware,
//! tracing bootstrap, and wire-format serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
