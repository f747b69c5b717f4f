//! Codecs for the two stream layers
//!
//! The backend speaks NDJSON, the client speaks SSE. Both layers drop malformed units
//! through [`json::parse_or_skip`] so they agree on what "malformed" means.
pub mod extract;
pub mod json;
pub mod ndjson;
pub mod sse;
