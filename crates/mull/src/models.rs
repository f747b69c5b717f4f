//! These models represent the objects passed between the browser, the relay and the model
//!
//! There are three related formats:
//! - chat messages, sent from the client to the relay and on to the backend
//! - backend NDJSON chunks, streamed from the model server to the relay
//! - SSE fragments, streamed from the relay to the client
//!
//! The transcript kept by the client is made of [`message::Message`] values, which carry
//! the thinking trace alongside the answer. The trace is never part of the wire form.
pub mod frame;
pub mod message;
