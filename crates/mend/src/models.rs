//! These models represent the objects passed around by the assistant
//!
//! The internal message format is deliberately close to the wire format
//! of OpenAI-compatible chat endpoints (`{role, content}` records), since
//! that is the only external consumer. Conversion helpers in
//! `providers::utils` build the actual request payloads.
pub mod message;
pub mod role;
