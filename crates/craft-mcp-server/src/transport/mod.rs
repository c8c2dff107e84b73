//! Transport adapters
//!
//! Each adapter owns connection lifecycle and framing for one transport and
//! hands every request to the shared dispatcher. The stdio transport is a
//! single sequential loop (one request in flight at a time); the TCP
//! transport runs a task per connection; HTTP rides on the runtime's
//! listener.

pub mod http;
pub mod stdio;
pub mod tcp;
