//! Concrete protocol handlers, grouped by protocol family. Each handler
//! adapts one inbound message type onto the matching core exchange operation.
pub mod credential;
