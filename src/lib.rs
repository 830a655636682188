//! picodash - poll-driven sensor dashboard server
//!
//! Serves a static dashboard at `/` and the current sensor readings as JSON
//! at `/data`, using two fixed buffers and no allocation per request.

pub mod buffer;
pub mod config;
pub mod error;
pub mod http;
pub mod sensor;
pub mod server;
