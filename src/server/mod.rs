//! Listening socket lifecycle: `init`, `poll`, `shutdown`.

pub mod listener;

pub use listener::{PollSummary, Server};
