//! Errors surfaced by [`Server::init`](crate::server::Server::init).
//!
//! Everything that can go wrong after init is local to one connection and
//! ends up as a [`CloseReason`](crate::http::connection::CloseReason)
//! instead.

use std::io;
use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server is already listening on {0}")]
    AlreadyRunning(SocketAddr),

    #[error("failed to create socket: {0}")]
    Socket(#[source] io::Error),

    #[error("failed to set SO_REUSEADDR: {0}")]
    ReuseAddress(#[source] io::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to listen on {addr}: {source}")]
    Listen {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to make listener non-blocking: {0}")]
    NonBlocking(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
