use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, trace, warn};

use crate::buffer::BufferPool;
use crate::config::{DEFAULT_REQUEST_CAPACITY, DEFAULT_RESPONSE_CAPACITY, ServerConfig};
use crate::error::{Result, ServerError};
use crate::http::connection::{CloseReason, Connection, ConnectionOutcome};
use crate::http::router::Router;
use crate::sensor::SensorState;

/// Poll-driven HTTP responder.
///
/// Call [`init`](Server::init) once, [`poll`](Server::poll) from the main
/// loop, and [`shutdown`](Server::shutdown) (or drop) at the end. Each
/// `poll` handles at most `max_accept_per_poll` connections, one after the
/// other, and returns.
pub struct Server<
    's,
    const REQ: usize = DEFAULT_REQUEST_CAPACITY,
    const RESP: usize = DEFAULT_RESPONSE_CAPACITY,
> {
    config: ServerConfig,
    router: Router<'s>,
    buffers: BufferPool<REQ, RESP>,
    listener: Option<TcpListener>,
}

/// Counters for one `poll` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub accepted: usize,
    pub served: usize,
    pub dropped: usize,
}

impl<'s, const REQ: usize, const RESP: usize> Server<'s, REQ, RESP> {
    pub fn new(config: ServerConfig, sensors: &'s SensorState) -> Self {
        Self {
            config,
            router: Router::new(sensors),
            buffers: BufferPool::new(),
            listener: None,
        }
    }

    /// Binds and starts listening. Returns the bound address, which differs
    /// from the configured one when port 0 was requested.
    pub fn init(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.local_addr() {
            return Err(ServerError::AlreadyRunning(addr));
        }

        let listener = bind_listener(&self.config)?;
        let addr = listener.local_addr().unwrap_or(self.config.listen_addr);
        info!(%addr, backlog = self.config.backlog, "Listening");

        self.listener = Some(listener);
        Ok(addr)
    }

    /// Accepts and fully handles up to `max_accept_per_poll` pending
    /// connections. Does nothing when the server is not listening.
    pub fn poll(&mut self) -> PollSummary {
        let mut summary = PollSummary::default();
        let Some(listener) = self.listener.as_ref() else {
            return summary;
        };

        let mut slots = self.config.max_accept_per_poll;
        while slots > 0 {
            let (stream, peer) = match listener.accept() {
                Ok(accepted) => accepted,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    break;
                }
            };
            slots -= 1;
            summary.accepted += 1;

            match serve(stream, peer, &self.config, &self.router, &mut self.buffers) {
                ConnectionOutcome::Served { .. } => summary.served += 1,
                ConnectionOutcome::Dropped(_) => summary.dropped += 1,
            }
        }

        summary
    }

    /// Closes the listening socket. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if let Some(listener) = self.listener.take() {
            match listener.local_addr() {
                Ok(addr) => info!(%addr, "Server shut down"),
                Err(_) => info!("Server shut down"),
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl<const REQ: usize, const RESP: usize> Drop for Server<'_, REQ, RESP> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// socket, SO_REUSEADDR, bind, listen, non-blocking. A failure at any step
/// drops the half-built socket.
fn bind_listener(config: &ServerConfig) -> Result<TcpListener> {
    let addr = config.listen_addr;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(ServerError::Socket)?;
    socket
        .set_reuse_address(true)
        .map_err(ServerError::ReuseAddress)?;
    socket
        .bind(&addr.into())
        .map_err(|source| ServerError::Bind { addr, source })?;
    socket
        .listen(config.backlog)
        .map_err(|source| ServerError::Listen { addr, source })?;
    socket
        .set_nonblocking(true)
        .map_err(ServerError::NonBlocking)?;

    Ok(socket.into())
}

fn serve<const REQ: usize, const RESP: usize>(
    stream: TcpStream,
    peer: SocketAddr,
    config: &ServerConfig,
    router: &Router<'_>,
    buffers: &mut BufferPool<REQ, RESP>,
) -> ConnectionOutcome {
    if let Err(e) = prepare_stream(&stream, config) {
        warn!(%peer, error = %e, "failed to configure connection, closing");
        return ConnectionOutcome::Dropped(CloseReason::ReceiveFailed(e.kind()));
    }

    let outcome = Connection::new(stream, buffers.split(), router).run();

    match outcome {
        ConnectionOutcome::Served { route, bytes } => {
            debug!(%peer, ?route, bytes, "Response sent");
        }
        ConnectionOutcome::Dropped(
            reason @ (CloseReason::ReceiveFailed(_) | CloseReason::SendFailed(_)),
        ) => {
            warn!(%peer, ?reason, "Connection dropped");
        }
        ConnectionOutcome::Dropped(reason) => {
            debug!(%peer, ?reason, "Connection dropped");
        }
    }

    outcome
}

/// Accepted sockets may inherit non-blocking mode from the listener on some
/// platforms. Handling is blocking, bounded by the socket timeouts.
fn prepare_stream(stream: &TcpStream, config: &ServerConfig) -> std::io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(config.receive_timeout()))?;
    stream.set_write_timeout(Some(config.send_timeout()))?;

    if let Err(e) = stream.set_nodelay(true) {
        trace!(error = %e, "TCP_NODELAY not applied");
    }

    Ok(())
}
