use std::io::{ErrorKind, Read, Write};

use tracing::{debug, trace};

use crate::http::parser::{ParseError, parse_request_line};
use crate::http::router::{Route, Router};
use crate::http::writer::BuildError;

/// Consecutive would-block results tolerated while sending. With a send
/// timeout on the socket each one already waited that long.
pub const SEND_RETRY_LIMIT: u32 = 3;

/// Drives one accepted stream from the first read to close.
///
/// The stream is owned and dropped when [`Connection::run`] returns, which
/// closes the socket on every path. The buffers are borrowed from the
/// server's pool for exactly that long.
pub struct Connection<'c, 's, S> {
    stream: S,
    request: &'c mut [u8],
    response: &'c mut [u8],
    router: &'c Router<'s>,
    state: ConnectionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Receiving,
    Routing {
        received: usize,
    },
    Sending {
        route: Route,
        len: usize,
        written: usize,
        retries: u32,
    },
    Closed(ConnectionOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    Served { route: Route, bytes: usize },
    Dropped(CloseReason),
}

/// Why a connection was closed without a complete response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer closed before sending anything.
    PeerClosed,
    /// Nothing arrived within the receive timeout.
    ReceiveTimedOut,
    ReceiveFailed(ErrorKind),
    /// Request line did not parse; nothing is sent.
    Malformed(ParseError),
    BuildFailed(BuildError),
    SendFailed(ErrorKind),
}

impl<'c, 's, S: Read + Write> Connection<'c, 's, S> {
    pub fn new(
        stream: S,
        (request, response): (&'c mut [u8], &'c mut [u8]),
        router: &'c Router<'s>,
    ) -> Self {
        Self {
            stream,
            request,
            response,
            router,
            state: ConnectionState::Receiving,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn run(mut self) -> ConnectionOutcome {
        loop {
            self.state = match self.state {
                ConnectionState::Receiving => self.receive(),
                ConnectionState::Routing { received } => self.route(received),
                ConnectionState::Sending {
                    route,
                    len,
                    written,
                    retries,
                } => self.send(route, len, written, retries),
                ConnectionState::Closed(outcome) => return outcome,
            };
        }
    }

    fn receive(&mut self) -> ConnectionState {
        match self.stream.read(self.request) {
            Ok(0) => closed(CloseReason::PeerClosed),
            Ok(received) => {
                trace!(received, "request bytes received");
                ConnectionState::Routing { received }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => ConnectionState::Receiving,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                closed(CloseReason::ReceiveTimedOut)
            }
            Err(e) => closed(CloseReason::ReceiveFailed(e.kind())),
        }
    }

    fn route(&mut self, received: usize) -> ConnectionState {
        let view = match parse_request_line(&mut self.request[..received]) {
            Ok(view) => view,
            Err(e) => {
                debug!(error = %e, received, "malformed request line, closing");
                return closed(CloseReason::Malformed(e));
            }
        };

        match self.router.dispatch(&view, self.response) {
            Ok(dispatched) => {
                debug!(request = %view, route = ?dispatched.route, "routed");
                ConnectionState::Sending {
                    route: dispatched.route,
                    len: dispatched.len,
                    written: 0,
                    retries: 0,
                }
            }
            Err(e) => closed(CloseReason::BuildFailed(e)),
        }
    }

    fn send(&mut self, route: Route, len: usize, written: usize, retries: u32) -> ConnectionState {
        if written >= len {
            return ConnectionState::Closed(ConnectionOutcome::Served { route, bytes: len });
        }

        match self.stream.write(&self.response[written..len]) {
            Ok(0) => closed(CloseReason::SendFailed(ErrorKind::WriteZero)),
            Ok(n) => ConnectionState::Sending {
                route,
                len,
                written: written + n,
                retries: 0,
            },
            Err(e) if e.kind() == ErrorKind::Interrupted => ConnectionState::Sending {
                route,
                len,
                written,
                retries,
            },
            Err(e) if e.kind() == ErrorKind::WouldBlock && retries < SEND_RETRY_LIMIT => {
                ConnectionState::Sending {
                    route,
                    len,
                    written,
                    retries: retries + 1,
                }
            }
            Err(e) => closed(CloseReason::SendFailed(e.kind())),
        }
    }
}

fn closed(reason: CloseReason) -> ConnectionState {
    ConnectionState::Closed(ConnectionOutcome::Dropped(reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorState;
    use std::io;

    /// Scripted stream: serves `input` once, then replays `write_results`.
    struct MockStream {
        input: Vec<u8>,
        read_error: Option<ErrorKind>,
        write_results: Vec<io::Result<usize>>,
        sent: Vec<u8>,
    }

    impl MockStream {
        fn new(input: &[u8]) -> Self {
            Self {
                input: input.to_vec(),
                read_error: None,
                write_results: Vec::new(),
                sent: Vec::new(),
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if let Some(kind) = self.read_error.take() {
                return Err(kind.into());
            }
            let n = self.input.len().min(buf.len());
            buf[..n].copy_from_slice(&self.input[..n]);
            self.input.drain(..n);
            Ok(n)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.write_results.is_empty() {
                self.sent.extend_from_slice(buf);
                return Ok(buf.len());
            }
            match self.write_results.remove(0) {
                Ok(n) => {
                    let n = n.min(buf.len());
                    self.sent.extend_from_slice(&buf[..n]);
                    Ok(n)
                }
                Err(e) => Err(e),
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run(stream: &mut MockStream) -> ConnectionOutcome {
        let sensors = SensorState::new();
        let router = Router::new(&sensors);
        let mut request = [0u8; 128];
        let mut response = [0u8; 1400];
        Connection::new(stream, (&mut request[..], &mut response[..]), &router).run()
    }

    #[test]
    fn partial_writes_are_resumed() {
        let mut stream = MockStream::new(b"GET /nope HTTP/1.1\r\n\r\n");
        stream.write_results = vec![
            Ok(5),
            Err(ErrorKind::Interrupted.into()),
            Err(ErrorKind::WouldBlock.into()),
            Ok(7),
        ];

        let outcome = run(&mut stream);

        let expected: &[u8] =
            b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 9\r\nConnection: close\r\n\r\nNot Found";
        assert_eq!(
            outcome,
            ConnectionOutcome::Served {
                route: Route::NotFound,
                bytes: expected.len()
            }
        );
        assert_eq!(stream.sent, expected);
    }

    #[test]
    fn stalled_peer_gives_up_after_retry_limit() {
        let mut stream = MockStream::new(b"GET / HTTP/1.1\r\n\r\n");
        stream.write_results = (0..=SEND_RETRY_LIMIT)
            .map(|_| Err(ErrorKind::WouldBlock.into()))
            .collect();

        let outcome = run(&mut stream);

        assert_eq!(
            outcome,
            ConnectionOutcome::Dropped(CloseReason::SendFailed(ErrorKind::WouldBlock))
        );
        assert!(stream.sent.is_empty());
    }

    #[test]
    fn hard_send_error_closes() {
        let mut stream = MockStream::new(b"GET / HTTP/1.1\r\n\r\n");
        stream.write_results = vec![Ok(10), Err(ErrorKind::BrokenPipe.into())];

        let outcome = run(&mut stream);

        assert_eq!(
            outcome,
            ConnectionOutcome::Dropped(CloseReason::SendFailed(ErrorKind::BrokenPipe))
        );
        assert_eq!(stream.sent.len(), 10);
    }

    #[test]
    fn zero_length_write_closes() {
        let mut stream = MockStream::new(b"GET / HTTP/1.1\r\n\r\n");
        stream.write_results = vec![Ok(0)];

        assert_eq!(
            run(&mut stream),
            ConnectionOutcome::Dropped(CloseReason::SendFailed(ErrorKind::WriteZero))
        );
    }

    #[test]
    fn receive_timeout_sends_nothing() {
        let mut stream = MockStream::new(b"");
        stream.read_error = Some(ErrorKind::WouldBlock);

        assert_eq!(
            run(&mut stream),
            ConnectionOutcome::Dropped(CloseReason::ReceiveTimedOut)
        );
        assert!(stream.sent.is_empty());
    }

    #[test]
    fn interrupted_receive_is_retried() {
        let mut stream = MockStream::new(b"GET /data HTTP/1.1\r\n\r\n");
        stream.read_error = Some(ErrorKind::Interrupted);

        assert!(matches!(
            run(&mut stream),
            ConnectionOutcome::Served {
                route: Route::SensorData,
                ..
            }
        ));
    }

    #[test]
    fn empty_receive_is_peer_closed() {
        let mut stream = MockStream::new(b"");
        assert_eq!(
            run(&mut stream),
            ConnectionOutcome::Dropped(CloseReason::PeerClosed)
        );
    }

    #[test]
    fn malformed_line_sends_nothing() {
        let mut stream = MockStream::new(b"GET");

        assert_eq!(
            run(&mut stream),
            ConnectionOutcome::Dropped(CloseReason::Malformed(ParseError::UnterminatedMethod))
        );
        assert!(stream.sent.is_empty());
    }
}
