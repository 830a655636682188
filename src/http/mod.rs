//! HTTP/1.1 subset: one request line in, one `Connection: close` response out.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection state machine, receive to close
//! - **`parser`**: zero-copy request-line parser
//! - **`request`**: [`RequestView`](request::RequestView), the borrowed method and path
//! - **`router`**: fixed `GET /` / `GET /data` / 404 dispatch
//! - **`response`**: status codes, content types and the constant templates
//! - **`writer`**: bounded serializer and the integer/fixed-point encoders
//!
//! # Connection State Machine
//!
//! Every accepted connection runs this to completion before the next one is
//! accepted:
//!
//! ```text
//!        ┌─────────────┐
//!        │  Receiving  │ ← one read, bounded by the receive timeout
//!        └──────┬──────┘
//!               │ bytes received         (0 bytes / timeout / error → Closed)
//!               ▼
//!        ┌─────────────┐
//!        │   Routing   │ ← parse request line, build response
//!        └──────┬──────┘
//!               │ response built         (malformed → Closed, nothing sent)
//!               ▼
//!        ┌─────────────┐
//!        │   Sending   │ ← write-all, retrying would-block / interrupted
//!        └──────┬──────┘
//!               │
//!               ▼
//!        ┌─────────────┐
//!        │   Closed    │ ← stream dropped on every path
//!        └─────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use picodash::config::ServerConfig;
//! use picodash::sensor::SensorState;
//! use picodash::server::Server;
//!
//! static SENSORS: SensorState = SensorState::new();
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut server: Server<'_> = Server::new(ServerConfig::default(), &SENSORS);
//!     server.init()?;
//!
//!     loop {
//!         SENSORS.set_temperature(21.5);
//!         server.poll();
//!         std::thread::sleep(std::time::Duration::from_millis(50));
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod router;
pub mod writer;
