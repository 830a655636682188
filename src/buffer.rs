//! Request and response scratch space shared by every connection.

use crate::config::{DEFAULT_REQUEST_CAPACITY, DEFAULT_RESPONSE_CAPACITY};
use crate::http::response::DASHBOARD_RESPONSE_LEN;

/// Two fixed buffers, stored inline and reused for each connection.
///
/// Handing both out requires `&mut self`, so at most one connection can be
/// using them at any time.
pub struct BufferPool<
    const REQ: usize = DEFAULT_REQUEST_CAPACITY,
    const RESP: usize = DEFAULT_RESPONSE_CAPACITY,
> {
    request: [u8; REQ],
    response: [u8; RESP],
}

impl<const REQ: usize, const RESP: usize> BufferPool<REQ, RESP> {
    const CAPACITY_CHECK: () = {
        assert!(REQ > 0, "request buffer must not be empty");
        assert!(
            RESP >= DASHBOARD_RESPONSE_LEN,
            "response buffer cannot hold the dashboard response"
        );
    };

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;
        Self {
            request: [0; REQ],
            response: [0; RESP],
        }
    }

    /// `(request, response)`
    pub fn split(&mut self) -> (&mut [u8], &mut [u8]) {
        (&mut self.request[..], &mut self.response[..])
    }

    pub const fn request_capacity(&self) -> usize {
        REQ
    }

    pub const fn response_capacity(&self) -> usize {
        RESP
    }
}

impl<const REQ: usize, const RESP: usize> Default for BufferPool<REQ, RESP> {
    fn default() -> Self {
        Self::new()
    }
}
