use std::fmt;

/// The request line of the current connection, borrowed from the request
/// buffer.
///
/// Holding a view keeps the buffer borrowed, so the next receive into that
/// buffer cannot happen while the view is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestView<'a> {
    method: &'a [u8],
    path: &'a [u8],
}

impl<'a> RequestView<'a> {
    pub(crate) fn new(method: &'a [u8], path: &'a [u8]) -> Self {
        Self { method, path }
    }

    /// The method token exactly as received (e.g. `b"GET"`).
    pub fn method(&self) -> &'a [u8] {
        self.method
    }

    /// The request target exactly as received, query string included.
    pub fn path(&self) -> &'a [u8] {
        self.path
    }
}

/// `METHOD path`, with non-printable and non-ASCII bytes escaped.
impl fmt::Display for RequestView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method.escape_ascii(), self.path.escape_ascii())
    }
}
