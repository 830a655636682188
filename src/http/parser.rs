//! Zero-copy request-line parser.
//!
//! Only `METHOD SP target` is looked at. Headers, the HTTP version and any
//! body are left untouched, and the scan never goes past the byte that ends
//! the target.

use crate::http::request::RequestView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty request")]
    Empty,
    #[error("method token is not terminated")]
    UnterminatedMethod,
    #[error("request target is not terminated")]
    UnterminatedPath,
    #[error("request line has no method")]
    MissingMethod,
    #[error("request line has no target")]
    MissingPath,
}

/// Splits the request line in `buf` into method and path.
///
/// A token is a run of bytes above ASCII space. The byte that ends each
/// token is overwritten with `0` in place; nothing is copied. Spaces between
/// the tokens are skipped. If either token runs into the end of `buf` the
/// line is incomplete or longer than the buffer, and parsing fails. An empty
/// token (`"GET\r\n"`, `" /"`) is rejected as well.
pub fn parse_request_line(buf: &mut [u8]) -> Result<RequestView<'_>, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::Empty);
    }

    let method_end = token_end(buf, 0).ok_or(ParseError::UnterminatedMethod)?;
    if method_end == 0 {
        return Err(ParseError::MissingMethod);
    }
    buf[method_end] = 0;

    let mut path_start = method_end + 1;
    while path_start < buf.len() && buf[path_start] == b' ' {
        path_start += 1;
    }

    let path_end = token_end(buf, path_start).ok_or(ParseError::UnterminatedPath)?;
    if path_end == path_start {
        return Err(ParseError::MissingPath);
    }
    buf[path_end] = 0;

    let buf: &[u8] = buf;
    Ok(RequestView::new(
        &buf[..method_end],
        &buf[path_start..path_end],
    ))
}

/// Index of the first delimiter at or after `start`, if there is one.
fn token_end(buf: &[u8], start: usize) -> Option<usize> {
    buf.get(start..)?
        .iter()
        .position(|&b| b <= b' ')
        .map(|offset| start + offset)
}
