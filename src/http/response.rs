use crate::http::writer::{BuildError, ResponseWriter, FIXED2_MAX_LEN};
use crate::sensor::SensorSnapshot;

pub const HTTP_VERSION: &str = "HTTP/1.1";

/// The dashboard served at `/`.
pub const DASHBOARD_HTML: &str = include_str!("../../assets/dashboard.html");

pub const NOT_FOUND_BODY: &[u8] = b"Not Found";

pub(crate) const CONTENT_TYPE_PREFIX: &[u8] = b"Content-Type: ";
pub(crate) const CONTENT_LENGTH_PREFIX: &[u8] = b"\r\nContent-Length: ";
pub(crate) const CONNECTION_CLOSE: &[u8] = b"\r\nConnection: close\r\n\r\n";

// `{"temperature":<t>,"water":<w>}`
const JSON_TEMPERATURE_FIELD: &[u8] = b"{\"temperature\":";
const JSON_WATER_FIELD: &[u8] = b",\"water\":";
const JSON_END: &[u8] = b"}";

/// Scratch space for the `/data` body.
pub const JSON_BODY_CAPACITY: usize = 64;

const JSON_BODY_MAX_LEN: usize = JSON_TEMPERATURE_FIELD.len()
    + FIXED2_MAX_LEN
    + JSON_WATER_FIELD.len()
    + FIXED2_MAX_LEN
    + JSON_END.len();

const _: () = assert!(JSON_BODY_MAX_LEN <= JSON_BODY_CAPACITY);

/// Exact size of the `GET /` response. The response buffer must hold at
/// least this much.
pub const DASHBOARD_RESPONSE_LEN: usize =
    response_len(StatusCode::Ok, ContentType::Html, DASHBOARD_HTML.len());

/// HTTP status codes the server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use picodash::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
        }
    }

    /// Full status line including the trailing CRLF.
    pub const fn status_line(&self) -> &'static [u8] {
        match self {
            StatusCode::Ok => b"HTTP/1.1 200 OK\r\n",
            StatusCode::NotFound => b"HTTP/1.1 404 Not Found\r\n",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Json,
    PlainText,
}

impl ContentType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContentType::Html => "text/html; charset=utf-8",
            ContentType::Json => "application/json",
            ContentType::PlainText => "text/plain",
        }
    }
}

/// A response ready to be serialized. The body is borrowed: either a static
/// template or a scratch buffer on the caller's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<'b> {
    pub status: StatusCode,
    pub content_type: ContentType,
    pub body: &'b [u8],
}

impl<'b> Response<'b> {
    pub fn ok(content_type: ContentType, body: &'b [u8]) -> Self {
        Self {
            status: StatusCode::Ok,
            content_type,
            body,
        }
    }

    pub fn json(body: &'b [u8]) -> Self {
        Self::ok(ContentType::Json, body)
    }
}

impl Response<'static> {
    pub fn dashboard() -> Self {
        Self::ok(ContentType::Html, DASHBOARD_HTML.as_bytes())
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NotFound,
            content_type: ContentType::PlainText,
            body: NOT_FOUND_BODY,
        }
    }
}

/// Renders `{"temperature":<t>,"water":<w>}` into `scratch` and returns the
/// body length.
pub fn render_sensor_json(
    snapshot: &SensorSnapshot,
    scratch: &mut [u8],
) -> Result<usize, BuildError> {
    let mut w = ResponseWriter::new(scratch);
    w.put(JSON_TEMPERATURE_FIELD)?;
    w.put_fixed2(snapshot.temperature)?;
    w.put(JSON_WATER_FIELD)?;
    w.put_fixed2(snapshot.water)?;
    w.put(JSON_END)?;
    Ok(w.len())
}

/// Serialized length of a response with the given status, type and body
/// length.
pub const fn response_len(status: StatusCode, content_type: ContentType, body_len: usize) -> usize {
    status.status_line().len()
        + CONTENT_TYPE_PREFIX.len()
        + content_type.as_str().len()
        + CONTENT_LENGTH_PREFIX.len()
        + decimal_digits(body_len)
        + CONNECTION_CLOSE.len()
        + body_len
}

const fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
