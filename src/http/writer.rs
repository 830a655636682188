use crate::http::response::{
    CONNECTION_CLOSE, CONTENT_LENGTH_PREFIX, CONTENT_TYPE_PREFIX, Response,
};

/// Longest decimal rendering of a `u64`.
pub const UINT_MAX_LEN: usize = 20;

/// Magnitudes above this are clamped before fixed-point rendering. Keeps the
/// scaled intermediate exact in `f32` and the text short.
pub const FIXED2_LIMIT: f32 = 1_000_000.0;

/// Sign, seven integer digits, point and two decimals: `-1000000.00`.
pub const FIXED2_MAX_LEN: usize = 1 + 7 + 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("response needs {needed} bytes but the buffer holds {capacity}")]
    Overflow { needed: usize, capacity: usize },
}

/// Bounds-checked append cursor over a fixed byte buffer.
///
/// A failed write leaves the cursor where it was. Callers treat any error as
/// "send nothing", so partially written bytes are never observed.
pub struct ResponseWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub fn put(&mut self, bytes: &[u8]) -> Result<(), BuildError> {
        let capacity = self.buf.len();
        let end = self
            .len
            .checked_add(bytes.len())
            .filter(|&end| end <= capacity)
            .ok_or(BuildError::Overflow {
                needed: self.len.saturating_add(bytes.len()),
                capacity,
            })?;

        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }

    pub fn put_uint(&mut self, value: u64) -> Result<(), BuildError> {
        let mut digits = [0u8; UINT_MAX_LEN];
        self.put(encode_uint(value, &mut digits))
    }

    pub fn put_fixed2(&mut self, value: f32) -> Result<(), BuildError> {
        let mut text = [0u8; FIXED2_MAX_LEN];
        self.put(encode_fixed2(value, &mut text))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn written(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Writes status line, headers and body of `resp` into `out`.
///
/// Returns the number of bytes written. `Content-Length` is taken from the
/// body slice, so it always matches what follows the blank line.
pub fn serialize_response(resp: &Response<'_>, out: &mut [u8]) -> Result<usize, BuildError> {
    let mut w = ResponseWriter::new(out);

    // Status line
    w.put(resp.status.status_line())?;

    // Headers
    w.put(CONTENT_TYPE_PREFIX)?;
    w.put(resp.content_type.as_str().as_bytes())?;
    w.put(CONTENT_LENGTH_PREFIX)?;
    w.put_uint(resp.body.len() as u64)?;
    w.put(CONNECTION_CLOSE)?;

    // Body
    w.put(resp.body)?;

    Ok(w.len())
}

/// Decimal digits of `value`, produced least significant first by repeated
/// remainder and stored from the back of `out`.
pub fn encode_uint(mut value: u64, out: &mut [u8; UINT_MAX_LEN]) -> &[u8] {
    let mut pos = out.len();
    loop {
        pos -= 1;
        out[pos] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    &out[pos..]
}

/// Renders `value` with exactly two decimals.
///
/// Rounds half up on the magnitude scaled by 100, in `f32` arithmetic, so
/// `9.995` becomes `10.00`. NaN renders as `0.00`, magnitudes above
/// [`FIXED2_LIMIT`] (infinities included) clamp to it, and a value that
/// rounds to zero carries no minus sign. The output is always a valid JSON
/// number.
pub fn encode_fixed2(value: f32, out: &mut [u8; FIXED2_MAX_LEN]) -> &[u8] {
    let (negative, magnitude) = if value.is_nan() {
        (false, 0.0)
    } else {
        (value.is_sign_negative(), value.abs().min(FIXED2_LIMIT))
    };

    let scaled = (magnitude * 100.0 + 0.5) as u64;
    let (whole, frac) = (scaled / 100, scaled % 100);

    let mut len = 0;
    if negative && scaled != 0 {
        out[len] = b'-';
        len += 1;
    }

    let mut digits = [0u8; UINT_MAX_LEN];
    let whole = encode_uint(whole, &mut digits);
    out[len..len + whole.len()].copy_from_slice(whole);
    len += whole.len();

    out[len] = b'.';
    out[len + 1] = b'0' + (frac / 10) as u8;
    out[len + 2] = b'0' + (frac % 10) as u8;
    len += 3;

    &out[..len]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed2(v: f32) -> String {
        let mut buf = [0u8; FIXED2_MAX_LEN];
        String::from_utf8(encode_fixed2(v, &mut buf).to_vec()).unwrap()
    }

    #[test]
    fn uint_zero_has_one_digit() {
        let mut buf = [0u8; UINT_MAX_LEN];
        assert_eq!(encode_uint(0, &mut buf), b"0");
    }

    #[test]
    fn uint_max_fills_buffer() {
        let mut buf = [0u8; UINT_MAX_LEN];
        assert_eq!(encode_uint(u64::MAX, &mut buf), b"18446744073709551615");
    }

    #[test]
    fn fixed2_clamps_extremes() {
        assert_eq!(fixed2(f32::MAX), "1000000.00");
        assert_eq!(fixed2(f32::NEG_INFINITY), "-1000000.00");
        assert_eq!(fixed2(-999_999.99).len(), FIXED2_MAX_LEN);
    }

    #[test]
    fn failed_put_leaves_cursor() {
        let mut buf = [0u8; 4];
        let mut w = ResponseWriter::new(&mut buf);
        w.put(b"ab").unwrap();
        assert_eq!(
            w.put(b"cde"),
            Err(BuildError::Overflow { needed: 5, capacity: 4 })
        );
        assert_eq!(w.written(), b"ab");
    }
}
