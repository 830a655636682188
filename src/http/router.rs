//! Fixed two-path routing table.

use crate::http::request::RequestView;
use crate::http::response::{JSON_BODY_CAPACITY, Response, render_sensor_json};
use crate::http::writer::{BuildError, serialize_response};
use crate::sensor::SensorState;

/// The three responses the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET /`
    Dashboard,
    /// `GET /data`
    SensorData,
    NotFound,
}

impl Route {
    /// Maps a request line to a route. Comparison is byte-exact: `get`,
    /// `GET /data/` and `GET /data?x=1` all fall through to `NotFound`.
    pub fn resolve(method: &[u8], path: &[u8]) -> Route {
        if method != b"GET" {
            return Route::NotFound;
        }

        match path {
            b"/" => Route::Dashboard,
            b"/data" => Route::SensorData,
            _ => Route::NotFound,
        }
    }
}

/// What a dispatch put into the response buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    pub route: Route,
    pub len: usize,
}

pub struct Router<'s> {
    sensors: &'s SensorState,
}

impl<'s> Router<'s> {
    pub fn new(sensors: &'s SensorState) -> Self {
        Self { sensors }
    }

    /// Resolves `view` and writes the full response into `out`.
    ///
    /// The sensor snapshot for `/data` is taken here, once per request.
    pub fn dispatch(&self, view: &RequestView<'_>, out: &mut [u8]) -> Result<Dispatched, BuildError> {
        let route = Route::resolve(view.method(), view.path());

        let len = match route {
            Route::Dashboard => serialize_response(&Response::dashboard(), out)?,
            Route::SensorData => {
                let snapshot = self.sensors.snapshot();
                let mut scratch = [0u8; JSON_BODY_CAPACITY];
                let body_len = render_sensor_json(&snapshot, &mut scratch)?;
                serialize_response(&Response::json(&scratch[..body_len]), out)?
            }
            Route::NotFound => serialize_response(&Response::not_found(), out)?,
        };

        Ok(Dispatched { route, len })
    }
}
