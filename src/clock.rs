use std::convert::Infallible;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use tracing::warn;

/// Header carrying the test-mode time override, in milliseconds since the epoch.
pub const TEST_NOW_HEADER: &str = "x-test-now-ms";

/// Source of the current time for request handling.
///
/// In test mode a request may pin "now" with the [`TEST_NOW_HEADER`] header.
/// Otherwise the wall clock is always used.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    test_mode: bool,
}

impl Clock {
    pub fn new(test_mode: bool) -> Self {
        Clock { test_mode }
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn now(&self, headers: &HeaderMap) -> DateTime<Utc> {
        if self.test_mode {
            if let Some(value) = headers.get(TEST_NOW_HEADER) {
                let parsed = value
                    .to_str()
                    .ok()
                    .and_then(|s| s.trim().parse::<i64>().ok())
                    .and_then(DateTime::<Utc>::from_timestamp_millis);
                match parsed {
                    Some(now) => return now,
                    None => warn!("ignoring unparseable {TEST_NOW_HEADER} header: {value:?}"),
                }
            }
        }
        Utc::now()
    }
}

/// Extractor for the current time as seen by this request.
pub struct Now(pub DateTime<Utc>);

#[async_trait]
impl<S> FromRequestParts<S> for Now
where
    Clock: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Now(Clock::from_ref(state).now(&parts.headers)))
    }
}
