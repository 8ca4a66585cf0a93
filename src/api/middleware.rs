//! Request correlation middleware.
//!
//! Every inbound request gets a random integer id in `[0, 1_000_000_000)`. The id
//! is stored in the request extensions as a typed [`RequestId`], so handlers read
//! it back without casts, and it lives exactly as long as the request does. The
//! middleware logs the request line before delegating and the elapsed time after.
//!
//! Ids come from a single generator seeded from the wall clock when the router
//! is built. Sequences are therefore reproducible for a given seed and call
//! order; they are tags for grouping log lines, not secrets.

use crate::errors::{Error, Result};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Extensions, request::Parts},
    middleware::Next,
    response::Response,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use tracing::{Instrument, info, info_span};

/// Exclusive upper bound for correlation ids.
pub const REQUEST_ID_BOUND: u32 = 1_000_000_000;

/// Correlation id attached to a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u32);

impl RequestId {
    /// The raw id value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Reads the id the middleware attached, if any.
    #[must_use]
    pub fn from_extensions(extensions: &Extensions) -> Option<Self> {
        extensions.get::<Self>().copied()
    }
}

// Forwards the formatter so width flags like `{:>10}` apply to the number.
impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        Self::from_extensions(&parts.extensions).ok_or_else(|| Error::Internal {
            operation: "read the request correlation id".to_string(),
        })
    }
}

/// Source of correlation ids, shared by all requests.
#[derive(Debug)]
pub struct RequestIdGenerator {
    rng: Mutex<StdRng>,
}

impl RequestIdGenerator {
    /// Generator seeded from the current time.
    #[must_use]
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        Self::with_seed(seed)
    }

    /// Generator with a fixed seed; the same seed yields the same id sequence.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draws the next id.
    pub fn next_id(&self) -> RequestId {
        // The rng state is valid even if another request panicked mid-draw.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        RequestId(rng.gen_range(0..REQUEST_ID_BOUND))
    }
}

/// Tags the request with a fresh [`RequestId`] and logs around the inner handler.
///
/// Everything downstream runs inside a `request` span carrying the id.
pub async fn correlate(
    State(request_ids): State<Arc<RequestIdGenerator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = request_ids.next_id();
    request.extensions_mut().insert(request_id);

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let span = info_span!("request", request_id = request_id.get());

    let start = Instant::now();
    span.in_scope(|| info!("[{request_id:>10}] {method} {}", request.uri()));

    let response = next.run(request).instrument(span.clone()).await;

    span.in_scope(|| info!("[{request_id:>10}] {method} {path} {:?}", start.elapsed()));
    response
}
