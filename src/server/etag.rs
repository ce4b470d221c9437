//! Conditional request handling for resize responses.
//!
//! The ETag is not a content hash. It has two parts joined by `X`:
//!
//! 1. a 64-bit FNV-1 hash of the raw query string, in decimal
//! 2. the unix timestamp of the response that carried it
//!
//! A client replaying an ETag for the same query within the caching window
//! gets `304 Not Modified`. A source image that changed within the window is
//! not detected; the window is a staleness bound.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Separator between the hash and timestamp parts.
pub const ETAG_SEPARATOR: char = 'X';

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1 hash (multiply, then xor).
pub fn fnv1_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        hash.wrapping_mul(FNV_PRIME) ^ u64::from(byte)
    })
}

/// Current unix time in seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// =============================================================================
// ETag
// =============================================================================

/// Validator issued with every full resize response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ETag {
    /// Hash of the raw query string
    pub url_hash: u64,

    /// Unix timestamp of the response
    pub issued_at: i64,
}

impl ETag {
    pub fn new(raw_query: &str, issued_at: i64) -> Self {
        Self {
            url_hash: fnv1_64(raw_query.as_bytes()),
            issued_at,
        }
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.url_hash, ETAG_SEPARATOR, self.issued_at)
    }
}

// =============================================================================
// Negotiation
// =============================================================================

/// Outcome of checking a request against the client's cached copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    /// The client's copy is still fresh; answer 304 with no body
    NotModified,

    /// Serve a full response tagged with this ETag
    Fresh(ETag),
}

/// Decides between `304 Not Modified` and a freshly tagged response.
#[derive(Debug, Clone, Copy)]
pub struct ClientCacheNegotiator {
    caching_duration: Duration,
}

impl ClientCacheNegotiator {
    pub fn new(caching_duration: Duration) -> Self {
        Self { caching_duration }
    }

    pub fn caching_duration(&self) -> Duration {
        self.caching_duration
    }

    /// Negotiate using the current time.
    pub fn negotiate_now(&self, raw_query: &str, if_none_match: Option<&str>) -> Negotiation {
        self.negotiate(raw_query, if_none_match, unix_now())
    }

    /// Negotiate at the given unix time.
    ///
    /// The client value must split on the first `X` into exactly two parts,
    /// the first equal to this query's hash. An unparseable timestamp reads
    /// as zero and is therefore stale.
    pub fn negotiate(&self, raw_query: &str, if_none_match: Option<&str>, now: i64) -> Negotiation {
        let etag = ETag::new(raw_query, now);

        if let Some(client_value) = if_none_match.filter(|v| !v.is_empty()) {
            let mut parts = client_value.splitn(2, ETAG_SEPARATOR);
            if let (Some(hash), Some(timestamp)) = (parts.next(), parts.next()) {
                if hash == etag.url_hash.to_string() {
                    let issued_at = timestamp.parse::<i64>().unwrap_or(0);
                    if self.is_fresh(issued_at, now) {
                        return Negotiation::NotModified;
                    }
                }
            }
        }

        Negotiation::Fresh(etag)
    }

    fn is_fresh(&self, issued_at: i64, now: i64) -> bool {
        let window = i64::try_from(self.caching_duration.as_secs()).unwrap_or(i64::MAX);
        now.saturating_sub(issued_at) < window
    }
}

// =============================================================================
// Tests
// =============================================================================
