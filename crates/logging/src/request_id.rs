//! # Request ID Tracking
//!
//! Request identifiers propagated through the `x-request-id` header and attached
//! to the request span. Generated ids are CUID2 strings.

use std::{fmt, str::FromStr};

/// Name of the header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A request ID type using CUID2.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random request ID.
    #[inline]
    pub fn new() -> Self { Self(cuid2::create_id()) }

    /// Get the request ID as a string.
    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }

    /// Consume and return the inner string.
    #[inline]
    pub fn into_string(self) -> String { self.0 }

    /// Accept a caller supplied id from a header value.
    ///
    /// Only short url-safe values are trusted; anything else yields `None` so a
    /// fresh id is generated instead.
    pub fn from_header(value: &str) -> Option<Self> { value.trim().parse().ok() }
}

impl Default for RequestId {
    #[inline]
    fn default() -> Self { Self::new() }
}

impl FromStr for RequestId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid_len = (8 ..= 64).contains(&s.len());
        let valid_chars = s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid_len && valid_chars {
            Ok(Self(s.to_string()))
        }
        else {
            Err("Invalid request ID format".to_string())
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_is_cuid() {
        let id = RequestId::new();
        assert!(id.as_str().len() >= 20);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_request_id_from_header() {
        let id = RequestId::from_header("  k192v2g4w3zq8h6j5k1  ").unwrap();
        assert_eq!(id.as_str(), "k192v2g4w3zq8h6j5k1");
    }

    #[test]
    fn test_request_id_from_header_rejects_garbage() {
        assert!(RequestId::from_header("short").is_none());
        assert!(RequestId::from_header("invalid!@#value").is_none());
        assert!(RequestId::from_header(&"a".repeat(65)).is_none());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        assert_eq!(format!("{}", id), id.as_str());
        assert_eq!(id.clone().into_string(), id.to_string());
    }
}
