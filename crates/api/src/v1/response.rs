//! Parsed control-plane response envelope.

use bytes::Bytes;

/// Result of a control-plane call: status, raw body and the parsed body for
/// the documented success codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    /// HTTP status code.
    pub status_code: u16,
    /// Raw response body.
    pub body: Bytes,
    /// Parsed body when the status was 200.
    pub json200: Option<T>,
    /// Parsed body when the status was 201.
    pub json201: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Response carrying a parsed 200 body.
    pub fn ok(value: T) -> Self {
        Self {
            status_code: 200,
            body: Bytes::new(),
            json200: Some(value),
            json201: None,
        }
    }

    /// Response carrying a parsed 201 body.
    pub fn created(value: T) -> Self {
        Self {
            status_code: 201,
            body: Bytes::new(),
            json200: None,
            json201: Some(value),
        }
    }

    /// Response without a parsed body (errors, empty successes).
    pub fn status(status_code: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status_code,
            body: body.into(),
            json200: None,
            json201: None,
        }
    }

    /// Returns true for 2xx statuses.
    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }

    /// Borrow whichever parsed body is present.
    pub const fn parsed(&self) -> Option<&T> {
        match (&self.json200, &self.json201) {
            (Some(value), _) | (None, Some(value)) => Some(value),
            (None, None) => None,
        }
    }

    /// Take whichever parsed body is present.
    pub fn into_parsed(self) -> Option<T> {
        self.json200.or(self.json201)
    }
}
