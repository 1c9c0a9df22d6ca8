//! Classification of HTTP status codes returned by the asset API.
//!
//! The API documents a closed set of error statuses. Anything outside that set
//! (2xx as well as undocumented codes) is [`StatusClass::Unclassified`] and is
//! handed to the caller for normal decoding.

use std::fmt;

/// Every status code the classifier treats as an error, in ascending order.
pub const ERROR_CODES: [u16; 10] = [400, 401, 403, 404, 405, 406, 409, 415, 429, 500];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    ClientValidation,
    AuthenticationFailure,
    AccessDenied,
    ResourceNotFound,
    MethodNotAllowed,
    UnsupportedAcceptHeader,
    InconsistentState,
    UnsupportedContentType,
    RateLimitExceeded,
    UnexpectedServerError,
    /// Not a documented error status; the response body is decoded as success.
    Unclassified(u16),
}

impl StatusClass {
    pub fn from_code(code: u16) -> Self {
        match code {
            400 => Self::ClientValidation,
            401 => Self::AuthenticationFailure,
            403 => Self::AccessDenied,
            404 => Self::ResourceNotFound,
            405 => Self::MethodNotAllowed,
            406 => Self::UnsupportedAcceptHeader,
            409 => Self::InconsistentState,
            415 => Self::UnsupportedContentType,
            429 => Self::RateLimitExceeded,
            500 => Self::UnexpectedServerError,
            other => Self::Unclassified(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::ClientValidation => 400,
            Self::AuthenticationFailure => 401,
            Self::AccessDenied => 403,
            Self::ResourceNotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::UnsupportedAcceptHeader => 406,
            Self::InconsistentState => 409,
            Self::UnsupportedContentType => 415,
            Self::RateLimitExceeded => 429,
            Self::UnexpectedServerError => 500,
            Self::Unclassified(code) => code,
        }
    }

    /// Fixed human-readable label for the status.
    pub fn label(self) -> &'static str {
        match self {
            Self::ClientValidation => "Client or Validation Error",
            Self::AuthenticationFailure => "Authentication Failure",
            Self::AccessDenied => "Access Denied",
            Self::ResourceNotFound => "Requested Resource not Found",
            Self::MethodNotAllowed => "Method not allowed",
            Self::UnsupportedAcceptHeader => "Unsupported Accept Header",
            Self::InconsistentState => "Inconsistent/Conflicting State",
            Self::UnsupportedContentType => "Unsupported Content-type",
            Self::RateLimitExceeded => "Rate Limit Exceeded",
            Self::UnexpectedServerError => "Unexpected Server Error",
            Self::Unclassified(_) => "Unclassified",
        }
    }

    pub fn is_error(self) -> bool {
        !matches!(self, Self::Unclassified(_))
    }

    /// Whether a caller may reasonably retry the same request later.
    /// The client itself never retries.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::UnexpectedServerError)
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} - {}", self.code(), self.label())
    }
}

/// A request rejected with one of the documented error statuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{class}: {detail}")]
pub struct ApiError {
    pub class: StatusClass,
    /// Request line (`METHOD url`) that produced the status. The response
    /// body is never read for classified statuses.
    pub detail: String,
}

impl ApiError {
    pub fn new(class: StatusClass, detail: impl Into<String>) -> Self {
        Self {
            class,
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> u16 {
        self.class.code()
    }

    pub fn label(&self) -> &'static str {
        self.class.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_code_roundtrips() {
        for code in ERROR_CODES {
            let class = StatusClass::from_code(code);
            assert!(class.is_error(), "{code} must be classified");
            assert_eq!(class.code(), code);
        }
    }

    #[test]
    fn labels_match_table() {
        let expected = [
            (400, "Client or Validation Error"),
            (401, "Authentication Failure"),
            (403, "Access Denied"),
            (404, "Requested Resource not Found"),
            (405, "Method not allowed"),
            (406, "Unsupported Accept Header"),
            (409, "Inconsistent/Conflicting State"),
            (415, "Unsupported Content-type"),
            (429, "Rate Limit Exceeded"),
            (500, "Unexpected Server Error"),
        ];
        for (code, label) in expected {
            assert_eq!(StatusClass::from_code(code).label(), label);
        }
    }

    #[test]
    fn other_codes_pass_through() {
        for code in [200, 201, 204, 302, 402, 410, 422, 502, 503] {
            let class = StatusClass::from_code(code);
            assert_eq!(class, StatusClass::Unclassified(code));
            assert!(!class.is_error());
            assert_eq!(class.code(), code);
        }
    }

    #[test]
    fn only_rate_limit_and_server_error_are_retryable() {
        let retryable: Vec<u16> = ERROR_CODES
            .into_iter()
            .filter(|c| StatusClass::from_code(*c).is_retryable())
            .collect();
        assert_eq!(retryable, vec![429, 500]);
    }

    #[test]
    fn api_error_display() {
        let err = ApiError::new(
            StatusClass::ResourceNotFound,
            "GET https://acme.freshservice.com/api/v2/assets/7",
        );
        assert_eq!(
            err.to_string(),
            "HTTP 404 - Requested Resource not Found: GET https://acme.freshservice.com/api/v2/assets/7"
        );
    }
}
