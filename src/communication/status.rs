//! HTTP status codes the client distinguishes.

/// Response status of a communication.
///
/// Server statuses are mapped onto the codes the client knows. Two codes are
/// synthesized locally: `CustomTimeout` (608) for transport failures and
/// `CustomDefaultError` (-1) for anything unrecognized or undecodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HtmlCode {
    /// Unknown status, decode failure or request never issued.
    CustomDefaultError,
    /// Client-side timeout or other transport failure.
    CustomTimeout,
    /// 200.
    Ok,
    /// 400.
    BadRequest,
    /// 401.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 408.
    Timeout,
}

impl HtmlCode {
    /// Numeric code.
    pub fn code(self) -> i32 {
        match self {
            Self::CustomDefaultError => -1,
            Self::CustomTimeout => 608,
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Timeout => 408,
        }
    }

    /// Maps a numeric code; anything unknown becomes `CustomDefaultError`.
    pub fn from_code(code: i32) -> Self {
        match code {
            608 => Self::CustomTimeout,
            200 => Self::Ok,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 => Self::Timeout,
            _ => Self::CustomDefaultError,
        }
    }

    /// True only for 200.
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// 401 or 403: the caller may want to renew the session and retry.
    pub fn is_auth_error(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

impl From<reqwest::StatusCode> for HtmlCode {
    fn from(status: reqwest::StatusCode) -> Self {
        Self::from_code(i32::from(status.as_u16()))
    }
}

impl std::fmt::Display for HtmlCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.code(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for code in [-1, 608, 200, 400, 401, 403, 404, 408] {
            assert_eq!(HtmlCode::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_unknown_codes_map_to_default_error() {
        assert_eq!(HtmlCode::from_code(500), HtmlCode::CustomDefaultError);
        assert_eq!(HtmlCode::from_code(201), HtmlCode::CustomDefaultError);
        assert_eq!(HtmlCode::from_code(0), HtmlCode::CustomDefaultError);
    }

    #[test]
    fn test_from_reqwest_status() {
        assert_eq!(HtmlCode::from(reqwest::StatusCode::OK), HtmlCode::Ok);
        assert_eq!(
            HtmlCode::from(reqwest::StatusCode::UNAUTHORIZED),
            HtmlCode::Unauthorized
        );
        assert_eq!(
            HtmlCode::from(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            HtmlCode::CustomDefaultError
        );
    }

    #[test]
    fn test_auth_error_classification() {
        assert!(HtmlCode::Unauthorized.is_auth_error());
        assert!(HtmlCode::Forbidden.is_auth_error());
        assert!(!HtmlCode::NotFound.is_auth_error());
        assert!(HtmlCode::Ok.is_ok());
    }
}
