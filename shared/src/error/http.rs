//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::CardNotFound | Self::StampNotFound | Self::StageNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::AlreadyExists
            | Self::CardAlreadyOwned
            | Self::CardAlreadyUsed
            | Self::StampAlreadyActivated
            | Self::StageAlreadyRedeemed => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::AdminRequired | Self::CardNotOwned => StatusCode::FORBIDDEN,

            // 422 Unprocessable Entity (business rule violations)
            Self::CardExpired
            | Self::CardNotApplicable
            | Self::InsufficientStamps
            | Self::StageNotEligible
            | Self::WalletInsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,

            // 400 Bad Request
            Self::ValidationFailed | Self::InvalidRequest | Self::InvalidParameters => {
                StatusCode::BAD_REQUEST
            }

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::CardNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::CardAlreadyOwned.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::CardNotOwned.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorCode::StageNotEligible.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::InvalidParameters.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
