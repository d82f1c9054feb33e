//! Error types — re-exports from the shared unified error system, plus the
//! repository-to-application error bridge.

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::db::repository::RepoError;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => {
                AppError::with_message(ErrorCode::NotFound, format!("{what} not found"))
            }
            RepoError::Duplicate(what) => {
                AppError::with_message(ErrorCode::AlreadyExists, format!("{what} already exists"))
            }
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_error_mapping() {
        let err: AppError = RepoError::NotFound("Card 7".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Card 7 not found");

        let err: AppError = RepoError::Duplicate("card code 1234567".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);

        let err: AppError = RepoError::Database("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
