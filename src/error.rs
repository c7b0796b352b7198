use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jiff::civil::Date;
use sea_orm::{DbErr, SqlErr};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Date cannot be more than one year in the future")]
    InvalidDate,

    #[error("Score must be between 0 and 100")]
    InvalidScore,

    #[error("A movie with the name '{name}' and release date '{date}' already exists.")]
    DuplicateMovie { name: String, date: Date },

    #[error("Movie with the given ID was not found.")]
    NotFound,

    #[error("No movies found")]
    OutOfRangePage,

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Maps a store failure on a movie write, turning a unique index hit on
    /// (name, date) into `DuplicateMovie`.
    pub fn from_movie_write(err: DbErr, name: &str, date: Date) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::DuplicateMovie { name: name.to_string(), date }
            },
            _ => Self::Database(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidDate | AppError::InvalidScore => StatusCode::BAD_REQUEST,
            AppError::DuplicateMovie { .. } => StatusCode::CONFLICT,
            AppError::NotFound | AppError::OutOfRangePage => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<jiff::Error> for AppError {
    fn from(err: jiff::Error) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_client_statuses() {
        assert_eq!(AppError::InvalidDate.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidScore.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::OutOfRangePage.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::invalid("bad").status(), StatusCode::UNPROCESSABLE_ENTITY);

        let dup =
            AppError::DuplicateMovie { name: "Heat".into(), date: jiff::civil::date(1995, 12, 15) };
        assert_eq!(dup.status(), StatusCode::CONFLICT);
        assert_eq!(
            dup.to_string(),
            "A movie with the name 'Heat' and release date '1995-12-15' already exists."
        );
    }

    #[test]
    fn storage_failures_are_internal() {
        let err = AppError::from(DbErr::Custom("disk full".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_unique_write_failures_stay_database_errors() {
        let err = AppError::from_movie_write(
            DbErr::Custom("boom".into()),
            "Heat",
            jiff::civil::date(1995, 12, 15),
        );
        assert!(matches!(err, AppError::Database(_)));
    }
}
