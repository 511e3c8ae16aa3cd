//! Application error module
//!
//! One error enum for everything a handler can fail with, mapped onto HTTP
//! responses in a single place. Storage error detail is logged server-side
//! and never sent to the client.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::http;
use crate::logger;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Nom invalide")]
    InvalidName,

    #[error("Âge invalide")]
    InvalidAge,

    #[error("Accès refusé")]
    AccessDenied,

    #[error("Fichier non trouvé")]
    FileNotFound,

    #[error("Jeton CSRF invalide")]
    CsrfRejected,

    #[error("Corps de requête invalide")]
    InvalidBody,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl AppError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidName | Self::InvalidAge | Self::AccessDenied | Self::InvalidBody => {
                StatusCode::BAD_REQUEST
            }
            Self::FileNotFound => StatusCode::NOT_FOUND,
            Self::CsrfRejected => StatusCode::FORBIDDEN,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to the client-facing response
    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::Storage(ref e) => {
                logger::log_error(&format!("Storage failure: {e}"));
                http::build_500_response()
            }
            other => http::build_text_response(other.status(), &other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidName.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidAge.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AccessDenied.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::FileNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::CsrfRejected.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Storage(sqlx::Error::PoolClosed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_messages_are_french() {
        assert_eq!(AppError::InvalidName.to_string(), "Nom invalide");
        assert_eq!(AppError::InvalidAge.to_string(), "Âge invalide");
        assert_eq!(AppError::AccessDenied.to_string(), "Accès refusé");
    }
}
