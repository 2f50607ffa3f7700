use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// HTTP-boundary error type. Each variant maps to a stable status code and
/// a machine-readable `kind` in the response body; clients branch on the
/// kind, not the message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("{0}")]
    InvalidStatus(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound => "not_found",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::InsufficientStock(_) => "insufficient_stock",
            AppError::InvalidStatus(_) => "invalid_status",
            AppError::InvalidState(_) => "invalid_state",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::InvalidInput(msg) => AppError::InvalidInput(msg),
            DomainError::InsufficientStock { .. } => AppError::InsufficientStock(e.to_string()),
            DomainError::InvalidStatus(_) => AppError::InvalidStatus(e.to_string()),
            DomainError::InvalidState(msg) => AppError::InvalidState(msg),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::from(e).into()
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_)
            | AppError::InsufficientStock(_)
            | AppError::InvalidStatus(_)
            | AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Persistence details stay out of responses.
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": message,
            "kind": self.kind(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_failures_return_400() {
        for err in [
            AppError::InvalidInput("bad".into()),
            AppError::InsufficientStock("no stock".into()),
            AppError::InvalidStatus("bogus".into()),
            AppError::InvalidState("not pending".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{err}");
        }
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(
            AppError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn conflict_returns_409() {
        assert_eq!(
            AppError::Conflict("contention".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn internal_error_returns_500_and_hides_the_message() {
        let err = AppError::Internal("connection refused".to_string());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn insufficient_stock_maps_from_domain_with_product_name() {
        let domain = DomainError::InsufficientStock {
            product: "Desk Lamp".to_string(),
            available: 2,
        };
        let app: AppError = domain.into();
        assert!(matches!(app, AppError::InsufficientStock(_)));
        assert_eq!(
            app.to_string(),
            "Not enough stock for product Desk Lamp. Available: 2"
        );
    }

    #[test]
    fn domain_conflict_maps_to_app_conflict() {
        let app: AppError = DomainError::Conflict("duplicate key".to_string()).into();
        assert!(matches!(app, AppError::Conflict(_)));
    }

    #[test]
    fn error_body_carries_the_kind() {
        let err = AppError::InvalidState("Only pending orders can be cancelled".to_string());
        assert_eq!(err.kind(), "invalid_state");
    }
}
