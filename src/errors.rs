use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Database(sqlx::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Database(e) => write!(f, "Database Error: {}", e),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(msg) => HttpResponse::BadRequest().json(ErrorBody {
                message: msg.clone(),
            }),
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(ErrorBody {
                message: msg.clone(),
            }),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(ErrorBody {
                message: msg.clone(),
            }),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(ErrorBody {
                message: msg.clone(),
            }),
            AppError::Database(e) => {
                // The caller may retry; the sequencing checks re-read
                // current state, so the retry is safe.
                tracing::error!(error = %e, "Database error");
                HttpResponse::InternalServerError().json(ErrorBody {
                    message: "Erro interno do servidor".to_string(),
                })
            }
        }
    }
}
