//! Wire DTOs for the auth endpoints.

use std::collections::HashMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ErrorKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninRequestDto {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninResponseDto {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddUserDto {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub rights: Vec<String>,
    #[serde(default)]
    pub contacts: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddUserResponseDto {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDto {
    pub status_code: u16,
    pub error_message: String,
}

impl ErrorDto {
    pub fn from_domain_error(err: &DomainError) -> (StatusCode, Self) {
        let status = match err.kind() {
            ErrorKind::InvalidParam => StatusCode::BAD_REQUEST,
            ErrorKind::Forbidden | ErrorKind::InvalidPassword | ErrorKind::InvalidJwt => {
                StatusCode::FORBIDDEN
            }
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Self {
                status_code: status.as_u16(),
                error_message: err.to_string(),
            },
        )
    }
}
