use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::borrow::Cow;

use crate::modules::convert::converter::ConversionError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(Cow<'static, str>),
    #[error("Internal Server Error: {0}")]
    InternalServer(Cow<'static, str>),
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub error: Cow<'static, str>,
}

impl Error {
    pub fn payload_too_large(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    pub fn internal_server_error() -> Self {
        Self::InternalServer("Internal Server Error".into())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::InternalServer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Error::BadRequest(msg)
            | Error::NotFound(msg)
            | Error::PayloadTooLarge(msg)
            | Error::InternalServer(msg) => {
                HttpResponse::build(self.status_code()).json(ErrorBody { error: msg.clone() })
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // filesystem errors
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    // archive errors
    #[error("Zip Error: {0}")]
    Zip(#[from] zip::result::ZipError),
    // external converter errors
    #[error("Conversion Error: {0}")]
    Conversion(#[from] ConversionError),
    #[error("Converter executable not found: {0}")]
    ConverterNotFound(Cow<'static, str>),
    #[error("Configuration Error: {0}")]
    Config(Cow<'static, str>),
    #[error("Multipart Error: {0}")]
    Multipart(Cow<'static, str>),
    // Custom Errors
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(Cow<'static, str>),
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::Multipart(msg) => Error::BadRequest(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::PayloadTooLarge(msg) => Error::PayloadTooLarge(msg),
            SystemError::Conversion(err) => {
                log::error!("Conversion failed: {}", err);
                Error::InternalServer("Conversion failed".into())
            }
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::internal_server_error()
            }
        }
    }
}

impl From<actix_multipart::MultipartError> for SystemError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        log::warn!("{:?}", err);
        SystemError::Multipart(format!("Malformed upload: {}", err).into())
    }
}

impl From<tokio::task::JoinError> for SystemError {
    fn from(err: tokio::task::JoinError) -> Self {
        SystemError::InternalError(Box::new(err))
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn payload_too_large(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use std::time::Duration;

    async fn body_of(err: Error) -> (StatusCode, serde_json::Value) {
        let res = err.error_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_bad_request_body_shape() {
        let (status, body) = body_of(Error::BadRequest("No files uploaded".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "No files uploaded" }));
    }

    #[actix_web::test]
    async fn test_conversion_error_maps_to_500() {
        let err: Error = SystemError::from(ConversionError::Timeout(Duration::from_secs(5))).into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Conversion failed");
    }

    #[actix_web::test]
    async fn test_io_error_is_hidden_behind_generic_message() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/secret/path");
        let (status, body) = body_of(SystemError::from(io).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
    }

    #[actix_web::test]
    async fn test_config_error_is_internal() {
        let err = SystemError::config("MAX_FILES must be positive");
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
    }

    #[test]
    fn test_not_found_and_too_large_status() {
        let nf: Error = SystemError::not_found("File not found").into();
        assert_eq!(nf.status_code(), StatusCode::NOT_FOUND);
        let big: Error = SystemError::payload_too_large("too big").into();
        assert_eq!(big.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
