use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use thiserror::Error;
use ticket_sales_engine::{CheckoutError, CuponError, PaymentStatusError, PhaseError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Invalid payload")]
    InvalidPayload,
    #[error("Invalid signature")]
    InvalidSignature,
    /// A client error whose message is shown to the caller as is.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// The message returned to the caller. Server-side failures are never described in any detail.
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidPayload => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("💻️ {self}");
        }
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.public_message() }).to_string())
    }
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::NoActivePhase => Self::NotFound(e.to_string()),
            CheckoutError::DatabaseError(s) => Self::BackendError(s),
            e => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<PhaseError> for ServerError {
    fn from(e: PhaseError) -> Self {
        match e {
            PhaseError::NoActivePhase | PhaseError::PhaseNotFound(_) => Self::NotFound(e.to_string()),
            PhaseError::DatabaseError(s) => Self::BackendError(s),
        }
    }
}

impl From<CuponError> for ServerError {
    fn from(e: CuponError) -> Self {
        match e {
            CuponError::CuponNotFound(_) => Self::NotFound("Cupon code not found".to_string()),
            CuponError::InsufficientCupons { .. } => Self::BadRequest(e.to_string()),
            CuponError::DatabaseError(s) => Self::BackendError(s),
        }
    }
}

impl From<PaymentStatusError> for ServerError {
    fn from(e: PaymentStatusError) -> Self {
        match e {
            PaymentStatusError::DatabaseError(s) => Self::BackendError(s),
            e => Self::BadRequest(e.to_string()),
        }
    }
}
