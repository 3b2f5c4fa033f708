use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach Stripe: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    /// Stripe answered with an error object. `message` is Stripe's own, human readable, explanation.
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    /// The id was refused before any request was made.
    #[error("Invalid Stripe id: {0}")]
    InvalidId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("The signature header is missing a timestamp")]
    MissingTimestamp,
    #[error("The signature header contains no v1 signature")]
    MissingSignature,
    #[error("The signature timestamp is outside the tolerance window")]
    TimestampOutOfTolerance,
    #[error("No signature matches the payload")]
    SignatureMismatch,
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("The webhook secret cannot be used as a signing key: {0}")]
    InvalidSecret(String),
}
