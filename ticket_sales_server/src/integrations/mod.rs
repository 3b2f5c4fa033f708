pub mod mailer;
pub mod stripe;
