mod stripe_signature;

pub use stripe_signature::{StripeSignatureMiddlewareFactory, StripeSignatureMiddlewareService};
