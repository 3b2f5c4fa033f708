mod helpers;
mod mocks;

mod checkout;
mod phases;
mod webhooks;
