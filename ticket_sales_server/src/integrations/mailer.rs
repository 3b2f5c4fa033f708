//! Ticket confirmation emails.
//!
//! The mailer subscribes to [`TicketsIssuedEvent`]s. It runs outside the request that issued the tickets, so a slow
//! or broken mail server can never affect a sale: failures are logged and dropped.
use std::{fmt::Write, sync::Arc};

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;
use thiserror::Error;
use ticket_sales_engine::events::{EventHandlers, EventHooks, TicketsIssuedEvent};

use crate::config::{MailConfig, SmtpConfig};

pub const MAIL_EVENT_BUFFER_SIZE: usize = 25;
const SMTPS_PORT: u16 = 465;

#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Invalid mail configuration. {0}")]
    Configuration(String),
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    #[error("Could not build email. {0}")]
    Build(String),
    #[error("Could not send email. {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Builds the confirmation for a batch of freshly issued tickets. Returns `None` if there is nothing to confirm.
pub fn confirmation_email(event_name: &str, event: &TicketsIssuedEvent) -> Option<ConfirmationEmail> {
    let first = event.tickets.first()?;
    let subject = format!("Your {event_name} Tickets - Confirmation {}", first.created_at.format("%Y%m%d"));
    let greeting = match event.buyer.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Hi {},", escape_html(name)),
        None => "Hi,".to_string(),
    };
    let mut rows = String::new();
    for ticket in &event.tickets {
        // infallible for String
        let _ = write!(
            rows,
            "<tr><td style=\"font-family: monospace; padding: 8px;\">{}</td><td style=\"padding: 8px;\">{}</td></tr>",
            ticket.id, ticket.price
        );
    }
    let count = event.tickets.len();
    let plural = if count == 1 { "" } else { "s" };
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{subject}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <p>{greeting}</p>
    <p>Thank you for your purchase. Here {verb} your {count} {event_name} ticket{plural}.</p>
    <p>Each ticket code below is scanned at the entrance. Keep this email until the event.</p>
    <table style="border-collapse: collapse;">
      <tr>
        <th style="text-align: left; padding: 8px;">Ticket</th><th style="text-align: left; padding: 8px;">Price</th>
      </tr>
      {rows}
    </table>
  </div>
</body>
</html>"#,
        verb = if count == 1 { "is" } else { "are" },
    );
    Some(ConfirmationEmail { to: event.buyer.email.clone(), subject, html })
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

#[derive(Clone)]
pub enum Mailer {
    Smtp { transport: Arc<AsyncSmtpTransport<Tokio1Executor>>, from: Mailbox },
    /// No SMTP server configured. Emails are written to the log.
    LogOnly,
}

impl Mailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailerError> {
        let Some(smtp) = &config.smtp else {
            return Ok(Self::LogOnly);
        };
        let from = parse_mailbox(&config.from)?;
        let transport = smtp_transport(smtp)?;
        info!("📧️ Confirmation emails will be sent through {}:{}", smtp.host, smtp.port);
        Ok(Self::Smtp { transport: Arc::new(transport), from })
    }

    pub async fn send(&self, email: ConfirmationEmail) -> Result<(), MailerError> {
        match self {
            Self::LogOnly => {
                info!("📧️ SMTP is not configured. Email to {} not sent. Subject: {}", email.to, email.subject);
                debug!("📧️ {}", email.html);
                Ok(())
            },
            Self::Smtp { transport, from } => {
                let to = parse_mailbox(&email.to)?;
                let message = Message::builder()
                    .from(from.clone())
                    .to(to)
                    .subject(email.subject)
                    .header(ContentType::TEXT_HTML)
                    .body(email.html)
                    .map_err(|e| MailerError::Build(e.to_string()))?;
                transport.send(message).await.map_err(|e| MailerError::Transport(e.to_string()))?;
                Ok(())
            },
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailerError> {
    address.parse::<Mailbox>().map_err(|e| MailerError::InvalidAddress(format!("{address}. {e}")))
}

fn smtp_transport(smtp: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
    let builder = if smtp.port == SMTPS_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
    }
    .map_err(|e| MailerError::Configuration(e.to_string()))?;
    let mut builder = builder.port(smtp.port);
    if !smtp.username.is_empty() {
        builder = builder.credentials(Credentials::new(smtp.username.clone(), smtp.password.reveal().clone()));
    }
    Ok(builder.build())
}

/// Subscribes the confirmation mailer to ticket issuance.
pub fn create_mailer_event_handlers(config: MailConfig) -> Result<EventHandlers, MailerError> {
    let mut hooks = EventHooks::default();
    let mailer = Mailer::new(&config)?;
    let event_name = config.event_name;
    hooks.on_tickets_issued(move |ev| {
        let mailer = mailer.clone();
        let email = confirmation_email(&event_name, &ev);
        Box::pin(async move {
            let Some(email) = email else {
                warn!("📧️ Payment {} produced no tickets. No confirmation sent.", ev.payment_id);
                return;
            };
            let to = email.to.clone();
            match mailer.send(email).await {
                Ok(()) => info!("📧️ Ticket confirmation for payment {} sent to {to}", ev.payment_id),
                Err(e) => error!("📧️ Could not send the ticket confirmation for payment {}. {e}", ev.payment_id),
            }
        })
    });
    Ok(EventHandlers::new(MAIL_EVENT_BUFFER_SIZE, hooks))
}
