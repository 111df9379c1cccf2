use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::info;

use aboard_types::api::SendConfirmationRequest;
use aboard_types::FLIGHT_NUMBER;

use crate::config::MailerConfig;

/// Gmail's SMTP relay host.
const SMTP_RELAY: &str = "smtp.gmail.com";

#[derive(Debug, Error)]
pub enum MailError {
    /// Required fields absent or empty in the request body.
    #[error("Missing required fields: name, email, selectedSeats, confirmationNumber")]
    MissingFields,
    /// GMAIL_USER / GMAIL_APP_PASSWORD were not configured at startup.
    #[error("mail relay credentials are not configured")]
    NotConfigured,
    #[error("invalid mail address: {0}")]
    Address(String),
    #[error("failed to build email: {0}")]
    Build(String),
    /// The relay rejected authentication or delivery. `code` is the SMTP
    /// status when the server got far enough to produce one.
    #[error("mail relay rejected the send: {message}")]
    Relay {
        message: String,
        code: Option<String>,
    },
}

/// A fully validated confirmation request: the four required fields are
/// guaranteed present and non-empty.
#[derive(Debug, Clone)]
pub struct ConfirmationEmail {
    pub name: String,
    pub email: String,
    pub selected_seats: Vec<String>,
    pub guests: Option<u32>,
    pub phone: Option<String>,
    pub dietary: Option<String>,
    pub confirmation_number: String,
}

impl ConfirmationEmail {
    /// Enforce the request contract: `name`, `email`, `selectedSeats` and
    /// `confirmationNumber` must be present and non-empty. Empty strings
    /// count as missing.
    pub fn from_request(req: SendConfirmationRequest) -> Result<Self, MailError> {
        let name = req.name.filter(|v| !v.is_empty());
        let email = req.email.filter(|v| !v.is_empty());
        let selected_seats = req.selected_seats.filter(|v| !v.is_empty());
        let confirmation_number = req.confirmation_number.filter(|v| !v.is_empty());

        match (name, email, selected_seats, confirmation_number) {
            (Some(name), Some(email), Some(selected_seats), Some(confirmation_number)) => {
                Ok(Self {
                    name,
                    email,
                    selected_seats,
                    guests: req.guests,
                    phone: req.phone,
                    dietary: req.dietary,
                    confirmation_number,
                })
            }
            _ => Err(MailError::MissingFields),
        }
    }
}

/// Escape a user-supplied value for interpolation into the HTML template.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the fixed confirmation template. Every interpolated booking field
/// goes through `escape_html` first.
pub fn render_confirmation_html(email: &ConfirmationEmail, sender_name: &str) -> String {
    let name = escape_html(&email.name);
    let seats = escape_html(&email.selected_seats.join(", "));
    let guests = email
        .guests
        .map(|n| n.to_string())
        .unwrap_or_else(|| "No especificado".into());
    let phone = escape_html(email.phone.as_deref().unwrap_or("No proporcionado"));
    let dietary = escape_html(email.dietary.as_deref().unwrap_or("Ninguna"));
    let confirmation = escape_html(&email.confirmation_number);
    let sender = escape_html(sender_name);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    body {{ font-family: 'Arial', sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
    .header {{ background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; text-align: center; border-radius: 10px 10px 0 0; }}
    .content {{ background: #f8f9fa; padding: 30px; border-radius: 0 0 10px 10px; }}
    .details {{ background: white; padding: 20px; border-radius: 8px; margin: 20px 0; border-left: 4px solid #667eea; }}
    .detail-row {{ display: flex; justify-content: space-between; margin: 10px 0; }}
    .label {{ font-weight: bold; color: #667eea; }}
    .footer {{ text-align: center; margin-top: 30px; color: #666; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>¡Confirmación de Reserva!</h1>
      <p>Vuelo {FLIGHT_NUMBER} - Destino: Para Siempre</p>
    </div>
    <div class="content">
      <p>Hola <strong>{name}</strong>,</p>
      <p>¡Tu reserva ha sido confirmada exitosamente!</p>
      <div class="details">
        <h3>DETALLES DE LA RESERVA</h3>
        <div class="detail-row">
          <span class="label">Número de Confirmación:</span>
          <span><strong>{confirmation}</strong></span>
        </div>
        <div class="detail-row">
          <span class="label">Vuelo:</span>
          <span>{FLIGHT_NUMBER}</span>
        </div>
        <div class="detail-row">
          <span class="label">Pasajero:</span>
          <span>{name}</span>
        </div>
        <div class="detail-row">
          <span class="label">Asientos:</span>
          <span><strong>{seats}</strong></span>
        </div>
        <div class="detail-row">
          <span class="label">Número de invitados:</span>
          <span>{guests}</span>
        </div>
        <div class="detail-row">
          <span class="label">Teléfono:</span>
          <span>{phone}</span>
        </div>
        <div class="detail-row">
          <span class="label">Restricciones alimentarias:</span>
          <span>{dietary}</span>
        </div>
      </div>
      <p><strong>¡Esperamos verte pronto a bordo!</strong></p>
      <p>Por favor, guarda este email como comprobante de tu reserva.</p>
      <div class="footer">
        <p>Con amor,<br><strong>{sender}</strong></p>
      </div>
    </div>
  </div>
</body>
</html>
"#
    )
}

/// Sends booking confirmations through the Gmail relay.
///
/// Stateless: a fresh transport is built for every send and dropped after,
/// so each request is exactly one SMTP attempt with no connection reuse, no
/// retry, and no idempotency key.
pub struct Mailer {
    gmail_user: Option<String>,
    gmail_app_password: Option<String>,
    sender_name: String,
    destination: String,
}

impl Mailer {
    pub fn new(config: &MailerConfig) -> Self {
        Self {
            gmail_user: config.gmail_user.clone(),
            gmail_app_password: config.gmail_app_password.clone(),
            sender_name: config.sender_name.clone(),
            destination: config.destination.clone(),
        }
    }

    /// Relay one confirmation email. Returns the message id stamped onto the
    /// outgoing mail.
    pub async fn send(&self, email: &ConfirmationEmail) -> Result<String, MailError> {
        let (user, password) = match (&self.gmail_user, &self.gmail_app_password) {
            (Some(u), Some(p)) => (u.clone(), p.clone()),
            _ => return Err(MailError::NotConfigured),
        };

        let from = format!("\"{}\" <{}>", self.sender_name, user)
            .parse()
            .map_err(|e| MailError::Address(format!("invalid from address: {e}")))?;
        let to = self
            .destination
            .parse()
            .map_err(|e| MailError::Address(format!("invalid to address: {e}")))?;

        let message_id = format!(
            "<{}.{}@{}>",
            Utc::now().timestamp_millis(),
            email.confirmation_number,
            SMTP_RELAY
        );

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(format!(
                "✈️ Confirmación de Reserva - Vuelo {FLIGHT_NUMBER} ({})",
                email.confirmation_number
            ))
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(render_confirmation_html(email, &self.sender_name))
            .map_err(|e| MailError::Build(e.to_string()))?;

        let transport = SmtpTransport::relay(SMTP_RELAY)
            .map_err(|e| MailError::Relay {
                message: e.to_string(),
                code: None,
            })?
            .credentials(Credentials::new(user, password))
            .build();

        // One blocking SMTP attempt, transport dropped afterwards.
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| MailError::Relay {
                message: format!("send task failed: {e}"),
                code: None,
            })?
            .map_err(|e| MailError::Relay {
                code: e.status().map(|c| c.to_string()),
                message: e.to_string(),
            })?;

        info!("Confirmation email relayed to {}", self.destination);
        Ok(message_id)
    }
}
