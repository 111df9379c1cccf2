use thiserror::Error;
use tracing::debug;

use aboard_types::api::{SendConfirmationRequest, SendConfirmationResponse};

/// Client-side failure to get a confirmation email dispatched.
///
/// Always non-fatal to the booking: by the time the dispatcher is called the
/// record is already persisted, so the controller downgrades any of these to
/// a degraded confirmation.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dispatcher could not be reached (connection refused, DNS,
    /// network-stack timeout).
    #[error("mail dispatcher unreachable: {0}")]
    Transport(String),
    /// The dispatcher answered with a non-success status.
    #[error("mail dispatcher rejected the send: {status} {body}")]
    Rejected { status: u16, body: String },
}

/// Seam between the form controller and the mail dispatcher.
///
/// Exactly one call per submission; implementations must not retry.
pub trait ConfirmationMailer: Send + Sync {
    /// Ask the dispatcher to relay the confirmation email.
    /// Returns the provider-assigned message id.
    fn send_confirmation(
        &self,
        payload: SendConfirmationRequest,
    ) -> impl std::future::Future<Output = Result<String, DispatchError>> + Send;
}

/// `reqwest`-backed mailer talking to the dispatcher's HTTP surface.
pub struct HttpMailer {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl ConfirmationMailer for HttpMailer {
    async fn send_confirmation(
        &self,
        payload: SendConfirmationRequest,
    ) -> Result<String, DispatchError> {
        let url = format!("{}/send-confirmation", self.base_url);
        debug!("Dispatching confirmation email via {url}");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: SendConfirmationResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(body.message_id)
    }
}
