use super::{INotifier, NotifierError};
use crate::Config;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Sends emails through the Resend http api
pub struct ResendNotifier {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl ResendNotifier {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_url: config.resend_api_url.clone(),
            api_key: config.resend_api_key.clone(),
            from: config.reminder_from_address.clone(),
        }
    }
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait::async_trait]
impl INotifier for ResendNotifier {
    fn ensure_ready(&self) -> Result<(), NotifierError> {
        match &self.api_key {
            Some(_) => Ok(()),
            None => Err(NotifierError::NotConfigured(
                "RESEND_API_KEY is not configured".into(),
            )),
        }
    }

    async fn send(
        &self,
        address: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), NotifierError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            NotifierError::NotConfigured("RESEND_API_KEY is not configured".into())
        })?;

        let payload = EmailPayload {
            from: &self.from,
            to: [address],
            subject,
            html: html_body,
        };

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Email provider connection error: {}", e);
                NotifierError::Connection(e.to_string())
            })?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            error!("Failed to send email. Status: {}, Body: {}", status, body);
            return Err(NotifierError::Rejected { status, body });
        }

        Ok(())
    }
}
