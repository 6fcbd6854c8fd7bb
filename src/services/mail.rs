use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::SendgridConfig;
use crate::errors::{AppError, Result};
use crate::models::MetricsReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub email: String,
}

impl Recipient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Destination for a finished report.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &MetricsReport, recipients: &[Recipient]) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: &'a Recipient,
    subject: &'a str,
    content: [MailContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [&'a Recipient; 1],
}

#[derive(Debug, Serialize)]
struct MailContent<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

pub struct MailClient {
    client: Client,
    api_url: String,
    api_key: String,
    from: Recipient,
}

impl MailClient {
    pub fn new(config: &SendgridConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AppError::Config("sendgrid.api_key is not set".to_string()));
        }
        if config.from_email.is_empty() {
            return Err(AppError::Config("sendgrid.from_email is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build mail client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: Recipient::new(config.from_name.clone(), config.from_email.clone()),
        })
    }

    /// One personalization per recipient so nobody sees the others.
    fn request<'a>(
        &'a self,
        report: &'a MetricsReport,
        recipients: &'a [Recipient],
    ) -> MailRequest<'a> {
        MailRequest {
            personalizations: recipients
                .iter()
                .map(|recipient| Personalization { to: [recipient] })
                .collect(),
            from: &self.from,
            subject: &report.title,
            content: [MailContent {
                content_type: "text/html",
                value: &report.message,
            }],
        }
    }
}

#[async_trait]
impl ReportSink for MailClient {
    async fn deliver(&self, report: &MetricsReport, recipients: &[Recipient]) -> Result<()> {
        if recipients.is_empty() {
            return Err(AppError::Config("no email recipients given".to_string()));
        }

        let request = self.request(report, recipients);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Mail(format!("Mail request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Mail service returned {}: {}", status, body);
            return Err(AppError::Mail(format!("mail service returned {}", status)));
        }

        tracing::info!(
            "Delivered \"{}\" to {} recipient(s)",
            report.title,
            recipients.len()
        );
        Ok(())
    }
}
