mod api;
mod smtp;

pub use api::ApiProvider;
pub use smtp::SmtpProvider;

use std::sync::Arc;

use async_trait::async_trait;

use crate::configuration::EmailSettings;
use crate::domain::SubscriberEmail;

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub content_id: String,
}

#[derive(Debug)]
pub struct SendOutcome {
    pub message_id: String,
}

#[derive(thiserror::Error, Debug)]
pub enum EmailError {
    #[error("no email provider is configured")]
    ProviderUnavailable,
    #[error("the provider rejected the message")]
    SendFailure(#[source] anyhow::Error),
}

/// Uniform send surface over the two transports. The capability split matters:
/// the SMTP variant resolves `cid:` references against inline attachments,
/// the API variant only carries detached attachments.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(
        &self,
        to: &SubscriberEmail,
        subject: &str,
        html: &str,
    ) -> Result<SendOutcome, EmailError>;

    async fn send_with_attachments(
        &self,
        to: &SubscriberEmail,
        subject: &str,
        html: &str,
        attachments: &[EmailAttachment],
    ) -> Result<SendOutcome, EmailError>;

    fn supports_inline_images(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// The single place where the active provider is picked. Everything else
/// talks to this wrapper; when no credentials were configured every send
/// fails with [`EmailError::ProviderUnavailable`].
#[derive(Clone)]
pub struct EmailService {
    provider: Option<Arc<dyn EmailProvider>>,
}

impl EmailService {
    /// SMTP credentials win over API credentials; with neither present the
    /// service comes up unconfigured.
    pub fn from_settings(settings: &EmailSettings) -> Result<Self, anyhow::Error> {
        if let Some(smtp) = &settings.smtp {
            let provider = SmtpProvider::new(smtp, &settings.sender_email, &settings.sender_name)?;
            return Ok(Self::with_provider(Arc::new(provider)));
        }
        if let Some(api) = &settings.api {
            let provider = ApiProvider::new(api, &settings.sender_email)?;
            return Ok(Self::with_provider(Arc::new(provider)));
        }

        tracing::warn!("No email provider credentials configured; sending is disabled");
        Ok(Self::unconfigured())
    }

    pub fn with_provider(provider: Arc<dyn EmailProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub fn unconfigured() -> Self {
        Self { provider: None }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider
            .as_ref()
            .map(|p| p.name())
            .unwrap_or("unconfigured")
    }

    pub fn supports_inline_images(&self) -> bool {
        self.provider
            .as_ref()
            .is_some_and(|p| p.supports_inline_images())
    }

    pub async fn send(
        &self,
        to: &SubscriberEmail,
        subject: &str,
        html: &str,
    ) -> Result<SendOutcome, EmailError> {
        match &self.provider {
            Some(provider) => provider.send(to, subject, html).await,
            None => Err(EmailError::ProviderUnavailable),
        }
    }

    pub async fn send_with_attachments(
        &self,
        to: &SubscriberEmail,
        subject: &str,
        html: &str,
        attachments: &[EmailAttachment],
    ) -> Result<SendOutcome, EmailError> {
        match &self.provider {
            Some(provider) => {
                provider
                    .send_with_attachments(to, subject, html, attachments)
                    .await
            }
            None => Err(EmailError::ProviderUnavailable),
        }
    }
}
