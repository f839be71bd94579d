use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};

use crate::configuration::ApiSettings;
use crate::domain::SubscriberEmail;
use crate::email_client::{EmailAttachment, EmailError, EmailProvider, SendOutcome};

/// Transactional HTTP API transport. No inline-embedding support: attachments
/// travel as detached base64 blobs and the HTML must degrade accordingly.
pub struct ApiProvider {
    http_client: Client,
    endpoint: Url,
    sender: String,
    auth_token: SecretString,
}

#[derive(serde::Serialize)]
struct EmailUnit<'a> {
    email: &'a str,
}

#[derive(serde::Serialize)]
struct AttachmentUnit<'a> {
    filename: &'a str,
    content: String,
}

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: EmailUnit<'a>,
    to: Vec<EmailUnit<'a>>,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentUnit<'a>>,
}

#[derive(serde::Deserialize, Default)]
struct SendEmailResponse {
    #[serde(default)]
    id: String,
}

impl ApiProvider {
    pub fn new(settings: &ApiSettings, sender_email: &str) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("Failed building the email API HTTP client")?;
        let endpoint = Url::parse(&settings.base_url)
            .context("Failed parsing the email API base url")?
            .join("v1/email")
            .context("Failed joining the send route to the email API url")?;

        Ok(Self {
            http_client,
            endpoint,
            sender: sender_email.to_owned(),
            auth_token: settings.auth_token.clone(),
        })
    }

    async fn post(&self, body: &SendEmailRequest<'_>) -> Result<SendOutcome, EmailError> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(
                "Authorization",
                "Bearer ".to_owned() + self.auth_token.expose_secret(),
            )
            .json(body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailure(e.into()))?
            .error_for_status()
            .map_err(|e| EmailError::SendFailure(e.into()))?;

        let message_id = response
            .json::<SendEmailResponse>()
            .await
            .map(|r| r.id)
            .unwrap_or_default();

        Ok(SendOutcome { message_id })
    }
}

#[async_trait]
impl EmailProvider for ApiProvider {
    #[tracing::instrument(name = "Sending email through the API provider", skip(self, html))]
    async fn send(
        &self,
        to: &SubscriberEmail,
        subject: &str,
        html: &str,
    ) -> Result<SendOutcome, EmailError> {
        let body = SendEmailRequest {
            from: EmailUnit {
                email: &self.sender,
            },
            to: vec![EmailUnit { email: to.as_ref() }],
            subject,
            html,
            attachments: Vec::new(),
        };
        self.post(&body).await
    }

    #[tracing::instrument(
        name = "Sending email with attachments through the API provider",
        skip(self, html, attachments),
        fields(attachment_count = attachments.len())
    )]
    async fn send_with_attachments(
        &self,
        to: &SubscriberEmail,
        subject: &str,
        html: &str,
        attachments: &[EmailAttachment],
    ) -> Result<SendOutcome, EmailError> {
        let encoder = base64::engine::general_purpose::STANDARD;
        let body = SendEmailRequest {
            from: EmailUnit {
                email: &self.sender,
            },
            to: vec![EmailUnit { email: to.as_ref() }],
            subject,
            html,
            attachments: attachments
                .iter()
                .map(|a| AttachmentUnit {
                    filename: &a.filename,
                    content: encoder.encode(&a.content),
                })
                .collect(),
        };
        self.post(&body).await
    }

    fn supports_inline_images(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "api"
    }
}
