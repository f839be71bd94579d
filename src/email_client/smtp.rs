use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::ExposeSecret;

use crate::configuration::SmtpSettings;
use crate::domain::SubscriberEmail;
use crate::email_client::{EmailAttachment, EmailError, EmailProvider, SendOutcome};

/// SMTP transport. Attachments are inlined as `multipart/related` parts with
/// content-id headers, so the HTML body may reference them via `cid:`.
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpProvider {
    pub fn new(
        settings: &SmtpSettings,
        sender_email: &str,
        sender_name: &str,
    ) -> Result<Self, anyhow::Error> {
        let creds = Credentials::new(
            settings.username.clone(),
            settings.password.expose_secret().to_owned(),
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .context("Failed to create the SMTP relay")?
            .credentials(creds)
            .port(settings.port)
            .build();
        let sender: Mailbox = format!("{sender_name} <{sender_email}>")
            .parse()
            .context("Invalid sender address")?;

        Ok(Self { transport, sender })
    }

    fn build_message(
        &self,
        to: &SubscriberEmail,
        subject: &str,
        html: &str,
        attachments: &[EmailAttachment],
    ) -> Result<Message, EmailError> {
        let to: Mailbox = to
            .as_ref()
            .parse()
            .map_err(|e| EmailError::SendFailure(anyhow::anyhow!("invalid recipient: {e}")))?;

        let builder = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject);
        let html_part = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(html.to_owned());

        let message = if attachments.is_empty() {
            builder.singlepart(html_part)
        } else {
            let mut related = MultiPart::related().singlepart(html_part);
            for attachment in attachments {
                let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                    EmailError::SendFailure(anyhow::anyhow!(
                        "invalid content type for {}: {e}",
                        attachment.filename
                    ))
                })?;
                related = related.singlepart(
                    Attachment::new_inline(attachment.content_id.clone())
                        .body(attachment.content.clone(), content_type),
                );
            }
            builder.multipart(related)
        }
        .map_err(|e| EmailError::SendFailure(e.into()))?;

        Ok(message)
    }

    async fn dispatch(&self, message: Message) -> Result<SendOutcome, EmailError> {
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| EmailError::SendFailure(e.into()))?;
        let message_id = response
            .message()
            .next()
            .map(ToOwned::to_owned)
            .unwrap_or_default();

        Ok(SendOutcome { message_id })
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    #[tracing::instrument(name = "Sending email over SMTP", skip(self, html))]
    async fn send(
        &self,
        to: &SubscriberEmail,
        subject: &str,
        html: &str,
    ) -> Result<SendOutcome, EmailError> {
        let message = self.build_message(to, subject, html, &[])?;
        self.dispatch(message).await
    }

    #[tracing::instrument(
        name = "Sending email with inline attachments over SMTP",
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
        let message = self.build_message(to, subject, html, attachments)?;
        self.dispatch(message).await
    }

    fn supports_inline_images(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
