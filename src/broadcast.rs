use std::time::Duration;

use crate::domain::{Campaign, SubscriberEmail};
use crate::email_client::{EmailAttachment, EmailError, EmailService};
use crate::storage::{StorageError, SubscriberStore};
use crate::templates;

#[derive(Debug)]
pub struct BroadcastReport {
    pub success_count: usize,
    pub failed_addresses: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum BroadcastError {
    #[error("{0}")]
    InvalidCampaign(String),
    #[error("there are no subscribers to send to")]
    NoSubscribers,
    #[error("failed to read the subscriber list")]
    Storage(#[from] StorageError),
    #[error("failed to render the campaign template")]
    Render(#[source] anyhow::Error),
}

/// Sends one campaign to every current subscriber, strictly sequentially,
/// with a fixed delay between consecutive sends. One recipient's failure
/// never aborts the run; failures are collected in the report instead.
#[tracing::instrument(
    name = "Broadcasting campaign",
    skip_all,
    fields(subject = %campaign.subject, image_count = campaign.images.len())
)]
pub async fn broadcast_campaign(
    campaign: &Campaign,
    store: &dyn SubscriberStore,
    email: &EmailService,
    delay: Duration,
) -> Result<BroadcastReport, BroadcastError> {
    campaign.validate().map_err(BroadcastError::InvalidCampaign)?;

    // Snapshot taken once; subscribers added mid-run are not included.
    let recipients = store.list_all().await?;
    if recipients.is_empty() {
        return Err(BroadcastError::NoSubscribers);
    }

    let attachments = build_attachments(campaign);
    let cids: Vec<String> = attachments.iter().map(|a| a.content_id.clone()).collect();
    let html = render_broadcast_html(
        &campaign.subject,
        &campaign.message,
        &cids,
        email.supports_inline_images(),
    )
    .map_err(BroadcastError::Render)?;

    let mut report = BroadcastReport {
        success_count: 0,
        failed_addresses: Vec::new(),
    };

    for (i, subscriber) in recipients.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = match SubscriberEmail::parse(subscriber.email.clone()) {
            Ok(to) => {
                if attachments.is_empty() {
                    email.send(&to, &campaign.subject, &html).await
                } else {
                    email
                        .send_with_attachments(&to, &campaign.subject, &html, &attachments)
                        .await
                }
            }
            Err(e) => Err(EmailError::SendFailure(anyhow::anyhow!(e))),
        };

        match outcome {
            Ok(_) => report.success_count += 1,
            Err(e) => {
                tracing::warn!(
                    error.cause_chain = ?e,
                    subscriber_email = %subscriber.email,
                    "Failed to deliver the campaign to a recipient"
                );
                report.failed_addresses.push(subscriber.email.clone());
            }
        }
    }

    tracing::info!(
        delivered = report.success_count,
        failed = report.failed_addresses.len(),
        "Campaign broadcast finished"
    );
    Ok(report)
}

/// The attachment set is built once per run; content-ids are positional and
/// stable so the rendered HTML can reference them.
pub fn build_attachments(campaign: &Campaign) -> Vec<EmailAttachment> {
    campaign
        .images
        .iter()
        .enumerate()
        .map(|(i, image)| EmailAttachment {
            filename: image.filename.clone(),
            content: image.content.clone(),
            content_type: mime_for(&image.filename).to_owned(),
            content_id: format!("image{i}"),
        })
        .collect()
}

fn mime_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// One template shared by all recipients. Only inline-capable providers get
/// `cid:` image tags; everyone else gets a textual attachment notice.
pub fn render_broadcast_html(
    subject: &str,
    message: &str,
    image_cids: &[String],
    inline_images: bool,
) -> Result<String, anyhow::Error> {
    let message_html = tera::escape_html(message).replace('\n', "<br>");

    let mut ctx = tera::Context::new();
    ctx.insert("subject", subject);
    ctx.insert("message_html", &message_html);
    ctx.insert("inline_images", &inline_images);
    ctx.insert("image_cids", image_cids);
    ctx.insert("attachment_count", &image_cids.len());

    templates::render("broadcast.html", &ctx)
}
