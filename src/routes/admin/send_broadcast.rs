use std::path::Path;

use actix_web::{HttpResponse, web};
use base64::Engine;
use chrono::Utc;

use crate::broadcast::broadcast_campaign;
use crate::domain::{Campaign, CampaignImage};
use crate::email_client::EmailService;
use crate::routes::{ApiError, RuntimeInfo};
use crate::startup::BroadcastConfig;
use crate::storage::SubscriberStore;

#[derive(serde::Deserialize)]
pub struct BroadcastBody {
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub images: Vec<ImageUpload>,
}

#[derive(serde::Deserialize)]
pub struct ImageUpload {
    pub filename: String,
    /// Base64-encoded file content.
    pub content: String,
}

#[tracing::instrument(
    name = "Broadcasting to all subscribers",
    skip_all,
    fields(subject = %body.subject, image_count = body.images.len())
)]
pub async fn send_broadcast(
    body: web::Json<BroadcastBody>,
    store: web::Data<dyn SubscriberStore>,
    email_service: web::Data<EmailService>,
    config: web::Data<BroadcastConfig>,
    info: web::Data<RuntimeInfo>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let decoder = base64::engine::general_purpose::STANDARD;
    let images = body
        .images
        .into_iter()
        .map(|upload| {
            let content = decoder.decode(&upload.content).map_err(|_| {
                ApiError::Validation(format!("Image {} is not valid base64.", upload.filename))
            })?;
            Ok(CampaignImage {
                filename: upload.filename,
                content,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    persist_uploads(&info.uploads_dir, &images).await;

    let campaign = Campaign {
        subject: body.subject,
        message: body.message,
        images,
    };
    let report = broadcast_campaign(
        &campaign,
        store.get_ref(),
        &email_service,
        config.send_delay,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Broadcast delivered to {} subscribers.", report.success_count),
        "count": report.success_count,
        "failed": report.failed_addresses.len(),
        "failedEmails": report.failed_addresses,
    })))
}

/// Best effort: a copy of every uploaded image lands in the uploads
/// directory, named by upload timestamp plus original filename. Failures are
/// logged and never fail the broadcast.
async fn persist_uploads(uploads_dir: &Path, images: &[CampaignImage]) {
    if images.is_empty() {
        return;
    }
    if let Err(e) = tokio::fs::create_dir_all(uploads_dir).await {
        tracing::warn!(
            error.message = %e,
            "Failed to create the uploads directory"
        );
        return;
    }

    let stamp = Utc::now().timestamp_millis();
    for image in images {
        // Strip any path components a hostile filename may carry.
        let Some(basename) = Path::new(&image.filename).file_name() else {
            continue;
        };
        let target = uploads_dir.join(format!("{stamp}-{}", basename.to_string_lossy()));
        if let Err(e) = tokio::fs::write(&target, &image.content).await {
            tracing::warn!(
                error.message = %e,
                filename = %image.filename,
                "Failed to persist an uploaded image"
            );
        }
    }
}
