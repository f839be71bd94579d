use std::path::PathBuf;

use actix_web::{HttpResponse, web};

use crate::email_client::EmailService;

/// Static facts about the running process, fixed at startup.
pub struct RuntimeInfo {
    pub storage_backend: &'static str,
    pub uploads_dir: PathBuf,
}

pub async fn health(
    info: web::Data<RuntimeInfo>,
    email_service: web::Data<EmailService>,
) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "storage": info.storage_backend,
        "provider": email_service.provider_name(),
    }))
}
