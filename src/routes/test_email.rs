use actix_web::{HttpRequest, HttpResponse, web};

use super::errors::ApiError;
use crate::authentication::AdminGuard;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailService;

#[derive(serde::Deserialize, Default)]
pub struct TestEmailBody {
    pub email: Option<String>,
}

/// Sends one test message, defaulting to the admin address when no explicit
/// recipient is given.
#[tracing::instrument(name = "Sending test email", skip_all)]
pub async fn test_email(
    req: HttpRequest,
    body: Option<web::Json<TestEmailBody>>,
    guard: web::Data<AdminGuard>,
    email_service: web::Data<EmailService>,
) -> Result<HttpResponse, ApiError> {
    guard.validate_bearer(req.headers())?;

    let recipient = body
        .and_then(|b| b.into_inner().email)
        .unwrap_or_else(|| guard.email().to_owned());
    let email = SubscriberEmail::parse(recipient).map_err(ApiError::Validation)?;

    let outcome = email_service
        .send(
            &email,
            "Letterbox test email",
            "<p>This is a test email from your newsletter service.</p>",
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Test email sent to {}.", email.as_ref()),
        "id": outcome.message_id,
    })))
}
