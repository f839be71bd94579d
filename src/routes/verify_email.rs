use actix_web::{HttpResponse, web};

use super::errors::ApiError;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailService;
use crate::storage::SubscriberStore;
use crate::templates;

#[derive(serde::Deserialize)]
pub struct VerifyBody {
    pub email: String,
}

#[tracing::instrument(
    name = "Sending verification email",
    skip(body, store, email_service),
    fields(subscriber_email = %body.email)
)]
pub async fn verify_email(
    body: web::Json<VerifyBody>,
    store: web::Data<dyn SubscriberStore>,
    email_service: web::Data<EmailService>,
) -> Result<HttpResponse, ApiError> {
    let email = SubscriberEmail::parse(body.email.clone()).map_err(ApiError::Validation)?;

    if store.find(email.as_ref()).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "{} is not subscribed.",
            email.as_ref()
        )));
    }

    let mut ctx = tera::Context::new();
    ctx.insert("email", email.as_ref());
    let html = templates::render("verification.html", &ctx)?;

    email_service
        .send(&email, "Your newsletter subscription is confirmed", &html)
        .await?;

    // Only flipped once the provider has accepted the message.
    store.mark_verified(email.as_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Verification email sent.",
    })))
}
