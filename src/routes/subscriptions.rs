use actix_web::{HttpResponse, web};

use super::errors::ApiError;
use crate::domain::SubscriberEmail;
use crate::stats::StatsKeeper;
use crate::storage::{StorageError, SubscriberStore};

#[derive(serde::Deserialize)]
pub struct SubscribeBody {
    pub email: String,
}

fn already_subscribed(email: &SubscriberEmail) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "exists": true,
        "message": "This email is already subscribed.",
        "email": email.as_ref(),
    }))
}

#[tracing::instrument(
    name = "Adding a new subscriber.",
    skip(body, store, stats),
    fields(subscriber_email = %body.email)
)]
pub async fn subscribe(
    body: web::Json<SubscribeBody>,
    store: web::Data<dyn SubscriberStore>,
    stats: web::Data<StatsKeeper>,
) -> Result<HttpResponse, ApiError> {
    let email = SubscriberEmail::parse(body.email.clone()).map_err(ApiError::Validation)?;

    // Duplicates count too.
    stats.record_click().await;

    if store.find(email.as_ref()).await?.is_some() {
        return Ok(already_subscribed(&email));
    }

    match store.create(email.as_ref()).await {
        Ok(_) => {}
        // Lost a race against a concurrent subscribe for the same address.
        Err(StorageError::Duplicate(_)) => return Ok(already_subscribed(&email)),
        Err(e) => return Err(e.into()),
    }

    stats.record_registration().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Subscribed successfully.",
        "email": email.as_ref(),
    })))
}
