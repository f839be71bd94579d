use actix_web::{HttpResponse, web};

use crate::routes::ApiError;
use crate::stats::StatsKeeper;
use crate::storage::SubscriberStore;

#[tracing::instrument(name = "Listing subscribers", skip_all)]
pub async fn list_emails(
    store: web::Data<dyn SubscriberStore>,
) -> Result<HttpResponse, ApiError> {
    let emails = store.list_all().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "emails": emails })))
}

#[tracing::instrument(name = "Deleting subscriber", skip(store, stats))]
pub async fn delete_email(
    path: web::Path<String>,
    store: web::Data<dyn SubscriberStore>,
    stats: web::Data<StatsKeeper>,
) -> Result<HttpResponse, ApiError> {
    let email = path.into_inner();

    if !store.delete(&email).await? {
        return Err(ApiError::NotFound(format!("{email} is not subscribed.")));
    }
    stats.record_removal().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
