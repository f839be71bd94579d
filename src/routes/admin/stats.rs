use actix_web::{HttpResponse, web};

use crate::domain::{ChartPoint, Subscriber};
use crate::routes::ApiError;
use crate::stats::StatsKeeper;
use crate::storage::SubscriberStore;

const RECENT_EMAILS_LIMIT: usize = 5;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    total_clicks: u64,
    total_emails: u64,
    verified_emails: u64,
    unverified_emails: u64,
    chart_data: Vec<ChartPoint>,
    recent_emails: Vec<Subscriber>,
}

#[tracing::instrument(name = "Fetching admin stats", skip_all)]
pub async fn admin_stats(
    store: web::Data<dyn SubscriberStore>,
    stats: web::Data<StatsKeeper>,
) -> Result<HttpResponse, ApiError> {
    let snapshot = stats.snapshot().await;
    let verified_emails = store.count(Some(true)).await?;
    let unverified_emails = store.count(Some(false)).await?;
    let recent_emails: Vec<Subscriber> = store
        .list_all()
        .await?
        .into_iter()
        .take(RECENT_EMAILS_LIMIT)
        .collect();

    Ok(HttpResponse::Ok().json(StatsResponse {
        total_clicks: snapshot.total_clicks,
        total_emails: snapshot.total_emails,
        verified_emails,
        unverified_emails,
        chart_data: snapshot.chart_data(),
        recent_emails,
    }))
}
