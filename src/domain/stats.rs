use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Singleton aggregate backing the admin dashboard. Day buckets are keyed by
/// ISO `YYYY-MM-DD` strings, so the BTreeMap iteration order is already
/// ascending by calendar date.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_clicks: u64,
    pub total_emails: u64,
    pub emails_by_day: BTreeMap<String, u64>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub count: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_clicks: 0,
            total_emails: 0,
            emails_by_day: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

impl Stats {
    /// Every subscribe attempt counts, duplicates included.
    pub fn record_click(&mut self) {
        self.total_clicks += 1;
        self.last_updated = Utc::now();
    }

    /// First-time registration only: bumps the total and today's bucket.
    pub fn record_registration(&mut self) {
        let day = Utc::now().format("%Y-%m-%d").to_string();
        self.total_emails += 1;
        *self.emails_by_day.entry(day).or_insert(0) += 1;
        self.last_updated = Utc::now();
    }

    pub fn record_removal(&mut self) {
        self.total_emails = self.total_emails.saturating_sub(1);
        self.last_updated = Utc::now();
    }

    pub fn chart_data(&self) -> Vec<ChartPoint> {
        self.emails_by_day
            .iter()
            .map(|(date, count)| ChartPoint {
                date: date.clone(),
                count: *count,
            })
            .collect()
    }
}
