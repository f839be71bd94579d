use chrono::{DateTime, Utc};

/// A registered newsletter recipient. Serialized camelCase to match the
/// persisted JSON layout shared by both storage backends.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub verified: bool,
}

impl Subscriber {
    pub fn new(email: String) -> Self {
        Self {
            email,
            subscribed_at: Utc::now(),
            verified: false,
        }
    }
}
