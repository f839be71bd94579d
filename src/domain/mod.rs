mod campaign;
mod stats;
mod subscriber;
mod subscriber_email;

pub use campaign::{Campaign, CampaignImage, MAX_CAMPAIGN_IMAGES};
pub use stats::{ChartPoint, Stats};
pub use subscriber::Subscriber;
pub use subscriber_email::SubscriberEmail;
