mod emails;
mod login;
mod send_broadcast;
mod stats;

pub use emails::{delete_email, list_emails};
pub use login::admin_login;
pub use send_broadcast::send_broadcast;
pub use stats::admin_stats;
