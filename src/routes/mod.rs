mod admin;
mod errors;
mod health;
pub mod helpers;
mod subscriptions;
mod test_email;
mod verify_email;

pub use admin::{admin_login, admin_stats, delete_email, list_emails, send_broadcast};
pub use errors::{ApiError, set_verbose_errors};
pub use health::{RuntimeInfo, health};
pub use subscriptions::subscribe;
pub use test_email::test_email;
pub use verify_email::verify_email;
