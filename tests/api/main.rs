mod admin;
mod broadcast;
mod subscriptions;
