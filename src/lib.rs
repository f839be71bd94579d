pub mod authentication;
pub mod broadcast;
pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod routes;
pub mod startup;
pub mod stats;
pub mod storage;
pub mod telemetry;
pub mod templates;
