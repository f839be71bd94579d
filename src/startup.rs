use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_actix_web::TracingLogger;

use crate::authentication::{AdminGuard, reject_anonymous_users};
use crate::configuration::{Environment, Settings, StorageBackend};
use crate::email_client::EmailService;
use crate::routes::{
    RuntimeInfo, admin_login, admin_stats, delete_email, health, list_emails, send_broadcast,
    set_verbose_errors, subscribe, test_email, verify_email,
};
use crate::stats::StatsKeeper;
use crate::storage::{
    FileStatsStore, FileSubscriberStore, MongoStatsStore, MongoSubscriberStore, StatsStore,
    SubscriberStore, connect,
};

pub struct Application {
    port: u16,
    server: Server,
}

/// Per-run knobs of the broadcast loop.
pub struct BroadcastConfig {
    pub send_delay: Duration,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        set_verbose_errors(config.app.environment != Environment::Production);

        // The storage backend is picked exactly once; everything downstream
        // only sees the trait objects.
        let (subscriber_store, stats_store): (Arc<dyn SubscriberStore>, Arc<dyn StatsStore>) =
            match config.storage.backend {
                StorageBackend::File => {
                    let store = FileSubscriberStore::load(&config.storage.data_dir).await?;
                    (
                        Arc::new(store),
                        Arc::new(FileStatsStore::new(&config.storage.data_dir)),
                    )
                }
                StorageBackend::Mongodb => {
                    let uri = config
                        .storage
                        .mongodb_uri
                        .as_ref()
                        .context("`storage.mongodb_uri` is required in mongodb mode")?;
                    let database = config
                        .storage
                        .mongodb_database
                        .as_deref()
                        .unwrap_or("letterbox");
                    let db = connect(uri.expose_secret(), database).await?;
                    let store = MongoSubscriberStore::new(&db);
                    store.ensure_indexes().await?;
                    (Arc::new(store), Arc::new(MongoStatsStore::new(&db)))
                }
            };

        let stats = StatsKeeper::load(stats_store).await?;
        let email_service = EmailService::from_settings(&config.email)?;
        let guard = AdminGuard::new(&config.admin);
        let runtime_info = RuntimeInfo {
            storage_backend: config.storage.backend.as_str(),
            uploads_dir: config.storage.uploads_dir.clone(),
        };
        let broadcast_config = BroadcastConfig {
            send_delay: config.broadcast.send_delay(),
        };

        let address = format!("{}:{}", config.app.host, config.app.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            subscriber_store,
            stats,
            email_service,
            guard,
            runtime_info,
            broadcast_config,
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    subscriber_store: Arc<dyn SubscriberStore>,
    stats: StatsKeeper,
    email_service: EmailService,
    guard: AdminGuard,
    runtime_info: RuntimeInfo,
    broadcast_config: BroadcastConfig,
) -> Result<Server, anyhow::Error> {
    let subscriber_store = web::Data::from(subscriber_store);
    let stats = web::Data::new(stats);
    let email_service = web::Data::new(email_service);
    let guard = web::Data::new(guard);
    let runtime_info = web::Data::new(runtime_info);
    let broadcast_config = web::Data::new(broadcast_config);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health", web::get().to(health))
            .route("/api/subscribe", web::post().to(subscribe))
            .route("/api/verify-email", web::post().to(verify_email))
            .route("/api/test-email", web::post().to(test_email))
            .route("/api/admin/login", web::post().to(admin_login))
            .service(
                web::scope("/api/admin")
                    .wrap(from_fn(reject_anonymous_users))
                    .route("/stats", web::get().to(admin_stats))
                    .route("/emails", web::get().to(list_emails))
                    .route("/emails/{email}", web::delete().to(delete_email))
                    .route("/send-broadcast", web::post().to(send_broadcast)),
            )
            .app_data(subscriber_store.clone())
            .app_data(stats.clone())
            .app_data(email_service.clone())
            .app_data(guard.clone())
            .app_data(runtime_info.clone())
            .app_data(broadcast_config.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
