use std::{io::Error, sync::Arc, time::Duration};

use anyhow::Context;
use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;
use sqlx::postgres::PgPoolOptions;
use tokio::main;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::{
    application::{
        handlers::outbox_dispatcher::OutboxDispatcher,
        services::{
            api_rate_limit::ApiRateLimitService, category_seed::CategorySeeder,
            jwt::JwtServiceConfig, outbox::OutboxService, sms::SmsSender,
            sms_rate_limit::{SmsRateLimitConfig, SmsRateLimitService},
        },
        usecases::{
            list_categories::ListCategoriesUseCase, list_notifications::ListNotificationsUseCase,
            mark_notifications_read::MarkNotificationsReadUseCase,
            request_sms_otp::{RequestSmsOtpConfig, RequestSmsOtpUseCase},
        },
    },
    config::{Config, SmsProvider},
    domain::repositories::{
        ApiRateLimitRepository, CategoryRepository, NotificationRepository, OutboxRepository,
        SmsRateLimitRepository,
    },
    infrastructure::{
        captcha::RecaptchaVerifier,
        repositories::{in_memory, postgres},
        sms::{AndroidSmsSender, FallbackSmsSender, LogSmsSender, MacroDroidSmsSender},
    },
    presentation::http::endpoints::{
        endpoints,
        root::{ApiState, EndpointLimit},
    },
};

mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

struct Repositories {
    outbox: Arc<dyn OutboxRepository>,
    notifications: Arc<dyn NotificationRepository>,
    api_rate_limits: Arc<dyn ApiRateLimitRepository>,
    sms_rate_limits: Arc<dyn SmsRateLimitRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl Repositories {
    async fn connect(database_url: Option<&str>) -> anyhow::Result<Self> {
        let Some(url) = database_url else {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            return Ok(Self {
                outbox: Arc::new(in_memory::InMemoryOutboxRepository::new()),
                notifications: Arc::new(in_memory::InMemoryNotificationRepository::new()),
                api_rate_limits: Arc::new(in_memory::InMemoryApiRateLimitRepository::new()),
                sms_rate_limits: Arc::new(in_memory::InMemorySmsRateLimitRepository::new()),
                categories: Arc::new(in_memory::InMemoryCategoryRepository::new()),
            });
        };

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .context("failed to connect to postgres")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        tracing::info!("connected to postgres, migrations applied");

        Ok(Self {
            outbox: postgres::PostgresOutboxRepository::new(pool.clone()),
            notifications: postgres::PostgresNotificationRepository::new(pool.clone()),
            api_rate_limits: postgres::PostgresApiRateLimitRepository::new(pool.clone()),
            sms_rate_limits: postgres::PostgresSmsRateLimitRepository::new(pool.clone()),
            categories: postgres::PostgresCategoryRepository::new(pool),
        })
    }
}

fn build_sender(provider: SmsProvider, config: &Config) -> anyhow::Result<Arc<dyn SmsSender>> {
    Ok(match provider {
        SmsProvider::Log => Arc::new(LogSmsSender),
        SmsProvider::Android => Arc::new(AndroidSmsSender::new(config.android_sms.clone())?),
        SmsProvider::MacroDroid => Arc::new(MacroDroidSmsSender::new(config.macrodroid.clone())?),
    })
}

fn sms_sender(config: &Config) -> anyhow::Result<Arc<dyn SmsSender>> {
    let primary = build_sender(config.sms_provider, config)?;
    match config.sms_fallback {
        Some(fallback) if fallback != config.sms_provider => Ok(Arc::new(FallbackSmsSender::new(
            primary,
            build_sender(fallback, config)?,
        ))),
        _ => Ok(primary),
    }
}

/// Cancels `cancel` once `signal` fires. A listener that fails to install
/// leaves the token untouched.
async fn cancel_on_signal(
    signal: impl Future<Output = std::io::Result<()>>,
    cancel: CancellationToken,
) {
    if let Err(err) = signal.await {
        tracing::error!(error = ?err, "failed to listen for ctrl-c, stop the process another way");
        return;
    }
    tracing::info!("shutdown requested");
    cancel.cancel();
}

async fn run(config: Config) -> anyhow::Result<()> {
    let repos = Repositories::connect(config.database_url.as_deref()).await?;

    if config.seed_categories {
        CategorySeeder::new(repos.categories.clone())
            .seed_defaults()
            .await
            .context("failed to seed categories")?;
    }

    let cancel = CancellationToken::new();
    let dispatcher = OutboxDispatcher::new(
        repos.outbox.clone(),
        repos.notifications.clone(),
        sms_sender(&config)?,
        config.outbox.clone(),
    )
    .spawn(cancel.clone());

    let state = Arc::new(ApiState {
        request_sms_otp_usecase: Arc::new(RequestSmsOtpUseCase::new(
            Arc::new(RecaptchaVerifier::new(config.captcha.clone())?),
            SmsRateLimitService::new(repos.sms_rate_limits.clone(), SmsRateLimitConfig::default()),
            OutboxService::new(repos.outbox.clone()),
            RequestSmsOtpConfig::default(),
        )),
        list_notifications_usecase: Arc::new(ListNotificationsUseCase::new(
            repos.notifications.clone(),
        )),
        mark_notifications_read_usecase: Arc::new(MarkNotificationsReadUseCase::new(
            repos.notifications.clone(),
        )),
        list_categories_usecase: Arc::new(ListCategoriesUseCase::new(repos.categories.clone())),
        api_rate_limit: ApiRateLimitService::new(repos.api_rate_limits.clone()),
        otp_limit: EndpointLimit::default(),
        jwt_config: JwtServiceConfig {
            secret: config.jwt_secret.clone(),
        },
    });

    let server_url = format!("{}://{}:{}", config.scheme, config.host, config.port);
    tracing::info!(%server_url, "starting server");

    let api_service = OpenApiService::new(endpoints(state), "Outbox API", env!("CARGO_PKG_VERSION"))
        .server(format!("{}/api", server_url));
    let ui = api_service.swagger_ui();
    let app = Route::new().nest("/api", api_service).nest("/", ui);

    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), cancel.clone()));

    Server::new(TcpListener::bind(format!("localhost:{}", config.port)))
        .run_with_graceful_shutdown(app, cancel.clone().cancelled_owned(), Some(SHUTDOWN_GRACE))
        .await
        .context("http server failed")?;

    cancel.cancel();
    dispatcher.await.context("outbox dispatcher panicked")?;
    tracing::info!("stopped");
    Ok(())
}

#[main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::try_parse().map_err(Error::other)?;
    run(config).await.map_err(|err| {
        tracing::error!(error = ?err, "fatal error");
        Error::other(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_cancels_the_token() {
        let cancel = CancellationToken::new();
        cancel_on_signal(async { Ok(()) }, cancel.clone()).await;
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn broken_signal_listener_keeps_running() {
        let cancel = CancellationToken::new();
        cancel_on_signal(async { Err(Error::other("no signal driver")) }, cancel.clone()).await;
        assert!(!cancel.is_cancelled());
    }
}
