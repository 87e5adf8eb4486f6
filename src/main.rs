//! Course enrollment API server.

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use sqlx::PgPool;
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use course_enrollment::adapters::auth::JwtSessionValidator;
use course_enrollment::adapters::http::{api_router, AuthState, CheckoutAppState};
use course_enrollment::adapters::postgres::{
    PostgresCouponRepository, PostgresCourseCatalog, PostgresEnrollmentRepository,
    PostgresLegacyMirror, PostgresReferralRepository,
};
use course_enrollment::adapters::razorpay::RazorpayGateway;
use course_enrollment::adapters::{DetachedPublisher, RedisEventPublisher};
use course_enrollment::application::handlers::checkout::{
    AbandonedEnrollmentSweeper, ExpireAbandonedEnrollmentsHandler,
};
use course_enrollment::config::AppConfig;
use course_enrollment::domain::payment::{CheckoutSignatureVerifier, GatewayWebhookVerifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let pool = config.database.pool_options().connect(&config.database.url).await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let redis = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn =
        tokio::time::timeout(config.redis.timeout(), redis.get_multiplexed_tokio_connection())
            .await??;
    let publisher = RedisEventPublisher::new(redis_conn, config.redis.notification_channel.clone());

    let state = checkout_state(&config, pool, publisher);
    let auth: AuthState = Arc::new(JwtSessionValidator::new(config.auth.validator_config()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = AbandonedEnrollmentSweeper::new(
        ExpireAbandonedEnrollmentsHandler::new(
            state.enrollments.clone(),
            config.enrollment.abandoned_after_mins,
        ),
        config.enrollment.sweep_interval(),
    );
    let sweep_task = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

    let app = api_router(state, auth)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Course enrollment API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweep_task.await {
        tracing::warn!(error = %e, "Sweeper task ended abnormally");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.is_production() {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

fn checkout_state(config: &AppConfig, pool: PgPool, publisher: RedisEventPublisher) -> CheckoutAppState {
    CheckoutAppState {
        catalog: Arc::new(PostgresCourseCatalog::new(pool.clone())),
        coupons: Arc::new(PostgresCouponRepository::new(pool.clone())),
        referrals: Arc::new(PostgresReferralRepository::new(pool.clone())),
        enrollments: Arc::new(PostgresEnrollmentRepository::new(pool.clone())),
        legacy_mirror: Arc::new(PostgresLegacyMirror::new(pool)),
        gateway: Arc::new(RazorpayGateway::new(config.payment.gateway_config())),
        event_publisher: Arc::new(DetachedPublisher::new(Arc::new(publisher))),
        checkout_verifier: CheckoutSignatureVerifier::new(
            config.payment.razorpay_key_secret.clone(),
        ),
        webhook_verifier: GatewayWebhookVerifier::new(
            config.payment.razorpay_webhook_secret.clone(),
        ),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
