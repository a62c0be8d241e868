use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use coaching_billing::adapters::http::{payments_router, PaymentsAppState};
use coaching_billing::adapters::{
    CapturingDispatcher, ChromePdfRenderer, PostgresAuditLog, PostgresPendingPaymentStore,
    ResendConfig, ResendDispatcher, StripeWebhookConfig, StripeWebhookVerifier,
};
use coaching_billing::application::{
    AuditRecorder, CreatePendingPaymentHandler, NotificationTemplates,
    PaymentLifecycleCoordinator, SideEffectMode, SideEffectPipeline,
};
use coaching_billing::config::AppConfig;
use coaching_billing::ports::{
    AuditLog, InvoiceRenderer, NotificationDispatcher, PendingPaymentStore,
};
use coaching_billing::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = AppConfig::load()?;
    telemetry::init_tracing(&cfg.server.log_level, cfg.server.log_json);
    cfg.validate()?;

    tracing::info!(environment = ?cfg.server.environment, "Starting coaching-billing");

    // Database
    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .min_connections(cfg.database.min_connections)
        .acquire_timeout(cfg.database.acquire_timeout())
        .connect(&cfg.database.url)
        .await?;

    if cfg.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed running migrations");
            e
        })?;
    }

    let store: Arc<dyn PendingPaymentStore> =
        Arc::new(PostgresPendingPaymentStore::new(pool.clone()));
    let audit_log: Arc<dyn AuditLog> = Arc::new(PostgresAuditLog::new(pool));

    // Side-effect collaborators
    let renderer = ChromePdfRenderer::new(&cfg.renderer.chrome_path, &cfg.billing.business_name)
        .with_timeout(cfg.renderer.timeout_secs);
    if !renderer.is_available().await {
        tracing::warn!(
            chrome_path = %cfg.renderer.chrome_path,
            "Chrome not available, invoices will be emailed without PDF"
        );
    }
    let renderer: Arc<dyn InvoiceRenderer> = Arc::new(renderer);

    let dispatcher: Arc<dyn NotificationDispatcher> = if cfg.email.is_configured() {
        Arc::new(ResendDispatcher::new(
            ResendConfig::new(&cfg.email.resend_api_key, cfg.email.from_header())
                .with_base_url(&cfg.email.api_base_url),
        ))
    } else {
        tracing::warn!("No Resend API key configured, outgoing email is captured in memory");
        Arc::new(CapturingDispatcher::new())
    };

    let verifier = Arc::new(StripeWebhookVerifier::new(
        StripeWebhookConfig::new(&cfg.payment.stripe_webhook_secret)
            .with_tolerance_secs(cfg.payment.webhook_tolerance_secs)
            .with_require_livemode(cfg.payment.require_livemode),
    ));

    let pipeline = SideEffectPipeline::new(
        renderer,
        dispatcher,
        AuditRecorder::new(audit_log.clone(), cfg.audit.retry_policy()),
        NotificationTemplates::new(
            &cfg.billing.business_name,
            cfg.billing.payment_page_url.clone(),
        ),
        SideEffectMode::from_detached_flag(cfg.billing.detached_side_effects),
    )
    .with_pdf_on_issued_invoice(cfg.billing.attach_pdf_to_issued_invoice);

    let state = PaymentsAppState {
        store: store.clone(),
        audit_log,
        verifier,
        intake: CreatePendingPaymentHandler::new(
            store.clone(),
            pipeline.clone(),
            cfg.billing.payment_terms_days,
        ),
        coordinator: PaymentLifecycleCoordinator::new(store, pipeline),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", payments_router())
        .with_state(state)
        .layer(TimeoutLayer::new(cfg.server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = cfg.server.socket_addr()?;
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
