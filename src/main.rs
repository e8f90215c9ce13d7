use std::{process, sync::Arc};

use plaza::{
    application::{
        error::AppError, feed::FeedService, likes::LikeService, stats::StatsService,
    },
    auth::{AuthCache, AuthService, SessionTokenService},
    cache::CacheConfig,
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    run_serve(settings).await
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let url = settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation("database.url is required"))?;

    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;
    let repos = PostgresRepositories::new(pool);
    let shared_repos = Arc::new(repos.clone());

    let cache_config = CacheConfig::from(&settings.cache);
    info!(
        target = "plaza::startup",
        token_ttl_secs = cache_config.token_ttl_secs,
        session_ttl_secs = cache_config.session_ttl_secs,
        stats_ttl_secs = cache_config.stats_ttl_secs,
        "cache staleness bounds configured"
    );

    let auth_cache = Arc::new(AuthCache::new(&cache_config));
    let auth = AuthService::new(
        SessionTokenService::new(shared_repos.clone(), shared_repos.clone()),
        auth_cache,
    );
    let stats = StatsService::new(shared_repos.clone());
    let likes = LikeService::new(shared_repos.clone());
    let feed = FeedService::new(shared_repos.clone(), stats.clone());

    let state = HttpState {
        auth,
        stats,
        likes,
        feed,
        repos,
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "plaza::startup",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InfraError::from)?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!(error = %error, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => error!(error = %error, "failed to install sigterm handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!(target = "plaza::startup", "shutdown signal received");
}
