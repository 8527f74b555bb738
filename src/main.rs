use std::{process, sync::Arc};

use riserva::{
    application::{
        engine::{EngineCatalog, QueryEngine},
        error::AppError,
        selection::SelectionService,
        stats::StatsService,
        stores::OptionsStore,
    },
    cache::{MemoryTransientStore, QueryInterceptor, TransientStore},
    config,
    infra::{
        engine::MemoryQueryEngine,
        error::InfraError,
        http::{AdminState, HttpState, build_admin_router, build_public_router},
        options::MemoryOptionsStore,
        telemetry,
    },
};
use tokio::try_join;
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
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let options: Arc<dyn OptionsStore> = Arc::new(MemoryOptionsStore::new());
    let store: Arc<dyn TransientStore> = Arc::new(MemoryTransientStore::new());
    let engine: Arc<dyn QueryEngine> = Arc::new(MemoryQueryEngine::new(EngineCatalog::default()));

    let selections = Arc::new(SelectionService::new(Arc::clone(&options)));
    let stats = Arc::new(StatsService::new(
        Arc::clone(&options),
        settings.cache.uncached_log_limit,
    ));

    let interceptor = Arc::new(QueryInterceptor::new(
        settings.cache.clone(),
        Arc::clone(&store),
        Arc::clone(&selections),
        Arc::clone(&stats),
        Arc::clone(&engine),
    ));

    let http_state = HttpState { interceptor };
    let admin_state = AdminState::new(
        settings.cache.clone(),
        store,
        selections,
        stats,
        engine,
        &settings.admin.token,
    );

    info!(
        public_addr = %settings.server.public_addr,
        admin_addr = %settings.server.admin_addr,
        cache_enabled = settings.cache.enabled,
        ttl_seconds = settings.cache.ttl_seconds,
        "starting riserva"
    );

    serve_http(&settings, http_state, admin_state).await
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = build_public_router(http_state);
    let admin_router = build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    let public_server = axum::serve(public_listener, public_router.into_make_service());
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service());

    try_join!(public_server, admin_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
