use actix_web::{App, HttpServer};
use appointments_api::app::{self, AppState};
use appointments_api::config::{AppConfig, Config};
use appointments_api::middleware::RequestIdMiddleware;
use appointments_api::storage::Repositories;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    init_tracing(&config.app);

    tracing::info!("Starting Appointments API");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Storage backend: {}", config.storage);

    let repositories = Repositories::connect(&config).await?;
    let state = AppState::new(repositories);

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(RequestIdMiddleware)
            .configure(move |cfg| app::configure(cfg, &state))
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(app: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("appointments_api={},actix_web=info", app.log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if app.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
