use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use user_todo_rest::app_env::Settings;
use user_todo_rest::{SharedData, build_app, db, logging, persistence};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let loaded_dotenv = dotenv().is_ok();
    let settings = Settings::from_env()?;

    let otel_exporters = match &settings.otel_endpoints {
        Some(endpoints) => Some(logging::init_exporters(&endpoints.spans, &endpoints.metrics)?),
        None => None,
    };
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters)?;
    if !loaded_dotenv {
        info!("No .env file found, reading configuration from the environment only");
    }

    let backend = db::Backend::from_url(&settings.db_url)?;
    let pool = db::connect_sqlx(&settings.db_url).await?;
    db::ensure_schema(&pool, backend).await?;

    let app = build_app(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(pool, backend),
    });

    let listener = TcpListener::bind(("0.0.0.0", settings.port)).await?;
    info!(port = settings.port, "Starting server");
    axum::serve(listener, app).await?;

    Ok(())
}
